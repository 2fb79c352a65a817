//! Arena configuration loader.

use std::path::Path;

use arena_core::ArenaConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for arena configuration from TOML files.
///
/// Every key is optional; missing keys keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing ArenaConfig
    pub fn load(path: &Path) -> LoadResult<ArenaConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ArenaConfig> {
        let config: ArenaConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.turn_warning_ticks >= config.turn_timer_ticks {
            anyhow::bail!(
                "turn_warning_ticks ({}) must be below turn_timer_ticks ({})",
                config.turn_warning_ticks,
                config.turn_timer_ticks
            );
        }
        if config.defense_warning_steps >= config.defense_countdown_steps {
            anyhow::bail!(
                "defense_warning_steps ({}) must be below defense_countdown_steps ({})",
                config.defense_warning_steps,
                config.defense_countdown_steps
            );
        }
        Ok(config)
    }
}
