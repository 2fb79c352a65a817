//! CLI configuration read from the process environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use arena_runtime::RuntimeConfig;

/// Settings for one demonstration run.
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Directory holding `config.toml`, `rooms.ron` and `roster.ron`.
    pub data_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub rooms_path: Option<PathBuf>,
    pub roster_path: Option<PathBuf>,
    /// Room id or name to fight in. Defaults to the first combat room.
    pub room: Option<String>,
    pub seed: Option<u64>,
    pub log_dir: Option<PathBuf>,
    /// Print events as JSON lines instead of prose.
    pub json_events: bool,
    pub turn_tick: Duration,
    pub defense_step: Duration,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            config_path: None,
            rooms_path: None,
            roster_path: None,
            room: None,
            seed: None,
            log_dir: None,
            json_events: false,
            turn_tick: RuntimeConfig::DEFAULT_TURN_TICK,
            defense_step: RuntimeConfig::DEFAULT_DEFENSE_STEP,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_DATA_DIR` - Content directory (default: `data`)
    /// - `ARENA_CONFIG` - Arena tuning TOML (default: `<data>/config.toml`)
    /// - `ARENA_ROOMS` - Room table RON (default: `<data>/rooms.ron`)
    /// - `ARENA_ROSTER` - Fighter roster RON (default: `<data>/roster.ron`)
    /// - `ARENA_ROOM` - Room id or name to fight in
    /// - `ARENA_SEED` - Dice seed for a replayable run
    /// - `ARENA_LOG_DIR` - Log directory (default: platform cache dir)
    /// - `ARENA_JSON_EVENTS` - Print events as JSON lines (default: false)
    /// - `ARENA_TICK_MS` - Turn tick interval (default: 2000)
    /// - `ARENA_STEP_MS` - Defense countdown step (default: 1000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("ARENA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.config_path = env::var("ARENA_CONFIG").ok().map(PathBuf::from);
        config.rooms_path = env::var("ARENA_ROOMS").ok().map(PathBuf::from);
        config.roster_path = env::var("ARENA_ROSTER").ok().map(PathBuf::from);
        config.room = env::var("ARENA_ROOM")
            .ok()
            .filter(|room| !room.trim().is_empty());
        config.seed = read_env::<u64>("ARENA_SEED");
        config.log_dir = env::var("ARENA_LOG_DIR").ok().map(PathBuf::from);

        if let Some(enable) = read_env::<bool>("ARENA_JSON_EVENTS") {
            config.json_events = enable;
        } else if env::var("ARENA_JSON_EVENTS").is_ok() {
            // Also accept just setting the variable without value as "true"
            config.json_events = true;
        }

        if let Some(ms) = read_env::<u64>("ARENA_TICK_MS") {
            config.turn_tick = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = read_env::<u64>("ARENA_STEP_MS") {
            config.defense_step = Duration::from_millis(ms.max(1));
        }

        config
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("config.toml"))
    }

    pub fn rooms_path(&self) -> PathBuf {
        self.rooms_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("rooms.ron"))
    }

    pub fn roster_path(&self) -> PathBuf {
        self.roster_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("roster.ron"))
    }

    /// Log directory, following platform conventions when not set:
    /// - macOS: `~/Library/Caches/arena/logs`
    /// - Linux: `~/.cache/arena/logs` (or `$XDG_CACHE_HOME/arena/logs`)
    /// - Windows: `%LOCALAPPDATA%\arena\logs`
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "arena")
                .map(|dirs| dirs.cache_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("/tmp/arena"))
                .join("logs")
        })
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_default_into_the_data_dir() {
        let config = CliConfig {
            data_dir: PathBuf::from("content"),
            roster_path: Some(PathBuf::from("elsewhere/roster.ron")),
            ..CliConfig::default()
        };
        assert_eq!(config.config_path(), PathBuf::from("content/config.toml"));
        assert_eq!(config.rooms_path(), PathBuf::from("content/rooms.ron"));
        assert_eq!(config.roster_path(), PathBuf::from("elsewhere/roster.ron"));
    }

    #[test]
    fn explicit_log_dir_wins() {
        let config = CliConfig {
            log_dir: Some(PathBuf::from("/var/log/arena")),
            ..CliConfig::default()
        };
        assert_eq!(config.log_dir(), PathBuf::from("/var/log/arena"));
    }
}
