//! Content factory for loading a whole arena from a data directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use arena_core::{ArenaConfig, RoomInfo};

use crate::loaders::{ConfigLoader, LoadResult, RoomLoader, RosterEntry, RosterLoader};

/// Content factory that loads arena content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── rooms.ron
/// └── roster.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load arena tuning from `config.toml`, falling back to defaults when
    /// the file is absent.
    pub fn load_config(&self) -> LoadResult<ArenaConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(ArenaConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the room table from `rooms.ron`.
    pub fn load_rooms(&self) -> LoadResult<Vec<RoomInfo>> {
        let path = self.data_dir.join("rooms.ron");
        RoomLoader::load(&path).with_context(|| format!("loading rooms from {}", path.display()))
    }

    /// Load fighters from `roster.ron`.
    pub fn load_roster(&self) -> LoadResult<Vec<RosterEntry>> {
        let path = self.data_dir.join("roster.ron");
        RosterLoader::load(&path)
            .with_context(|| format!("loading roster from {}", path.display()))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
