//! Content loaders for reading arena data from files.
//!
//! Each loader has a `load` taking a path and a `parse` taking the file's
//! text, so callers can feed content from anywhere.

pub mod config;
pub mod factory;
pub mod rooms;
pub mod roster;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use rooms::RoomLoader;
pub use roster::{RosterEntry, RosterLoader, SpecialSpec};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
