//! Data-driven arena content and loaders.
//!
//! This crate reads the static data an arena needs from disk:
//! - Arena tunables (TOML)
//! - The room table (RON)
//! - The fighter roster, with stats, allies and special moves (RON)
//!
//! Content is handed to the runtime at startup and never changes while it
//! runs. All loaders build arena-core types directly, so every rule the
//! engine enforces on special moves also applies to content files.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, RoomLoader, RosterEntry, RosterLoader, SpecialSpec,
};
