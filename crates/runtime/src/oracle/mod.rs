//! In-memory adapters for the engine's collaborator traits.
//!
//! [`RoomTable`] serves [`arena_core::WorldOracle`] from static room data and
//! [`FighterIndex`] serves [`arena_core::FighterDirectory`] from the set of
//! registered fighters. Both are cheap to clone and shared across workers.
mod directory;
mod rooms;

pub use directory::FighterIndex;
pub use rooms::RoomTable;
