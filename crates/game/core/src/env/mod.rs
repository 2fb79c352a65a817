//! Traits describing collaborators outside the engine.
//!
//! The world oracle reports room sizes and flags, the directory resolves
//! target names, and the RNG oracle supplies every roll. Implementations
//! live in the runtime and content crates (and in tests).
mod rng;
mod world;

pub use rng::{PcgRng, RngOracle, ScriptedRng, compute_seed};
pub use world::{FighterDirectory, RoomInfo, WorldOracle};
