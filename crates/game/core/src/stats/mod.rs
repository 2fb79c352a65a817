//! Stat and resource model.
//!
//! A fighter is described by six base stats in `0..=10`. HP and SP maxima are
//! derived from them and never stored; only the current values are.
//!
//! ```text
//! [ Stats (ATM DEF VIT ATR MOB SPE) ]
//!      ↓
//! [ ResourceMaximums (HP = 3×VIT min 1, SP = 2×SPE) ]
//!      ↓
//! [ ResourceCurrent (clamped to maximums) ]
//! ```

pub mod core;
pub mod resources;

pub use core::{StatError, StatKind, Stats};
pub use resources::{ResourceCurrent, ResourceKind, ResourceMaximums};
