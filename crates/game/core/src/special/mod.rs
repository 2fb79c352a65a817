//! Special moves: the effect catalog, the composer that validates effect
//! combinations, and the per-fighter loadout of defined moves.

pub mod catalog;
mod compose;
mod loadout;

pub use catalog::{
    CATALOG, EffectDefinition, EffectKind, EffectList, MoveCategories, MoveCategory, Placement,
};
pub use compose::{
    ComposeError, first_effect_options, second_effect_options, total_cost, validate_effects,
    verify,
};
pub use loadout::{Loadout, LoadoutError, SpecialMove};
