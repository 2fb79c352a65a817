//! Deterministic combat rules for a turn-based, multi-fighter arena.
//!
//! `arena-core` owns the canonical rules (ranges, rolls, conditions, special
//! moves, turn order) and exposes synchronous APIs with no I/O and no clock.
//! All encounter mutation flows through [`engine::Encounter`]; observable
//! changes come back out as [`notice::Notice`]s and timer needs as
//! [`notice::TimerRequest`]s, which the runtime fulfils.
pub mod combat;
pub mod condition;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod notice;
pub mod range;
pub mod special;
pub mod state;
pub mod stats;

pub use combat::{AttackError, DefenseAction, DefenseOutcome};
pub use condition::{Condition, ConditionKind, Conditions};
pub use config::ArenaConfig;
pub use engine::{
    AllyOp, CheckError, Checks, CommandError, Encounter, EncounterError, Phase, PlayerCommand,
    Steps, apply_ally,
};
pub use env::{
    FighterDirectory, PcgRng, RngOracle, RoomInfo, ScriptedRng, WorldOracle, compute_seed,
};
pub use error::{ErrorSeverity, GameError};
pub use notice::{Audience, EncounterOutcome, Notice, NoticeKind, Outbox, RangeLine, TimerRequest};
pub use range::{Direction, MoveMode, MovementSummary, RangeMap, range_name};
pub use special::{
    ComposeError, EffectKind, EffectList, Loadout, LoadoutError, MoveCategory, SpecialMove,
};
pub use state::{
    AttackType, Combatant, EntryError, Fighter, FighterId, LastAction, RoomId, Roster,
};
pub use stats::{ResourceMaximums, StatError, StatKind, Stats};
