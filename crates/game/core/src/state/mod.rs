//! Fighter state: persistent fighter data, encounter-scoped combat state,
//! and the turn-ordered roster an encounter owns.
mod combat;
mod common;
mod fighter;
mod roster;

pub use combat::{AttackType, CombatState, IncomingAttack, LastAction, SecondAttack};
pub use common::{FighterId, RoomId};
pub use fighter::{DamageReport, EntryError, Fighter};
pub use roster::{Combatant, Roster};
