//! Worker tasks that back the runtime orchestration.
//!
//! The lobby worker owns every fighter outside combat and spawns one
//! encounter worker per fight. Timer tasks feed ticks into encounter workers
//! through the same channel player commands use, so an encounter sees one
//! ordered stream of events.

mod encounter;
mod lobby;
mod timers;

pub(crate) use encounter::{EncounterCommand, EncounterLink};
pub(crate) use lobby::{LobbyCommand, LobbyWorker};
