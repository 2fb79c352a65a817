//! Async runtime hosting arena encounters.
//!
//! The engine in `arena-core` is synchronous and knows nothing about time.
//! This crate owns the clocks and the concurrency: a lobby worker keeps every
//! fighter that is not currently fighting, and each active encounter runs in
//! its own worker task that turns timer ticks and player commands into engine
//! calls, then publishes the resulting notices.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`oracle`] provides in-memory world and directory adapters
//! - [`providers`] holds command providers such as the demo bot
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod oracle;
pub mod providers;
pub mod runtime;

mod workers;

pub use api::{
    CommandProvider, EncounterView, PassiveProvider, Result, RuntimeError, RuntimeHandle,
};
pub use events::{CombatEvent, Event, EventBus, LifecycleEvent, Topic};
pub use oracle::{FighterIndex, RoomTable};
pub use providers::{Autopilot, BotProvider};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
