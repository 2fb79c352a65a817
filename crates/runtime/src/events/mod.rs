//! Topic-based event bus for runtime events.
//!
//! Engine notices go out on [`Topic::Combat`]; encounter bookkeeping (start,
//! end, fighters handed back to the lobby) goes out on [`Topic::Lifecycle`].
//! Consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{CombatEvent, LifecycleEvent};
