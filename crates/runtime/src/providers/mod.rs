//! Command provider implementations and the loop that drives them.

pub mod autopilot;
pub mod bot;

pub use autopilot::Autopilot;
pub use bot::BotProvider;
