//! Public API surface for runtime consumers.
//!
//! Re-exports the handle, command provider abstraction, encounter views, and
//! error types that clients interact with.
pub mod errors;
pub mod handle;
pub mod providers;
pub mod view;

pub use errors::{Result, RuntimeError};
pub use handle::RuntimeHandle;
pub use providers::{CommandProvider, PassiveProvider};
pub use view::EncounterView;
