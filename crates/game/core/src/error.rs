//! Common error infrastructure for arena-core.
//!
//! Domain errors (`CheckError`, `CommandError`, `ComposeError`, ...) live next
//! to the operations that produce them. Every one of them implements
//! [`GameError`] so callers can classify failures without matching on each
//! variant.
//!
//! The `Display` text of engine errors is the message shown to the player who
//! issued the rejected command. A rejected command never mutates state.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same command may succeed later (e.g. on your turn)
/// - **Validation**: the input itself is wrong and must change before retrying
/// - **Internal**: unexpected state inconsistency, indicates a bug
/// - **Fatal**: the encounter cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative action.
    ///
    /// Examples: not your turn, attacks still unresolved
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown target, special move too expensive
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - encounter state corrupted, cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all arena-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Error codes are stable identifiers, safe to log and assert on
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
