//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and the engine's own rejections
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use arena_core::{
    CommandError, EncounterError, EntryError, ErrorSeverity, FighterId, GameError, RoomId,
};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("lobby worker command channel closed")]
    CommandChannelClosed,

    #[error("encounter in {room} is no longer accepting commands")]
    EncounterClosed { room: RoomId },

    #[error("worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a world oracle to be configured before building")]
    MissingWorld,

    #[error("{room} does not exist")]
    UnknownRoom { room: RoomId },

    #[error("fighter {fighter} is not registered")]
    UnknownFighter { fighter: FighterId },

    #[error("fighter {fighter} is already registered")]
    AlreadyRegistered { fighter: FighterId },

    #[error("the name {name} is already taken")]
    NameTaken { name: String },

    #[error("fighter {fighter} is not in {room}")]
    NotInRoom { fighter: FighterId, room: RoomId },

    #[error("You can't do that while in combat.")]
    InCombat { fighter: FighterId },

    #[error("You can't rest here.")]
    NoRecoveryHere { room: RoomId },

    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error(transparent)]
    Encounter(#[from] EncounterError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Entry(err) => err.severity(),
            Self::Encounter(err) => err.severity(),
            Self::Command(err) => err.severity(),
            Self::InCombat { .. } | Self::EncounterClosed { .. } => ErrorSeverity::Recoverable,
            Self::UnknownRoom { .. }
            | Self::UnknownFighter { .. }
            | Self::AlreadyRegistered { .. }
            | Self::NameTaken { .. }
            | Self::NotInRoom { .. }
            | Self::NoRecoveryHere { .. } => ErrorSeverity::Validation,
            Self::MissingWorld => ErrorSeverity::Fatal,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Entry(err) => err.error_code(),
            Self::Encounter(err) => err.error_code(),
            Self::Command(err) => err.error_code(),
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::EncounterClosed { .. } => "RUNTIME_ENCOUNTER_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingWorld => "RUNTIME_MISSING_WORLD",
            Self::UnknownRoom { .. } => "RUNTIME_UNKNOWN_ROOM",
            Self::UnknownFighter { .. } => "RUNTIME_UNKNOWN_FIGHTER",
            Self::AlreadyRegistered { .. } => "RUNTIME_ALREADY_REGISTERED",
            Self::NameTaken { .. } => "RUNTIME_NAME_TAKEN",
            Self::NotInRoom { .. } => "RUNTIME_NOT_IN_ROOM",
            Self::InCombat { .. } => "RUNTIME_IN_COMBAT",
            Self::NoRecoveryHere { .. } => "RUNTIME_NO_RECOVERY_HERE",
        }
    }
}
