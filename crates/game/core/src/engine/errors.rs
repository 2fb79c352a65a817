//! Error types for encounter commands and lifecycle.
//!
//! `Display` strings are the messages shown to the player who issued the
//! command; a rejected command never changes encounter state.

use crate::combat::AttackError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::FighterId;

/// A named precondition failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CheckError {
    #[error("You can only do that if you're in a fight!")]
    NotInCombat,

    #[error("You can't {action}, you've been defeated!")]
    Defeated { action: String },

    #[error("You can't {action} when it's not your turn!")]
    NotYourTurn { action: String },

    #[error("You've already used your action this turn!")]
    NoAction,

    #[error("You've already used all your movement this turn!")]
    NoMoves,

    #[error("Please wait for outstanding attacks to resolve!")]
    AttacksPending,

    #[error("You need to specify a target!")]
    NeedTarget,

    #[error("That is not a valid target!")]
    InvalidTarget,

    #[error("You can't {action} yourself!")]
    TargetSelf { action: String },

    #[error("{name} isn't in the fight!")]
    TargetNotInFight { name: String },

    #[error("{name} is too close to you for you to do that!")]
    TargetEngaged { name: String },

    #[error("{name} has already been defeated!")]
    TargetDefeated { name: String },
}

impl GameError for CheckError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotYourTurn { .. } | Self::AttacksPending => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotInCombat => "CHECK_NOT_IN_COMBAT",
            Self::Defeated { .. } => "CHECK_DEFEATED",
            Self::NotYourTurn { .. } => "CHECK_NOT_YOUR_TURN",
            Self::NoAction => "CHECK_NO_ACTION",
            Self::NoMoves => "CHECK_NO_MOVES",
            Self::AttacksPending => "CHECK_ATTACKS_PENDING",
            Self::NeedTarget => "CHECK_NEED_TARGET",
            Self::InvalidTarget => "CHECK_INVALID_TARGET",
            Self::TargetSelf { .. } => "CHECK_TARGET_SELF",
            Self::TargetNotInFight { .. } => "CHECK_TARGET_NOT_IN_FIGHT",
            Self::TargetEngaged { .. } => "CHECK_TARGET_ENGAGED",
            Self::TargetDefeated { .. } => "CHECK_TARGET_DEFEATED",
        }
    }
}

/// Any reason a player command was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Attack(#[from] AttackError),

    #[error("You don't have enough movement to move that many steps!")]
    TooManySteps,

    #[error("You can't move away any farther!")]
    CannotWithdrawFarther,

    #[error("You're immobilized! You can't move!")]
    Immobilized,

    #[error("There are no attacks aimed at you!")]
    NoIncomingAttack,

    #[error("You can't make a second attack!")]
    NoSecondAttack,

    #[error("You already used a special move this turn!")]
    SpecialAlreadyUsed,

    #[error("You need to specify a special move name!")]
    NeedSpecialName,

    #[error("You don't have that special move!")]
    UnknownSpecial,

    #[error("You don't have enough SP to use {name}!")]
    NotEnoughSp { name: String },

    #[error("You have too much HP to use {name}!")]
    TooMuchHp { name: String },

    #[error("You don't have enough HP to use {name}!")]
    NotEnoughHp { name: String },

    #[error("You need to spend an action to charge this move first! Use the 'charge' command!")]
    NotCharged,

    #[error("You can only use {name} on your first turn in combat!")]
    NotOpening { name: String },

    #[error("You can only use this special move on engaged targets (at range 0)!")]
    TouchOutOfReach,

    #[error("You can only use this defense against ranged attacks!")]
    RangedOnlyDefense,

    #[error("You can only use this defense against melee attacks!")]
    MeleeOnlyDefense,

    #[error("You don't need to charge that move!")]
    NoChargeNeeded,

    #[error("That move is already charged!")]
    AlreadyCharged,

    #[error("Please specify a valid target.")]
    InvalidAllyTarget,

    #[error("You already consider {name} an ally.")]
    AlreadyAlly { name: String },

    #[error("You already don't consider {name} an ally.")]
    NotAlly { name: String },
}

impl GameError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Check(err) => err.severity(),
            Self::Attack(err) => err.severity(),
            Self::NotEnoughSp { .. } | Self::TooManySteps | Self::Immobilized => {
                ErrorSeverity::Recoverable
            }
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Check(err) => err.error_code(),
            Self::Attack(err) => err.error_code(),
            Self::TooManySteps => "COMMAND_TOO_MANY_STEPS",
            Self::CannotWithdrawFarther => "COMMAND_CANNOT_WITHDRAW_FARTHER",
            Self::Immobilized => "COMMAND_IMMOBILIZED",
            Self::NoIncomingAttack => "COMMAND_NO_INCOMING_ATTACK",
            Self::NoSecondAttack => "COMMAND_NO_SECOND_ATTACK",
            Self::SpecialAlreadyUsed => "COMMAND_SPECIAL_ALREADY_USED",
            Self::NeedSpecialName => "COMMAND_NEED_SPECIAL_NAME",
            Self::UnknownSpecial => "COMMAND_UNKNOWN_SPECIAL",
            Self::NotEnoughSp { .. } => "COMMAND_NOT_ENOUGH_SP",
            Self::TooMuchHp { .. } => "COMMAND_TOO_MUCH_HP",
            Self::NotEnoughHp { .. } => "COMMAND_NOT_ENOUGH_HP",
            Self::NotCharged => "COMMAND_NOT_CHARGED",
            Self::NotOpening { .. } => "COMMAND_NOT_OPENING",
            Self::TouchOutOfReach => "COMMAND_TOUCH_OUT_OF_REACH",
            Self::RangedOnlyDefense => "COMMAND_RANGED_ONLY_DEFENSE",
            Self::MeleeOnlyDefense => "COMMAND_MELEE_ONLY_DEFENSE",
            Self::NoChargeNeeded => "COMMAND_NO_CHARGE_NEEDED",
            Self::AlreadyCharged => "COMMAND_ALREADY_CHARGED",
            Self::InvalidAllyTarget => "COMMAND_INVALID_ALLY_TARGET",
            Self::AlreadyAlly { .. } => "COMMAND_ALREADY_ALLY",
            Self::NotAlly { .. } => "COMMAND_NOT_ALLY",
        }
    }
}

/// Starting or joining an encounter failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncounterError {
    #[error("You're not allowed to fight here!")]
    CombatNotAllowed,

    #[error("There's nobody here to fight!")]
    NotEnoughFighters,

    #[error("{fighter} is already in the fight!")]
    AlreadyEnrolled { fighter: FighterId },

    #[error("the fight has already started")]
    AlreadyStarted,

    #[error("there is no fight in progress")]
    NotActive,
}

impl GameError for EncounterError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CombatNotAllowed | Self::NotEnoughFighters => ErrorSeverity::Validation,
            Self::AlreadyEnrolled { .. } => ErrorSeverity::Recoverable,
            Self::AlreadyStarted | Self::NotActive => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CombatNotAllowed => "ENCOUNTER_COMBAT_NOT_ALLOWED",
            Self::NotEnoughFighters => "ENCOUNTER_NOT_ENOUGH_FIGHTERS",
            Self::AlreadyEnrolled { .. } => "ENCOUNTER_ALREADY_ENROLLED",
            Self::AlreadyStarted => "ENCOUNTER_ALREADY_STARTED",
            Self::NotActive => "ENCOUNTER_NOT_ACTIVE",
        }
    }
}
