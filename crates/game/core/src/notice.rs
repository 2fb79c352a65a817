//! Structured output of the engine.
//!
//! The engine never writes prose beyond `<self>`/`<target>` templates. Every
//! observable change is pushed to an [`Outbox`] as a [`Notice`] for the
//! display layer, and every timer it needs is pushed as a [`TimerRequest`]
//! for the scheduling layer. Callers drain the outbox after each operation.

use crate::condition::ConditionKind;
use crate::range::MovementSummary;
use crate::special::EffectList;
use crate::state::{AttackType, FighterId};

/// Who a notice is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Audience {
    /// Everyone in the encounter.
    All,
    /// A single fighter.
    Fighter(FighterId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notice {
    pub audience: Audience,
    pub kind: NoticeKind,
}

/// Why an encounter ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncounterOutcome {
    AllDisengaged,
    Winner(FighterId),
    NoSurvivors,
    /// Torn down from outside the turn loop.
    Stopped,
}

/// One row of a range report: fighters sharing a position, and their range.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeLine {
    pub fighters: Vec<FighterId>,
    pub range: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum NoticeKind {
    // ===== encounter lifecycle =====
    FightStarted {
        instigator: FighterId,
    },
    Joined {
        fighter: FighterId,
    },
    TurnOrder {
        order: Vec<FighterId>,
    },
    TurnStarted {
        previous: Option<FighterId>,
        current: FighterId,
    },
    Prompt {
        hp: u32,
        hp_max: u32,
        sp: u32,
        sp_max: u32,
        actions: u32,
        moves: u32,
    },
    TurnWarning,
    TimedOut {
        fighter: FighterId,
    },
    EncounterEnded {
        outcome: EncounterOutcome,
    },

    // ===== conditions =====
    /// Reminder at turn start of a condition the fighter carries.
    ConditionActive {
        kind: ConditionKind,
    },
    ConditionApplied {
        fighter: FighterId,
        kind: ConditionKind,
    },
    ConditionExpired {
        fighter: FighterId,
        kind: ConditionKind,
    },

    // ===== attacks and defenses =====
    AttackQueued {
        attacker: FighterId,
        target: FighterId,
        text: String,
        roll: u32,
        kind: AttackType,
        effects: EffectList,
    },
    SecondAttackReady,
    IncomingAttack {
        attacker: FighterId,
    },
    DefenseWarning {
        attacker: FighterId,
    },
    AutoDefend,
    /// Defense beat or matched the attack. `roll` is `None` for endure.
    Defended {
        defender: FighterId,
        attacker: FighterId,
        roll: Option<u32>,
    },
    DamageTaken {
        defender: FighterId,
        attacker: FighterId,
        damage: u32,
        roll: Option<u32>,
    },
    Reflected {
        defender: FighterId,
        attacker: FighterId,
        roll: u32,
        effects: EffectList,
    },
    HpLost {
        fighter: FighterId,
        amount: u32,
    },
    Healed {
        fighter: FighterId,
        amount: u32,
    },
    SpRestored {
        fighter: FighterId,
        amount: u32,
    },
    Defeated {
        fighter: FighterId,
    },

    // ===== turn actions =====
    Moved(MovementSummary),
    /// `text` is the fighter's own flavour line, if they gave one.
    Dashed {
        fighter: FighterId,
        text: Option<String>,
        bonus: u32,
    },
    /// Movement gained from a Super Dash.
    Surged {
        fighter: FighterId,
        bonus: u32,
    },
    Immobilized,
    Charged {
        fighter: FighterId,
        text: Option<String>,
        special: String,
    },
    /// Special attacks carry their text on the following `AttackQueued`.
    SpecialUsed {
        fighter: FighterId,
        special: String,
        cost: u32,
        text: Option<String>,
        effects: EffectList,
    },
    Passed {
        fighter: FighterId,
        text: Option<String>,
    },
    Disengaged {
        fighter: FighterId,
        text: Option<String>,
    },

    // ===== queries =====
    AllyAdded {
        other: FighterId,
    },
    AllyRemoved {
        other: FighterId,
    },
    AllyList {
        allies: Vec<FighterId>,
    },
    RangeReport {
        lines: Vec<RangeLine>,
    },
}

/// Timers the engine needs the scheduling layer to run or cancel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimerRequest {
    /// Start the repeating turn tick that drives `Encounter::on_tick`.
    StartTurnTicker,
    StopTurnTicker,
    /// Start (or restart) the per-step defense countdown for a fighter.
    StartDefenseCountdown(FighterId),
    CancelDefenseCountdown(FighterId),
}

/// Pending notices and timer requests, in emission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outbox {
    notices: Vec<Notice>,
    timers: Vec<TimerRequest>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broadcast(&mut self, kind: NoticeKind) {
        self.notices.push(Notice {
            audience: Audience::All,
            kind,
        });
    }

    pub fn whisper(&mut self, fighter: FighterId, kind: NoticeKind) {
        self.notices.push(Notice {
            audience: Audience::Fighter(fighter),
            kind,
        });
    }

    pub fn timer(&mut self, request: TimerRequest) {
        self.timers.push(request);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn timers(&self) -> &[TimerRequest] {
        &self.timers
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty() && self.timers.is_empty()
    }

    /// Takes everything emitted so far, leaving the outbox empty.
    pub fn drain(&mut self) -> (Vec<Notice>, Vec<TimerRequest>) {
        (
            std::mem::take(&mut self.notices),
            std::mem::take(&mut self.timers),
        )
    }
}
