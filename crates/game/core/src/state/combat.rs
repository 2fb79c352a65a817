//! Encounter-scoped fighter state.

use std::collections::BTreeSet;

use crate::condition::Conditions;
use crate::special::EffectList;

use super::FighterId;

/// Melee attacks need range 0; ranged attacks anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AttackType {
    Melee,
    Ranged,
}

impl AttackType {
    /// The type a plain attack takes at the given range.
    pub const fn for_range(range: u32) -> Self {
        if range == 0 { Self::Melee } else { Self::Ranged }
    }
}

/// An attack waiting for the target's response.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncomingAttack {
    pub roll: u32,
    pub attacker: FighterId,
    pub effects: EffectList,
    pub kind: AttackType,
}

/// The follow-up granted by a Double Attack.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecondAttack {
    pub kind: AttackType,
    pub effects: EffectList,
}

/// Most recent turn-ending choice of a fighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LastAction {
    Attack,
    Special,
    Dash,
    Charge,
    Pass,
    Disengage,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    pub actions: u32,
    pub moves: u32,
    pub conditions: Conditions,
    pub incoming: Option<IncomingAttack>,
    /// Steps left before an unanswered attack is defended automatically.
    pub defense_countdown: Option<u32>,
    pub second: Option<SecondAttack>,
    /// `None` until the fighter does anything this encounter.
    pub last_action: Option<LastAction>,
    /// Lower-cased names of charged special moves.
    pub charged: BTreeSet<String>,
    pub used_special: bool,
}

impl CombatState {
    /// True when the fighter has nothing left to do this turn.
    pub fn is_spent(&self) -> bool {
        self.actions == 0 && self.moves == 0 && self.second.is_none()
    }

    pub fn is_charged(&self, special: &str) -> bool {
        self.charged.contains(&special.to_lowercase())
    }
}
