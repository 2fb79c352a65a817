//! Timed conditions attached to a fighter.
//!
//! # Tick-owner based duration
//!
//! Each condition counts down only when its tick-owner's turn ends, which is
//! not necessarily the turn of the fighter carrying it: a buff granted by an
//! ally runs on the ally's clock. Durations are stored inclusive (a 3-turn
//! buff is created with 4) because the owner's current turn also ends once.

use arrayvec::ArrayVec;

use crate::state::FighterId;

/// Kinds of condition. At most one of each can be active.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionKind {
    #[strum(serialize = "Buffed ATK")]
    BuffedAtk,
    #[strum(serialize = "Buffed DEF")]
    BuffedDef,
    #[strum(serialize = "Buffed MOB")]
    BuffedMob,
    #[strum(serialize = "Debuffed ATK")]
    DebuffedAtk,
    #[strum(serialize = "Debuffed DEF")]
    DebuffedDef,
    #[strum(serialize = "Debuffed MOB")]
    DebuffedMob,
    Immobilization,
    #[strum(serialize = "Disabled Action")]
    DisabledAction,
}

/// One active condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    pub kind: ConditionKind,
    /// Turns left, decremented at the end of each of the tick-owner's turns.
    pub remaining: u32,
    pub tick_owner: FighterId,
}

/// Active conditions on one fighter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conditions {
    entries: ArrayVec<Condition, { <ConditionKind as strum::EnumCount>::COUNT }>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `kind`, replacing any existing condition of the same kind.
    pub fn add(&mut self, kind: ConditionKind, remaining: u32, tick_owner: FighterId) {
        let condition = Condition {
            kind,
            remaining,
            tick_owner,
        };
        match self.entries.iter_mut().find(|c| c.kind == kind) {
            Some(existing) => *existing = condition,
            // One slot per kind, so this never overflows.
            None => self.entries.push(condition),
        }
    }

    pub fn has(&self, kind: ConditionKind) -> bool {
        self.entries.iter().any(|c| c.kind == kind)
    }

    pub fn get(&self, kind: ConditionKind) -> Option<&Condition> {
        self.entries.iter().find(|c| c.kind == kind)
    }

    /// Counts down every condition owned by `turn_owner` and returns the
    /// kinds that expired.
    pub fn tickdown(&mut self, turn_owner: FighterId) -> Vec<ConditionKind> {
        for condition in self.entries.iter_mut() {
            if condition.tick_owner == turn_owner {
                condition.remaining = condition.remaining.saturating_sub(1);
            }
        }
        let expired = self
            .entries
            .iter()
            .filter(|c| c.remaining == 0)
            .map(|c| c.kind)
            .collect();
        self.entries.retain(|c| c.remaining > 0);
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Net attack roll modifier from buffed/debuffed ATK.
    pub fn attack_modifier(&self) -> i32 {
        self.modifier(ConditionKind::BuffedAtk, ConditionKind::DebuffedAtk)
    }

    /// Net defense roll modifier from buffed/debuffed DEF.
    pub fn defense_modifier(&self) -> i32 {
        self.modifier(ConditionKind::BuffedDef, ConditionKind::DebuffedDef)
    }

    fn modifier(&self, buff: ConditionKind, debuff: ConditionKind) -> i32 {
        i32::from(self.has(buff)) - i32::from(self.has(debuff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: FighterId = FighterId(1);
    const B: FighterId = FighterId(2);

    #[test]
    fn add_overwrites_same_kind() {
        let mut conditions = Conditions::new();
        conditions.add(ConditionKind::BuffedAtk, 4, A);
        conditions.add(ConditionKind::BuffedAtk, 2, B);

        let buff = conditions.get(ConditionKind::BuffedAtk).unwrap();
        assert_eq!(buff.remaining, 2);
        assert_eq!(buff.tick_owner, B);
        assert_eq!(conditions.iter().count(), 1);
    }

    #[test]
    fn tickdown_only_counts_owner_turns() {
        let mut conditions = Conditions::new();
        conditions.add(ConditionKind::Immobilization, 2, A);
        conditions.add(ConditionKind::DebuffedDef, 2, B);

        assert!(conditions.tickdown(B).is_empty());
        assert_eq!(conditions.tickdown(B), vec![ConditionKind::DebuffedDef]);
        assert!(conditions.has(ConditionKind::Immobilization));

        assert!(conditions.tickdown(A).is_empty());
        assert_eq!(conditions.tickdown(A), vec![ConditionKind::Immobilization]);
        assert!(conditions.is_empty());
    }

    #[test]
    fn modifiers_cancel_out() {
        let mut conditions = Conditions::new();
        conditions.add(ConditionKind::BuffedAtk, 4, A);
        assert_eq!(conditions.attack_modifier(), 1);
        conditions.add(ConditionKind::DebuffedAtk, 4, B);
        assert_eq!(conditions.attack_modifier(), 0);
        assert_eq!(conditions.defense_modifier(), 0);
    }
}
