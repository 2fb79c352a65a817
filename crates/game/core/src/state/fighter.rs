//! Persistent fighter data.
//!
//! A [`Fighter`] survives between encounters; everything that only makes
//! sense during a fight lives in [`super::CombatState`] instead and is
//! dropped when the encounter stops.

use std::collections::BTreeSet;

use crate::config::ArenaConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::special::{ComposeError, Loadout, verify};
use crate::stats::{ResourceCurrent, ResourceMaximums, StatError, Stats};

use super::FighterId;

/// Result of applying damage to a fighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageReport {
    /// HP actually removed.
    pub dealt: u32,
    /// True only on the hit that brought HP to 0.
    pub defeated: bool,
}

/// Why a fighter may not be admitted into play.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error(transparent)]
    Stats(#[from] StatError),

    #[error("You have {count} special moves. You can only have {max}!")]
    TooManySpecials { count: usize, max: usize },

    #[error(transparent)]
    Special(#[from] ComposeError),
}

impl GameError for EntryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Stats(err) => err.error_code(),
            Self::TooManySpecials { .. } => "ENTRY_TOO_MANY_SPECIALS",
            Self::Special(err) => err.error_code(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fighter {
    pub id: FighterId,
    pub name: String,
    stats: Stats,
    resources: ResourceCurrent,
    allies: BTreeSet<FighterId>,
    loadout: Loadout,
}

impl Fighter {
    /// Creates a fighter at full HP and SP.
    pub fn new(id: FighterId, name: impl Into<String>, stats: Stats) -> Self {
        let max = ResourceMaximums::from_stats(&stats);
        Self {
            id,
            name: name.into(),
            stats,
            resources: ResourceCurrent::at_max(&max),
            allies: BTreeSet::new(),
            loadout: Loadout::new(),
        }
    }

    pub fn with_loadout(mut self, loadout: Loadout) -> Self {
        self.loadout = loadout;
        self
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Replaces the stat block, clamping current HP/SP to the new maxima.
    pub fn set_stats(&mut self, stats: Stats) {
        self.stats = stats;
        let max = self.maximums();
        self.resources.clamp_to(&max);
    }

    pub fn maximums(&self) -> ResourceMaximums {
        ResourceMaximums::from_stats(&self.stats)
    }

    pub fn hp(&self) -> u32 {
        self.resources.hp
    }

    pub fn sp(&self) -> u32 {
        self.resources.sp
    }

    pub fn is_defeated(&self) -> bool {
        self.resources.hp == 0
    }

    /// Removes up to `amount` HP, flooring at 0.
    ///
    /// Hitting a fighter who is already at 0 HP changes nothing and does not
    /// report a second defeat.
    pub fn take_damage(&mut self, amount: u32) -> DamageReport {
        if self.is_defeated() {
            return DamageReport {
                dealt: 0,
                defeated: false,
            };
        }
        let dealt = amount.min(self.resources.hp);
        self.resources.hp -= dealt;
        DamageReport {
            dealt,
            defeated: self.resources.hp == 0,
        }
    }

    /// Restores up to `amount` HP without exceeding the maximum. Returns the
    /// HP actually gained.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let max = self.maximums().hp_max;
        let before = self.resources.hp;
        self.resources.hp = before.saturating_add(amount).min(max);
        self.resources.hp - before
    }

    /// Restores up to `amount` SP without exceeding the maximum.
    pub fn restore_sp(&mut self, amount: u32) -> u32 {
        let max = self.maximums().sp_max;
        let before = self.resources.sp;
        self.resources.sp = before.saturating_add(amount).min(max);
        self.resources.sp - before
    }

    /// Spends SP; callers check affordability first.
    pub fn spend_sp(&mut self, amount: u32) {
        debug_assert!(amount <= self.resources.sp, "spent more SP than available");
        self.resources.sp = self.resources.sp.saturating_sub(amount);
    }

    /// Full HP and SP.
    pub fn recover(&mut self) {
        self.resources = ResourceCurrent::at_max(&self.maximums());
    }

    pub fn allies(&self) -> impl Iterator<Item = FighterId> + '_ {
        self.allies.iter().copied()
    }

    pub fn is_ally(&self, other: FighterId) -> bool {
        self.allies.contains(&other)
    }

    /// Returns false if `other` was already an ally.
    pub fn add_ally(&mut self, other: FighterId) -> bool {
        self.allies.insert(other)
    }

    /// Returns false if `other` was not an ally.
    pub fn remove_ally(&mut self, other: FighterId) -> bool {
        self.allies.remove(&other)
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn loadout_mut(&mut self) -> &mut Loadout {
        &mut self.loadout
    }

    /// Re-checks stats and every special move before the fighter enters
    /// play. Stats may have changed since the moves were defined.
    pub fn verify_for_entry(&self) -> Result<(), EntryError> {
        self.stats.validate()?;
        self.stats.validate_total()?;
        let count = self.loadout.len();
        if count > ArenaConfig::MAX_SPECIAL_MOVES {
            return Err(EntryError::TooManySpecials {
                count,
                max: ArenaConfig::MAX_SPECIAL_MOVES,
            });
        }
        let sp_max = self.maximums().sp_max;
        for special in self.loadout.iter() {
            verify(&self.stats, sp_max, special)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(vit: u8) -> Fighter {
        let stats = Stats {
            vit,
            spe: 2,
            ..Stats::ZERO
        };
        Fighter::new(FighterId(1), "Tester", stats)
    }

    #[test]
    fn starts_at_full_resources() {
        let f = fighter(5);
        assert_eq!(f.hp(), 15);
        assert_eq!(f.sp(), 4);
    }

    #[test]
    fn overkill_floors_and_defeat_reports_once() {
        let mut f = fighter(5);
        let first = f.take_damage(20);
        assert_eq!(first, DamageReport { dealt: 15, defeated: true });
        assert_eq!(f.hp(), 0);

        let again = f.take_damage(3);
        assert_eq!(again, DamageReport { dealt: 0, defeated: false });
        assert_eq!(f.hp(), 0);
    }

    #[test]
    fn healing_caps_at_maximum() {
        let mut f = fighter(2);
        f.take_damage(4);
        assert_eq!(f.heal(10), 4);
        assert_eq!(f.hp(), 6);
    }

    #[test]
    fn lowering_stats_clamps_resources() {
        let mut f = fighter(5);
        f.set_stats(Stats {
            vit: 1,
            ..Stats::ZERO
        });
        assert_eq!(f.hp(), 3);
        assert_eq!(f.sp(), 0);
    }

    #[test]
    fn entry_rechecks_moves_against_current_stats() {
        use crate::special::{EffectKind, MoveCategory, SpecialMove};

        let strong = Stats {
            atm: 6,
            vit: 5,
            spe: 3,
            ..Stats::ZERO
        };
        let smash = SpecialMove::define(
            "Smash",
            MoveCategory::MeleeAttack,
            &[EffectKind::DoubleDamage, EffectKind::Leech],
            "",
            &strong,
        )
        .unwrap();
        let mut f = Fighter::new(FighterId(1), "Tester", strong);
        f.loadout_mut().add(smash).unwrap();
        assert!(f.verify_for_entry().is_ok());

        // SP max drops to 2, below the move's cost of 4.
        f.set_stats(Stats { spe: 1, ..strong });
        assert!(matches!(
            f.verify_for_entry(),
            Err(EntryError::Special(ComposeError::NotEnoughTotalSp { cost: 4, sp_max: 2, .. }))
        ));
    }

    #[test]
    fn entry_enforces_stat_total() {
        let f = Fighter::new(
            FighterId(1),
            "Tester",
            Stats::new(10, 10, 10, 10, 0, 0).unwrap(),
        );
        assert!(matches!(
            f.verify_for_entry(),
            Err(EntryError::Stats(StatError::TotalTooHigh { total: 40, .. }))
        ));
    }

    #[test]
    fn allies_are_a_set() {
        let mut f = fighter(1);
        assert!(f.add_ally(FighterId(2)));
        assert!(!f.add_ally(FighterId(2)));
        assert!(f.is_ally(FighterId(2)));
        assert!(f.remove_ally(FighterId(2)));
        assert!(!f.remove_ally(FighterId(2)));
    }
}
