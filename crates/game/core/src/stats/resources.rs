//! Resources - HP and SP.
//!
//! - Maximum values: computed from [`Stats`] (NOT stored)
//! - Current values: fighter state (MUST be stored)
//!
//! Formulas:
//! - HP_max = max(3 × VIT, 1)
//! - SP_max = 2 × SPE

use super::core::Stats;

/// Enum representing individual resource types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    /// Health points.
    Hp,
    /// Special points, spent on special moves.
    Sp,
}

/// Maximum resource values computed from stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMaximums {
    pub hp_max: u32,
    pub sp_max: u32,
}

impl ResourceMaximums {
    pub fn from_stats(stats: &Stats) -> Self {
        Self {
            hp_max: Self::compute_hp(stats),
            sp_max: Self::compute_sp(stats),
        }
    }

    pub fn get(&self, resource: ResourceKind) -> u32 {
        match resource {
            ResourceKind::Hp => self.hp_max,
            ResourceKind::Sp => self.sp_max,
        }
    }

    /// Formula: max(3 × VIT, 1)
    pub fn compute_hp(stats: &Stats) -> u32 {
        (u32::from(stats.vit) * 3).max(1)
    }

    /// Formula: 2 × SPE
    pub fn compute_sp(stats: &Stats) -> u32 {
        u32::from(stats.spe) * 2
    }
}

/// Current resource values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCurrent {
    pub hp: u32,
    pub sp: u32,
}

impl ResourceCurrent {
    pub const fn new(hp: u32, sp: u32) -> Self {
        Self { hp, sp }
    }

    /// Create current resources at maximum.
    pub const fn at_max(max: &ResourceMaximums) -> Self {
        Self {
            hp: max.hp_max,
            sp: max.sp_max,
        }
    }

    /// Clamp both pools into `0..=max`.
    pub fn clamp_to(&mut self, max: &ResourceMaximums) {
        self.hp = self.hp.min(max.hp_max);
        self.sp = self.sp.min(max.sp_max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vitality_zero_still_has_one_hp() {
        let max = ResourceMaximums::from_stats(&Stats::ZERO);
        assert_eq!(max.hp_max, 1);
        assert_eq!(max.sp_max, 0);
    }

    #[test]
    fn maxima_scale_with_stats() {
        let stats = Stats {
            vit: 5,
            spe: 4,
            ..Stats::ZERO
        };
        let max = ResourceMaximums::from_stats(&stats);
        assert_eq!(max.get(ResourceKind::Hp), 15);
        assert_eq!(max.get(ResourceKind::Sp), 8);
    }
}
