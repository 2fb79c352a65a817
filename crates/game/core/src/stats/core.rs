//! Base stats - the only persistent numbers describing a fighter.

use crate::config::ArenaConfig;
use crate::error::{ErrorSeverity, GameError};

/// Names the six base stats, in their canonical order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatKind {
    /// Melee attack.
    Atm,
    /// Defense.
    Def,
    /// Vitality.
    Vit,
    /// Ranged attack.
    Atr,
    /// Mobility.
    Mob,
    /// Special.
    Spe,
}

/// Six base stats.
///
/// Also used as a minimum-requirement vector by the effect catalog, where
/// [`Stats::meets`] compares component-wise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub atm: u8,
    pub def: u8,
    pub vit: u8,
    pub atr: u8,
    pub mob: u8,
    pub spe: u8,
}

impl Stats {
    pub const ZERO: Self = Self {
        atm: 0,
        def: 0,
        vit: 0,
        atr: 0,
        mob: 0,
        spe: 0,
    };

    /// Builds a stat block, rejecting any value above [`ArenaConfig::MAX_STAT`].
    pub fn new(atm: u8, def: u8, vit: u8, atr: u8, mob: u8, spe: u8) -> Result<Self, StatError> {
        let stats = Self {
            atm,
            def,
            vit,
            atr,
            mob,
            spe,
        };
        stats.validate()?;
        Ok(stats)
    }

    pub const fn get(&self, kind: StatKind) -> u8 {
        match kind {
            StatKind::Atm => self.atm,
            StatKind::Def => self.def,
            StatKind::Vit => self.vit,
            StatKind::Atr => self.atr,
            StatKind::Mob => self.mob,
            StatKind::Spe => self.spe,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, u8)> + '_ {
        <StatKind as strum::IntoEnumIterator>::iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn total(&self) -> u32 {
        self.iter().map(|(_, value)| u32::from(value)).sum()
    }

    /// Checks every stat against the per-stat maximum.
    pub fn validate(&self) -> Result<(), StatError> {
        match self.iter().find(|(_, value)| *value > ArenaConfig::MAX_STAT) {
            Some((stat, value)) => Err(StatError::OutOfRange { stat, value }),
            None => Ok(()),
        }
    }

    /// Checks the point-buy cap used when admitting a fighter into play.
    pub fn validate_total(&self) -> Result<(), StatError> {
        let total = self.total();
        if total > ArenaConfig::MAX_STAT_TOTAL {
            return Err(StatError::TotalTooHigh {
                total,
                max: ArenaConfig::MAX_STAT_TOTAL,
            });
        }
        Ok(())
    }

    /// Returns true if every component is at least the corresponding requirement.
    pub fn meets(&self, required: &Stats) -> bool {
        self.iter().all(|(kind, value)| value >= required.get(kind))
    }

    /// Movement granted at the start of each turn: ⌊MOB/2⌋.
    pub const fn base_moves(&self) -> u32 {
        self.mob as u32 / 2
    }

    /// Movement granted by a dash: ⌈MOB/2⌉.
    pub const fn dash_moves(&self) -> u32 {
        (self.mob as u32).div_ceil(2)
    }
}

/// Errors raised when building or admitting a stat block.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatError {
    #[error("{stat} must be between 0 and 10 (got {value})")]
    OutOfRange { stat: StatKind, value: u8 },

    #[error("Your stats add up to {total}, but the limit is {max}!")]
    TotalTooHigh { total: u32, max: u32 },
}

impl GameError for StatError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "STAT_OUT_OF_RANGE",
            Self::TotalTooHigh { .. } => "STAT_TOTAL_TOO_HIGH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_stat_above_ten() {
        let err = Stats::new(11, 0, 0, 0, 0, 0).unwrap_err();
        assert_eq!(
            err,
            StatError::OutOfRange {
                stat: StatKind::Atm,
                value: 11
            }
        );
    }

    #[test]
    fn total_cap_is_thirty_six() {
        let ok = Stats::new(6, 6, 6, 6, 6, 6).unwrap();
        assert!(ok.validate_total().is_ok());

        let over = Stats::new(7, 6, 6, 6, 6, 6).unwrap();
        assert!(matches!(
            over.validate_total(),
            Err(StatError::TotalTooHigh { total: 37, .. })
        ));
    }

    #[test]
    fn movement_split_rounds_down_then_up() {
        let stats = Stats {
            mob: 7,
            ..Stats::ZERO
        };
        assert_eq!(stats.base_moves(), 3);
        assert_eq!(stats.dash_moves(), 4);
    }

    #[test]
    fn meets_compares_every_component() {
        let stats = Stats {
            vit: 3,
            mob: 5,
            ..Stats::ZERO
        };
        assert!(stats.meets(&Stats {
            vit: 3,
            ..Stats::ZERO
        }));
        assert!(!stats.meets(&Stats {
            mob: 6,
            ..Stats::ZERO
        }));
    }

    #[test]
    fn stat_names_parse_case_insensitively() {
        assert_eq!("mob".parse::<StatKind>().unwrap(), StatKind::Mob);
        assert_eq!(StatKind::Atr.to_string(), "ATR");
    }
}
