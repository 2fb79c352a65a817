//! Design-time validation of special moves.

use crate::error::{ErrorSeverity, GameError};
use crate::stats::Stats;

use super::catalog::{EffectKind, EffectList, MoveCategory, Placement};
use super::loadout::SpecialMove;

/// Reasons a move definition or one of its effects is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    #[error("A special move needs one or two effects!")]
    WrongEffectCount { count: usize },

    #[error("The [{effect}] effect can't be used on a {category} move!")]
    WrongCategory {
        effect: EffectKind,
        category: MoveCategory,
    },

    #[error("The [{effect}] effect can't be a move's first effect!")]
    NotFirst { effect: EffectKind },

    #[error("The [{effect}] effect can only be a move's first effect!")]
    NotSecond { effect: EffectKind },

    #[error("A move can't have the [{effect}] effect twice!")]
    Duplicate { effect: EffectKind },

    #[error("The [{first}] and [{second}] effects can't be combined!")]
    Incompatible {
        first: EffectKind,
        second: EffectKind,
    },

    #[error("[SP Recover] must be paired with a drawback, not [{second}]!")]
    RecoverNeedsDrawback { second: EffectKind },

    #[error(
        "You don't meet the stat requirements for the [{effect}] effect - you may have changed your stats after defining the special move."
    )]
    StatRequirement { effect: EffectKind },

    #[error("You don't have enough total SP to ever use [{name}].")]
    NotEnoughTotalSp { name: String, cost: u32, sp_max: u32 },
}

impl GameError for ComposeError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::WrongEffectCount { .. } => "COMPOSE_WRONG_EFFECT_COUNT",
            Self::WrongCategory { .. } => "COMPOSE_WRONG_CATEGORY",
            Self::NotFirst { .. } => "COMPOSE_NOT_FIRST",
            Self::NotSecond { .. } => "COMPOSE_NOT_SECOND",
            Self::Duplicate { .. } => "COMPOSE_DUPLICATE",
            Self::Incompatible { .. } => "COMPOSE_INCOMPATIBLE",
            Self::RecoverNeedsDrawback { .. } => "COMPOSE_RECOVER_NEEDS_DRAWBACK",
            Self::StatRequirement { .. } => "COMPOSE_STAT_REQUIREMENT",
            Self::NotEnoughTotalSp { .. } => "COMPOSE_NOT_ENOUGH_TOTAL_SP",
        }
    }
}

/// Sum of signed effect costs, floored at 0.
pub fn total_cost(effects: &[EffectKind]) -> u32 {
    let sum: i32 = effects.iter().map(|effect| effect.cost()).sum();
    sum.max(0) as u32
}

fn check_first(category: MoveCategory, effect: EffectKind, stats: &Stats) -> Result<(), ComposeError> {
    let def = effect.definition();
    if !effect.applies_to(category) {
        return Err(ComposeError::WrongCategory { effect, category });
    }
    if def.cost < 0 || def.placement == Placement::SecondOnly {
        return Err(ComposeError::NotFirst { effect });
    }
    if !stats.meets(&def.requires) {
        return Err(ComposeError::StatRequirement { effect });
    }
    Ok(())
}

fn check_second(
    category: MoveCategory,
    first: EffectKind,
    second: EffectKind,
    stats: &Stats,
) -> Result<(), ComposeError> {
    let def = second.definition();
    if !second.applies_to(category) {
        return Err(ComposeError::WrongCategory {
            effect: second,
            category,
        });
    }
    if second == first {
        return Err(ComposeError::Duplicate { effect: second });
    }
    if first.conflicts_with(second) {
        return Err(ComposeError::Incompatible { first, second });
    }
    if def.placement == Placement::FirstOnly {
        return Err(ComposeError::NotSecond { effect: second });
    }
    if first == EffectKind::SpRecover && !second.is_drawback() {
        return Err(ComposeError::RecoverNeedsDrawback { second });
    }
    if !stats.meets(&def.requires) {
        return Err(ComposeError::StatRequirement { effect: second });
    }
    Ok(())
}

/// Validates a one- or two-effect combination for `category`.
pub fn validate_effects(
    category: MoveCategory,
    effects: &[EffectKind],
    stats: &Stats,
) -> Result<EffectList, ComposeError> {
    match *effects {
        [first] => check_first(category, first, stats)?,
        [first, second] => {
            check_first(category, first, stats)?;
            check_second(category, first, second, stats)?;
        }
        _ => {
            return Err(ComposeError::WrongEffectCount {
                count: effects.len(),
            });
        }
    }
    Ok(effects.iter().copied().collect())
}

/// Effects offered for the first slot of a new move.
pub fn first_effect_options(category: MoveCategory, stats: &Stats) -> Vec<EffectKind> {
    EffectKind::all()
        .filter(|effect| check_first(category, *effect, stats).is_ok())
        .collect()
}

/// Effects offered for the second slot once `first` is chosen.
pub fn second_effect_options(
    category: MoveCategory,
    first: EffectKind,
    stats: &Stats,
) -> Vec<EffectKind> {
    EffectKind::all()
        .filter(|effect| check_second(category, first, *effect, stats).is_ok())
        .collect()
}

/// Re-checks a defined move against the fighter's current stats and SP pool.
///
/// Stats can change after a move was defined, so this runs again whenever
/// the fighter is admitted into play.
pub fn verify(stats: &Stats, sp_max: u32, special: &SpecialMove) -> Result<(), ComposeError> {
    let cost = special.cost();
    if cost > sp_max {
        return Err(ComposeError::NotEnoughTotalSp {
            name: special.name.clone(),
            cost,
            sp_max,
        });
    }
    if let Some(effect) = special
        .effects
        .iter()
        .copied()
        .find(|effect| !stats.meets(&effect.definition().requires))
    {
        return Err(ComposeError::StatRequirement { effect });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use EffectKind as E;

    fn stats() -> Stats {
        Stats::new(6, 6, 6, 6, 6, 6).unwrap()
    }

    #[test]
    fn cost_floors_at_zero() {
        assert_eq!(total_cost(&[E::DoubleDamage, E::Leech]), 4);
        assert_eq!(total_cost(&[E::Heal, E::OpeningGambit]), 0);
        assert_eq!(total_cost(&[E::Knockback, E::HalfDamage]), 0);
    }

    #[test]
    fn drawback_cannot_lead() {
        let err = validate_effects(MoveCategory::MeleeAttack, &[E::Recoil], &stats()).unwrap_err();
        assert_eq!(err, ComposeError::NotFirst { effect: E::Recoil });
    }

    #[test]
    fn bonus_action_only_in_second_slot() {
        let err =
            validate_effects(MoveCategory::SupportSelf, &[E::BonusAction], &stats()).unwrap_err();
        assert!(matches!(err, ComposeError::NotFirst { .. }));

        let ok = validate_effects(MoveCategory::SupportSelf, &[E::Heal, E::BonusAction], &stats());
        assert!(ok.is_ok());
    }

    #[test]
    fn sp_recover_requires_drawback_partner() {
        let err = validate_effects(MoveCategory::SupportSelf, &[E::SpRecover, E::SuperDash], &stats())
            .unwrap_err();
        assert!(matches!(err, ComposeError::RecoverNeedsDrawback { .. }));

        let ok = validate_effects(
            MoveCategory::SupportSelf,
            &[E::SpRecover, E::TakeDisabledAction],
            &stats(),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn incompatible_pair_rejected() {
        let err = validate_effects(MoveCategory::Defense, &[E::Reflect, E::Counterattack], &stats())
            .unwrap_err();
        assert_eq!(
            err,
            ComposeError::Incompatible {
                first: E::Reflect,
                second: E::Counterattack
            }
        );
    }

    #[test]
    fn stat_prerequisites_apply() {
        let slow = Stats::new(6, 6, 6, 6, 5, 6).unwrap();
        let err = validate_effects(
            MoveCategory::MeleeAttack,
            &[E::BoostedAttack, E::TakeImmobilization],
            &slow,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ComposeError::StatRequirement {
                effect: E::TakeImmobilization
            }
        );
    }

    #[test]
    fn menus_respect_category_and_first_choice() {
        let firsts = first_effect_options(MoveCategory::Defense, &stats());
        assert!(firsts.contains(&E::Reflect));
        assert!(!firsts.contains(&E::RiskyDefense));
        assert!(!firsts.contains(&E::Heal));

        let seconds = second_effect_options(MoveCategory::Defense, E::Reflect, &stats());
        assert!(seconds.contains(&E::RiskyDefense));
        assert!(!seconds.contains(&E::Counterattack));
        assert!(!seconds.contains(&E::Reflect));
    }

    #[test]
    fn verify_checks_total_sp() {
        let special = SpecialMove::define(
            "Crusher",
            MoveCategory::MeleeAttack,
            &[E::DoubleDamage, E::Leech],
            "",
            &stats(),
        )
        .unwrap();
        let err = verify(&stats(), 3, &special).unwrap_err();
        assert_eq!(err.to_string(), "You don't have enough total SP to ever use [Crusher].");
        assert!(verify(&stats(), 4, &special).is_ok());
    }
}
