//! Whether an attack of a given type can be made against a target.

use crate::config::ArenaConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::range::RangeMap;
use crate::special::EffectKind;
use crate::state::{AttackType, FighterId, Roster};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttackError {
    #[error("You can't make melee attacks!")]
    NoMelee,

    #[error("You can only use melee attacks on engaged (range 0) targets!")]
    MeleeNeedsEngaged,

    #[error("Your target is more than 2 spaces away - can't lunge!")]
    LungeTooFar,

    #[error("You can't make ranged attacks!")]
    NoRanged,

    #[error("You can't use ranged attacks on engaged (range 0) targets!")]
    RangedTargetEngaged,

    #[error("You can't use ranged attacks when there are enemies engaged (range 0) with you!")]
    RangedWhileEngaged,
}

impl GameError for AttackError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoMelee => "ATTACK_NO_MELEE",
            Self::MeleeNeedsEngaged => "ATTACK_MELEE_NEEDS_ENGAGED",
            Self::LungeTooFar => "ATTACK_LUNGE_TOO_FAR",
            Self::NoRanged => "ATTACK_NO_RANGED",
            Self::RangedTargetEngaged => "ATTACK_RANGED_TARGET_ENGAGED",
            Self::RangedWhileEngaged => "ATTACK_RANGED_WHILE_ENGAGED",
        }
    }
}

/// Checks range and stat requirements for `attacker` attacking `target`.
///
/// `effects` are the effects the attack would carry; they can grant a roll
/// to a zero stat or lift a range restriction.
pub fn attack_type_check(
    roster: &Roster,
    ranges: &RangeMap,
    attacker: FighterId,
    target: FighterId,
    kind: AttackType,
    effects: &[EffectKind],
) -> Result<(), AttackError> {
    let Some(combatant) = roster.get(attacker) else {
        return Ok(());
    };
    let stats = combatant.fighter.stats();
    let granted = effects.iter().any(|effect| effect.grants_attack_roll());
    let range = ranges.get(attacker, target);

    match kind {
        AttackType::Melee => {
            if stats.atm == 0 && !granted {
                return Err(AttackError::NoMelee);
            }
            let lunge = effects.contains(&EffectKind::LungeAttack);
            let projected = effects.contains(&EffectKind::ProjectedStrike);
            if range > 0 && !lunge && !projected {
                return Err(AttackError::MeleeNeedsEngaged);
            }
            if lunge && range > ArenaConfig::LUNGE_MAX_RANGE {
                return Err(AttackError::LungeTooFar);
            }
        }
        AttackType::Ranged => {
            if stats.atr == 0 && !granted {
                return Err(AttackError::NoRanged);
            }
            if effects.contains(&EffectKind::PointBlank) {
                return Ok(());
            }
            if range == 0 {
                return Err(AttackError::RangedTargetEngaged);
            }
            let locked = roster.iter().any(|other| {
                other.id() != attacker
                    && !other.fighter.is_defeated()
                    && ranges.get(attacker, other.id()) == 0
                    && !other.fighter.is_ally(attacker)
            });
            if locked {
                return Err(AttackError::RangedWhileEngaged);
            }
        }
    }
    Ok(())
}
