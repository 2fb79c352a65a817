//! Attack, defense, and initiative rolls.
//!
//! Rolls are pure functions of a stat, the effects in play, the roller's
//! conditions, and the RNG. Overrides apply in a fixed order: set-to-6,
//! then set-to-10 (which wins), then +2, then the condition modifier.

use crate::condition::Conditions;
use crate::env::RngOracle;
use crate::special::EffectKind;

const PRECISE_ROLL: i32 = 6;
const PERFECT_ROLL: i32 = 10;
const BOOST: i32 = 2;
const INITIATIVE_SCALE: u32 = 1000;

fn apply_overrides(
    base: u32,
    effects: &[EffectKind],
    precise: EffectKind,
    perfect: EffectKind,
    boosted: EffectKind,
    condition_modifier: i32,
) -> i32 {
    let mut roll = base as i32;
    if effects.contains(&precise) {
        roll = PRECISE_ROLL;
    }
    if effects.contains(&perfect) {
        roll = PERFECT_ROLL;
    }
    if effects.contains(&boosted) {
        roll += BOOST;
    }
    roll + condition_modifier
}

/// Rolls `1..=stat`, or 0 when the stat is 0 and no effect grants a roll.
pub fn attack_roll(
    stat: u8,
    effects: &[EffectKind],
    conditions: &Conditions,
    rng: &mut dyn RngOracle,
) -> u32 {
    let granted = effects.iter().any(|effect| effect.grants_attack_roll());
    if stat == 0 && !granted {
        return 0;
    }
    let base = rng.roll_die(u32::from(stat));
    let roll = apply_overrides(
        base,
        effects,
        EffectKind::PreciseAttack,
        EffectKind::PerfectAttack,
        EffectKind::BoostedAttack,
        conditions.attack_modifier(),
    );
    roll.max(0) as u32
}

/// Defense roll against an attack carrying `attacker_effects`.
///
/// Bypass Defense halves the final value, truncating.
pub fn defense_roll(
    stat: u8,
    defender_effects: &[EffectKind],
    attacker_effects: &[EffectKind],
    conditions: &Conditions,
    rng: &mut dyn RngOracle,
) -> u32 {
    let granted = defender_effects.iter().any(|effect| {
        matches!(
            effect,
            EffectKind::PreciseDefense | EffectKind::PerfectDefense | EffectKind::BoostedDefense
        )
    });
    if stat == 0 && !granted {
        return 0;
    }
    let base = rng.roll_die(u32::from(stat));
    let roll = apply_overrides(
        base,
        defender_effects,
        EffectKind::PreciseDefense,
        EffectKind::PerfectDefense,
        EffectKind::BoostedDefense,
        conditions.defense_modifier(),
    )
    .max(0) as u32;
    if attacker_effects.contains(&EffectKind::BypassDefense) {
        roll / 2
    } else {
        roll
    }
}

/// Mobility-weighted initiative; higher goes first, 0 for MOB 0.
pub fn initiative_roll(mobility: u8, rng: &mut dyn RngOracle) -> u32 {
    rng.roll_die(u32::from(mobility) * INITIATIVE_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionKind;
    use crate::env::ScriptedRng;
    use crate::state::FighterId;
    use EffectKind as E;

    fn none() -> Conditions {
        Conditions::new()
    }

    #[test]
    fn plain_attack_uses_the_die() {
        let mut rng = ScriptedRng::new([4]);
        assert_eq!(attack_roll(6, &[], &none(), &mut rng), 4);
    }

    #[test]
    fn perfect_attack_ignores_stat() {
        let mut rng = ScriptedRng::new([1]);
        assert_eq!(attack_roll(6, &[E::PerfectAttack], &none(), &mut rng), 10);
        assert_eq!(attack_roll(0, &[E::PerfectAttack], &none(), &mut rng), 10);
    }

    #[test]
    fn zero_stat_without_help_rolls_nothing() {
        let mut rng = ScriptedRng::new([5]);
        assert_eq!(attack_roll(0, &[E::Leech], &none(), &mut rng), 0);
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn boost_stacks_on_precise_then_condition() {
        let mut conditions = none();
        conditions.add(ConditionKind::DebuffedAtk, 4, FighterId(1));
        let mut rng = ScriptedRng::new([2]);
        let roll = attack_roll(4, &[E::PreciseAttack, E::BoostedAttack], &conditions, &mut rng);
        assert_eq!(roll, 7);
    }

    #[test]
    fn debuff_floors_at_zero() {
        let mut conditions = none();
        conditions.add(ConditionKind::DebuffedDef, 4, FighterId(1));
        let mut rng = ScriptedRng::new([1]);
        assert_eq!(attack_roll(1, &[], &none(), &mut rng.clone()), 1);
        assert_eq!(defense_roll(1, &[], &[], &conditions, &mut rng), 0);
    }

    #[test]
    fn bypass_halves_after_modifiers() {
        let mut conditions = none();
        conditions.add(ConditionKind::BuffedDef, 4, FighterId(1));
        let mut rng = ScriptedRng::new([4]);
        // (4 + 2 + 1) / 2
        let roll = defense_roll(6, &[E::BoostedDefense], &[E::BypassDefense], &conditions, &mut rng);
        assert_eq!(roll, 3);
    }

    #[test]
    fn initiative_scales_mobility() {
        let mut rng = ScriptedRng::new([4500]);
        assert_eq!(initiative_roll(5, &mut rng), 4500);
        assert_eq!(initiative_roll(0, &mut rng), 0);
    }
}
