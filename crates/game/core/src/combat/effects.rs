//! Support, hinder, and drawback effects.

use crate::condition::ConditionKind;
use crate::config::ArenaConfig;
use crate::notice::NoticeKind;
use crate::range::{Direction, MoveMode};
use crate::special::EffectKind;
use crate::state::FighterId;

use super::Battle;

/// Durations are stored inclusive: the owner's current turn also ends once.
const BUFF_DURATION: u32 = ArenaConfig::BUFF_TURNS + 1;
const HINDER_DURATION: u32 = ArenaConfig::HINDER_TURNS + 1;

impl Battle<'_> {
    /// Puts `kind` on `fighter`, replacing any existing one of that kind.
    pub fn add_condition(
        &mut self,
        fighter: FighterId,
        tick_owner: FighterId,
        kind: ConditionKind,
        duration: u32,
    ) {
        if let Some(c) = self.roster.get_mut(fighter) {
            c.combat.conditions.add(kind, duration, tick_owner);
            self.outbox
                .broadcast(NoticeKind::ConditionApplied { fighter, kind });
        }
    }

    /// Effects that help `target`, used by `user`.
    pub fn apply_support(&mut self, target: FighterId, user: FighterId, effects: &[EffectKind]) {
        for effect in effects {
            match effect {
                EffectKind::Heal => {
                    let vit = self
                        .roster
                        .get(target)
                        .map_or(0, |c| u32::from(c.fighter.stats().vit));
                    self.heal(target, vit);
                }
                EffectKind::SpRecover => self.restore_sp(target, ArenaConfig::SP_RECOVER_AMOUNT),
                EffectKind::SuperDash => self.super_dash(target),
                EffectKind::GrantBuffedAtk => {
                    self.add_condition(target, user, ConditionKind::BuffedAtk, BUFF_DURATION)
                }
                EffectKind::GrantBuffedDef => {
                    self.add_condition(target, user, ConditionKind::BuffedDef, BUFF_DURATION)
                }
                EffectKind::GrantBuffedMob => {
                    self.add_condition(target, user, ConditionKind::BuffedMob, BUFF_DURATION)
                }
                _ => {}
            }
        }
    }

    fn super_dash(&mut self, target: FighterId) {
        let Some(c) = self.roster.get_mut(target) else {
            return;
        };
        if c.combat.conditions.has(ConditionKind::Immobilization) {
            self.outbox.whisper(target, NoticeKind::Immobilized);
            return;
        }
        let bonus = c.fighter.stats().dash_moves() + ArenaConfig::SUPER_DASH_BONUS;
        c.combat.moves += bonus;
        self.outbox.broadcast(NoticeKind::Surged {
            fighter: target,
            bonus,
        });
    }

    /// Effects that hurt `target`, from `user`'s attack or hinder move.
    pub fn apply_hinder(&mut self, target: FighterId, user: FighterId, effects: &[EffectKind]) {
        for effect in effects {
            match effect {
                EffectKind::InflictDebuffedAtk => {
                    self.add_condition(target, user, ConditionKind::DebuffedAtk, BUFF_DURATION)
                }
                EffectKind::InflictDebuffedDef => {
                    self.add_condition(target, user, ConditionKind::DebuffedDef, BUFF_DURATION)
                }
                EffectKind::InflictDebuffedMob => {
                    self.add_condition(target, user, ConditionKind::DebuffedMob, BUFF_DURATION)
                }
                EffectKind::InflictImmobilization => self.add_condition(
                    target,
                    user,
                    ConditionKind::Immobilization,
                    HINDER_DURATION,
                ),
                EffectKind::InflictDisabledAction => self.add_condition(
                    target,
                    user,
                    ConditionKind::DisabledAction,
                    HINDER_DURATION,
                ),
                EffectKind::Knockback => self.push(target, user, Direction::Withdraw, ArenaConfig::SHORT_PUSH_STEPS),
                EffectKind::KnockbackPlus => self.push(target, user, Direction::Withdraw, ArenaConfig::LONG_PUSH_STEPS),
                EffectKind::PullIn => self.push(target, user, Direction::Approach, ArenaConfig::SHORT_PUSH_STEPS),
                EffectKind::PullInPlus => self.push(target, user, Direction::Approach, ArenaConfig::LONG_PUSH_STEPS),
                _ => {}
            }
        }
    }

    fn push(&mut self, target: FighterId, user: FighterId, direction: Direction, steps: u32) {
        self.move_fighter(direction, target, user, steps, MoveMode::Forced);
    }

    /// Drawbacks land on `bearer`, counting down on `tick_owner`'s turns.
    pub fn apply_drawbacks(
        &mut self,
        bearer: FighterId,
        tick_owner: FighterId,
        effects: &[EffectKind],
    ) {
        for effect in effects {
            let kind = match effect {
                EffectKind::TakeImmobilization => ConditionKind::Immobilization,
                EffectKind::TakeDisabledAction => ConditionKind::DisabledAction,
                _ => continue,
            };
            self.add_condition(bearer, tick_owner, kind, HINDER_DURATION);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedRng;
    use crate::notice::Outbox;
    use crate::range::RangeMap;
    use crate::state::{Combatant, Fighter, Roster};
    use crate::stats::Stats;
    use EffectKind as E;

    const A: FighterId = FighterId(1);
    const B: FighterId = FighterId(2);

    fn run(effects: &[EffectKind], apply: impl FnOnce(&mut Battle<'_>, &[EffectKind])) -> (Roster, RangeMap) {
        let stats = Stats::new(4, 4, 4, 4, 7, 4).unwrap();
        let mut roster = Roster::new();
        roster.push(Combatant::new(Fighter::new(A, "Ann", stats)));
        roster.push(Combatant::new(Fighter::new(B, "Bo", stats)));
        let mut ranges = RangeMap::with_members(5, &[A, B], 2);
        let mut rng = ScriptedRng::default();
        let mut outbox = Outbox::new();
        let config = ArenaConfig::new();
        let mut battle = Battle::new(&mut roster, &mut ranges, &mut rng, &mut outbox, &config);
        apply(&mut battle, effects);
        (roster, ranges)
    }

    #[test]
    fn grants_run_on_the_users_clock() {
        let (roster, _) = run(&[E::GrantBuffedAtk], |b, e| b.apply_support(B, A, e));
        let condition = *roster.get(B).unwrap().combat.conditions.get(ConditionKind::BuffedAtk).unwrap();
        assert_eq!(condition.remaining, 4);
        assert_eq!(condition.tick_owner, A);
    }

    #[test]
    fn super_dash_adds_half_mobility_plus_two() {
        let (roster, _) = run(&[E::SuperDash], |b, e| b.apply_support(A, A, e));
        // ceil(7 / 2) + 2
        assert_eq!(roster.get(A).unwrap().combat.moves, 6);
    }

    #[test]
    fn super_dash_does_nothing_while_immobilized() {
        let (roster, _) = run(&[E::SuperDash], |b, e| {
            b.add_condition(A, B, ConditionKind::Immobilization, 2);
            b.apply_support(A, A, e);
        });
        assert_eq!(roster.get(A).unwrap().combat.moves, 0);
    }

    #[test]
    fn heal_restores_vitality() {
        let (roster, _) = run(&[E::Heal], |b, e| {
            b.damage(B, 6);
            b.apply_support(B, A, e);
        });
        assert_eq!(roster.get(B).unwrap().fighter.hp(), 10);
    }

    #[test]
    fn knockback_pushes_away_from_the_user() {
        let (_, ranges) = run(&[E::Knockback], |b, e| b.apply_hinder(B, A, e));
        assert_eq!(ranges.get(A, B), 4);
    }

    #[test]
    fn pull_in_plus_stops_at_engaged() {
        let (_, ranges) = run(&[E::PullInPlus], |b, e| b.apply_hinder(B, A, e));
        assert_eq!(ranges.get(A, B), 0);
    }

    #[test]
    fn disabling_lasts_one_turn() {
        let (roster, _) = run(&[E::InflictDisabledAction], |b, e| b.apply_hinder(B, A, e));
        let condition = *roster.get(B).unwrap().combat.conditions.get(ConditionKind::DisabledAction).unwrap();
        assert_eq!(condition.remaining, 2);
    }

    #[test]
    fn drawbacks_land_on_the_bearer() {
        let (roster, _) = run(&[E::TakeImmobilization, E::Heal], |b, e| b.apply_drawbacks(A, B, e));
        let conditions = &roster.get(A).unwrap().combat.conditions;
        assert_eq!(conditions.get(ConditionKind::Immobilization).unwrap().tick_owner, B);
        assert!(!conditions.has(ConditionKind::DisabledAction));
    }
}
