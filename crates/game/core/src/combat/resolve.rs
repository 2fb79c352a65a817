use crate::notice::{NoticeKind, TimerRequest};
use crate::special::{EffectKind, EffectList};
use crate::state::{AttackType, FighterId, IncomingAttack, SecondAttack};

use super::{Battle, attack_roll, defense_roll, fill_template};

const DEFAULT_ATTACK_TEMPLATE: &str = "<self> attacks <target>!";
const COUNTERATTACK_TEMPLATE: &str = "<self> counterattacks <target>!";

/// How the target answers an incoming attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefenseAction {
    Defend,
    /// Take the hit with a defense of 0.
    Endure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefenseOutcome {
    Defended { defense: u32 },
    Hit { defense: u32, damage: u32 },
}

fn contains(effects: &[EffectKind], effect: EffectKind) -> bool {
    effects.contains(&effect)
}

fn halve(value: u32) -> u32 {
    (value / 2).max(1)
}

impl Battle<'_> {
    /// Rolls an attack and parks it on the target until they respond.
    ///
    /// Returns the attack roll.
    pub fn queue_attack(
        &mut self,
        attacker: FighterId,
        target: FighterId,
        template: Option<&str>,
        effects: &[EffectKind],
        kind: AttackType,
    ) -> u32 {
        let attacker_name = self.name(attacker);
        let target_name = self.name(target);
        let text = fill_template(
            template.unwrap_or(DEFAULT_ATTACK_TEMPLATE),
            &attacker_name,
            Some(&target_name),
        );

        let roll = match self.roster.get(attacker) {
            Some(c) => {
                let stats = c.fighter.stats();
                let stat = match kind {
                    AttackType::Melee => stats.atm,
                    AttackType::Ranged => stats.atr,
                };
                attack_roll(stat, effects, &c.combat.conditions, &mut *self.rng)
            }
            None => 0,
        };
        let effects: EffectList = effects.iter().copied().collect();

        self.outbox.broadcast(NoticeKind::AttackQueued {
            attacker,
            target,
            text,
            roll,
            kind,
            effects: effects.clone(),
        });
        self.park_attack(
            target,
            IncomingAttack {
                roll,
                attacker,
                effects: effects.clone(),
                kind,
            },
        );

        if effects.contains(&EffectKind::DoubleAttack) {
            let carried = effects
                .iter()
                .copied()
                .filter(|effect| *effect != EffectKind::DoubleAttack)
                .collect();
            if let Some(c) = self.roster.get_mut(attacker) {
                c.combat.second = Some(SecondAttack {
                    kind,
                    effects: carried,
                });
            }
            self.outbox.whisper(attacker, NoticeKind::SecondAttackReady);
        }
        tracing::debug!(%attacker, %target, roll, ?kind, "attack queued");
        roll
    }

    /// Stores an attack on `target` and (re)starts their defense countdown.
    fn park_attack(&mut self, target: FighterId, attack: IncomingAttack) {
        let steps = self.config.defense_countdown_steps;
        let attacker = attack.attacker;
        if let Some(c) = self.roster.get_mut(target) {
            c.combat.incoming = Some(attack);
            c.combat.defense_countdown = Some(steps);
        }
        self.outbox.whisper(target, NoticeKind::IncomingAttack { attacker });
        self.outbox.timer(TimerRequest::StartDefenseCountdown(target));
    }

    /// Answers the attack waiting on `defender`.
    ///
    /// Returns `None`, changing nothing, when there is no attack to answer.
    pub fn resolve_defense(
        &mut self,
        defender: FighterId,
        action: DefenseAction,
        defender_effects: &[EffectKind],
    ) -> Option<DefenseOutcome> {
        let combatant = self.roster.get_mut(defender)?;
        let incoming = combatant.combat.incoming.take()?;
        combatant.combat.defense_countdown = None;
        self.outbox
            .timer(TimerRequest::CancelDefenseCountdown(defender));

        let attacker = incoming.attacker;
        let attack = incoming.roll;
        let shown_roll = match action {
            DefenseAction::Endure => None,
            DefenseAction::Defend => {
                let c = self.roster.get(defender)?;
                Some(defense_roll(
                    c.fighter.stats().def,
                    defender_effects,
                    &incoming.effects,
                    &c.combat.conditions,
                    &mut *self.rng,
                ))
            }
        };
        let defense = shown_roll.unwrap_or(0);

        if defense >= attack {
            self.outbox.broadcast(NoticeKind::Defended {
                defender,
                attacker,
                roll: shown_roll,
            });
            if contains(defender_effects, EffectKind::Absorb) && defense > attack {
                self.heal(defender, attack.min(defense - attack));
            }
            if contains(defender_effects, EffectKind::Reflect) {
                self.outbox.broadcast(NoticeKind::Reflected {
                    defender,
                    attacker,
                    roll: attack,
                    effects: incoming.effects.clone(),
                });
                self.park_attack(
                    attacker,
                    IncomingAttack {
                        roll: attack,
                        attacker: defender,
                        effects: incoming.effects.clone(),
                        kind: incoming.kind,
                    },
                );
            }
            if contains(defender_effects, EffectKind::Counterattack) {
                let kind = AttackType::for_range(self.ranges.get(defender, attacker));
                self.queue_attack(defender, attacker, Some(COUNTERATTACK_TEMPLATE), &[], kind);
            }
            tracing::debug!(%defender, %attacker, attack, defense, "attack defended");
            return Some(DefenseOutcome::Defended { defense });
        }

        let effects: EffectList = if contains(defender_effects, EffectKind::NegateEffects) {
            EffectList::new()
        } else {
            incoming.effects
        };
        let mut damage = attack - defense;
        if effects.contains(&EffectKind::DoubleDamage) {
            damage *= 2;
        }
        if contains(defender_effects, EffectKind::RiskyDefense) {
            damage *= 2;
        }
        if effects.contains(&EffectKind::HalfDamage) {
            damage = halve(damage);
        }
        if contains(defender_effects, EffectKind::HalveDamage) {
            damage = halve(damage);
        }
        if effects.contains(&EffectKind::NoDamage)
            || contains(defender_effects, EffectKind::NegateDamage)
        {
            damage = 0;
        }

        self.outbox.broadcast(NoticeKind::DamageTaken {
            defender,
            attacker,
            damage,
            roll: shown_roll,
        });
        self.damage(defender, damage);
        if effects.contains(&EffectKind::Recoil) {
            self.lose_hp(attacker, halve(damage));
        }
        if effects.contains(&EffectKind::Leech) {
            self.heal(attacker, damage);
        }
        self.apply_hinder(defender, attacker, &effects);

        tracing::debug!(%defender, %attacker, attack, defense, damage, "attack hit");
        Some(DefenseOutcome::Hit { defense, damage })
    }

    /// Removes HP, announcing a defeat only on the hit that reaches 0.
    pub fn damage(&mut self, fighter: FighterId, amount: u32) {
        let Some(c) = self.roster.get_mut(fighter) else {
            return;
        };
        let report = c.fighter.take_damage(amount);
        if report.defeated {
            self.outbox.broadcast(NoticeKind::Defeated { fighter });
        }
    }

    /// HP lost to an effect rather than an attack (recoil).
    pub fn lose_hp(&mut self, fighter: FighterId, amount: u32) {
        self.outbox
            .broadcast(NoticeKind::HpLost { fighter, amount });
        self.damage(fighter, amount);
    }

    pub fn heal(&mut self, fighter: FighterId, amount: u32) {
        let Some(c) = self.roster.get_mut(fighter) else {
            return;
        };
        let amount = c.fighter.heal(amount);
        self.outbox.broadcast(NoticeKind::Healed { fighter, amount });
    }

    pub fn restore_sp(&mut self, fighter: FighterId, amount: u32) {
        let Some(c) = self.roster.get_mut(fighter) else {
            return;
        };
        let amount = c.fighter.restore_sp(amount);
        self.outbox
            .broadcast(NoticeKind::SpRestored { fighter, amount });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::env::ScriptedRng;
    use crate::notice::Outbox;
    use crate::range::RangeMap;
    use crate::state::{Combatant, Fighter, Roster};
    use crate::stats::Stats;
    use EffectKind as E;

    const A: FighterId = FighterId(1);
    const B: FighterId = FighterId(2);

    struct Fixture {
        roster: Roster,
        ranges: RangeMap,
        rng: ScriptedRng,
        outbox: Outbox,
        config: ArenaConfig,
    }

    impl Fixture {
        fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
            let stats = Stats::new(6, 6, 5, 6, 4, 4).unwrap();
            let mut roster = Roster::new();
            roster.push(Combatant::new(Fighter::new(A, "Ann", stats)));
            roster.push(Combatant::new(Fighter::new(B, "Bo", stats)));
            let mut ranges = RangeMap::with_members(5, &[A, B], 1);
            ranges.decrease(A, B);
            Self {
                roster,
                ranges,
                rng: ScriptedRng::new(rolls),
                outbox: Outbox::new(),
                config: ArenaConfig::new(),
            }
        }

        fn battle(&mut self) -> Battle<'_> {
            Battle::new(
                &mut self.roster,
                &mut self.ranges,
                &mut self.rng,
                &mut self.outbox,
                &self.config,
            )
        }

        fn hp(&self, id: FighterId) -> u32 {
            self.roster.get(id).unwrap().fighter.hp()
        }

        fn count(&self, pred: impl Fn(&NoticeKind) -> bool) -> usize {
            self.outbox.notices().iter().filter(|n| pred(&n.kind)).count()
        }
    }

    #[test]
    fn queued_attack_waits_on_target() {
        let mut fx = Fixture::new([5]);
        let roll = fx.battle().queue_attack(A, B, None, &[], AttackType::Melee);

        assert_eq!(roll, 5);
        let incoming = fx.roster.get(B).unwrap().combat.incoming.clone().unwrap();
        assert_eq!(incoming.attacker, A);
        assert_eq!(fx.roster.get(B).unwrap().combat.defense_countdown, Some(30));
        assert!(fx.outbox.timers().contains(&TimerRequest::StartDefenseCountdown(B)));
        let text = fx.outbox.notices().iter().find_map(|n| match &n.kind {
            NoticeKind::AttackQueued { text, .. } => Some(text.clone()),
            _ => None,
        });
        assert_eq!(text.as_deref(), Some("Ann attacks Bo!"));
    }

    #[test]
    fn higher_attack_deals_the_difference() {
        let mut fx = Fixture::new([6, 2]);
        fx.battle().queue_attack(A, B, None, &[], AttackType::Melee);
        let outcome = fx.battle().resolve_defense(B, DefenseAction::Defend, &[]);

        assert_eq!(outcome, Some(DefenseOutcome::Hit { defense: 2, damage: 4 }));
        assert_eq!(fx.hp(B), 11);
        assert!(fx.roster.get(B).unwrap().combat.incoming.is_none());
        assert!(fx.outbox.timers().contains(&TimerRequest::CancelDefenseCountdown(B)));
    }

    #[test]
    fn tie_goes_to_the_defender() {
        let mut fx = Fixture::new([3, 3]);
        fx.battle().queue_attack(A, B, None, &[], AttackType::Melee);
        let outcome = fx.battle().resolve_defense(B, DefenseAction::Defend, &[]);
        assert_eq!(outcome, Some(DefenseOutcome::Defended { defense: 3 }));
        assert_eq!(fx.hp(B), 15);
    }

    #[test]
    fn endure_takes_everything() {
        let mut fx = Fixture::new([4]);
        fx.battle().queue_attack(A, B, None, &[], AttackType::Melee);
        let outcome = fx.battle().resolve_defense(B, DefenseAction::Endure, &[]);
        assert_eq!(outcome, Some(DefenseOutcome::Hit { defense: 0, damage: 4 }));
        assert_eq!(fx.rng.remaining(), 0);
    }

    #[test]
    fn nothing_to_defend_changes_nothing() {
        let mut fx = Fixture::new([]);
        assert_eq!(fx.battle().resolve_defense(B, DefenseAction::Defend, &[]), None);
        assert!(fx.outbox.is_empty());
    }

    #[test]
    fn damage_modifiers_apply_in_order() {
        // 6 - 1 = 5, doubled to 10, halved by the defense to 5.
        let mut fx = Fixture::new([6, 1]);
        fx.battle().queue_attack(A, B, None, &[E::DoubleDamage], AttackType::Melee);
        let outcome = fx.battle().resolve_defense(B, DefenseAction::Defend, &[E::HalveDamage]);
        assert_eq!(outcome, Some(DefenseOutcome::Hit { defense: 1, damage: 5 }));
    }

    #[test]
    fn halving_never_drops_below_one() {
        let mut fx = Fixture::new([2, 1]);
        fx.battle().queue_attack(A, B, None, &[E::HalfDamage], AttackType::Melee);
        let outcome = fx.battle().resolve_defense(B, DefenseAction::Defend, &[]);
        assert_eq!(outcome, Some(DefenseOutcome::Hit { defense: 1, damage: 1 }));
    }

    #[test]
    fn negate_effects_strips_the_attack() {
        let mut fx = Fixture::new([6, 1]);
        fx.battle()
            .queue_attack(A, B, None, &[E::DoubleDamage, E::InflictDebuffedAtk], AttackType::Melee);
        let outcome = fx.battle().resolve_defense(B, DefenseAction::Defend, &[E::NegateEffects]);
        assert_eq!(outcome, Some(DefenseOutcome::Hit { defense: 1, damage: 5 }));
        assert!(fx.roster.get(B).unwrap().combat.conditions.is_empty());
    }

    #[test]
    fn recoil_and_leech_feed_back_to_attacker() {
        let mut fx = Fixture::new([6, 1]);
        fx.roster.get_mut(A).unwrap().fighter.take_damage(6);
        fx.battle().queue_attack(A, B, None, &[E::Leech, E::Recoil], AttackType::Melee);
        fx.battle().resolve_defense(B, DefenseAction::Defend, &[]);

        // 15 - 6, recoil 2, leech 5.
        assert_eq!(fx.hp(A), 12);
        assert_eq!(fx.hp(B), 10);
    }

    #[test]
    fn absorb_heals_by_the_margin() {
        let mut fx = Fixture::new([2, 6]);
        fx.roster.get_mut(B).unwrap().fighter.take_damage(10);
        fx.battle().queue_attack(A, B, None, &[], AttackType::Melee);
        fx.battle().resolve_defense(B, DefenseAction::Defend, &[E::Absorb]);
        // min(2, 6 - 2)
        assert_eq!(fx.hp(B), 7);
    }

    #[test]
    fn reflect_sends_the_same_roll_back() {
        let mut fx = Fixture::new([4, 6]);
        fx.battle()
            .queue_attack(A, B, None, &[E::InflictImmobilization], AttackType::Melee);
        fx.battle().resolve_defense(B, DefenseAction::Defend, &[E::Reflect]);

        let reflected = fx.roster.get(A).unwrap().combat.incoming.clone().unwrap();
        assert_eq!(reflected.roll, 4);
        assert_eq!(reflected.attacker, B);
        assert_eq!(reflected.effects.as_slice(), &[E::InflictImmobilization]);
        assert!(fx.outbox.timers().contains(&TimerRequest::StartDefenseCountdown(A)));
    }

    #[test]
    fn counterattack_queues_a_plain_attack() {
        let mut fx = Fixture::new([2, 6, 3]);
        fx.battle().queue_attack(A, B, None, &[], AttackType::Melee);
        fx.battle().resolve_defense(B, DefenseAction::Defend, &[E::Counterattack]);

        let counter = fx.roster.get(A).unwrap().combat.incoming.clone().unwrap();
        assert_eq!(counter.roll, 3);
        assert_eq!(counter.kind, AttackType::Melee);
        assert!(counter.effects.is_empty());
    }

    #[test]
    fn double_attack_arms_a_second() {
        let mut fx = Fixture::new([3]);
        fx.battle()
            .queue_attack(A, B, None, &[E::DoubleAttack, E::Knockback], AttackType::Melee);
        let second = fx.roster.get(A).unwrap().combat.second.clone().unwrap();
        assert_eq!(second.kind, AttackType::Melee);
        assert_eq!(second.effects.as_slice(), &[E::Knockback]);
    }

    #[test]
    fn defeat_is_announced_once() {
        let mut fx = Fixture::new([]);
        fx.battle().damage(B, 20);
        fx.battle().damage(B, 5);
        assert_eq!(fx.hp(B), 0);
        assert_eq!(fx.count(|k| matches!(k, NoticeKind::Defeated { .. })), 1);
    }
}
