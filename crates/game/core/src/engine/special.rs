//! The `special` command: using a defined special move in combat.

use crate::combat::{DefenseAction, attack_type_check};
use crate::config::ArenaConfig;
use crate::env::FighterDirectory;
use crate::notice::NoticeKind;
use crate::range::{Direction, MoveMode};
use crate::special::{EffectKind, MoveCategory, SpecialMove};
use crate::state::{AttackType, FighterId, LastAction};

use super::{CheckError, Checks, CommandError, Encounter};

const SPECIAL_ATTACK_TEMPLATE: &str = "<self> uses a special attack on <target>!";
const SPECIAL_SELF_TEMPLATE: &str = "<self> uses a special move!";
const SPECIAL_OTHER_TEMPLATE: &str = "<self> uses a special move on <target>!";

impl Encounter {
    pub(crate) fn special(
        &mut self,
        caller: FighterId,
        name: &str,
        target: Option<&str>,
        message: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        let combatant = self
            .roster
            .get(caller)
            .filter(|_| self.is_active())
            .ok_or(CheckError::NotInCombat)?;
        if combatant.combat.used_special {
            return Err(CommandError::SpecialAlreadyUsed);
        }
        let query = name.trim();
        if query.is_empty() {
            return Err(CommandError::NeedSpecialName);
        }
        let special = combatant
            .fighter
            .loadout()
            .find(query)
            .ok_or(CommandError::UnknownSpecial)?
            .clone();

        let fighter = &combatant.fighter;
        let vit = u32::from(fighter.stats().vit);
        let named = || special.name.clone();
        if special.cost() > fighter.sp() {
            return Err(CommandError::NotEnoughSp { name: named() });
        }
        if special.has(EffectKind::DesperationMove) && fighter.hp() > vit {
            return Err(CommandError::TooMuchHp { name: named() });
        }
        if special.has(EffectKind::VitalMove) && fighter.hp() < 2 * vit {
            return Err(CommandError::NotEnoughHp { name: named() });
        }
        if special.has(EffectKind::ChargeMove) && !combatant.combat.is_charged(&special.name) {
            return Err(CommandError::NotCharged);
        }
        if special.has(EffectKind::OpeningGambit) && combatant.combat.last_action.is_some() {
            return Err(CommandError::NotOpening { name: named() });
        }

        match special.category {
            MoveCategory::MeleeAttack | MoveCategory::RangedAttack => {
                self.special_attack(caller, &special, target, message, directory)?
            }
            MoveCategory::SupportSelf => {
                self.special_support_self(caller, &special, message, directory)?
            }
            MoveCategory::SupportOther | MoveCategory::HinderOther => {
                self.special_on_other(caller, &special, target, message, directory)?
            }
            MoveCategory::Defense => self.special_defense(caller, &special, message, directory)?,
        }

        if special.has(EffectKind::ChargeMove) {
            self.combatant_mut(caller)?
                .combat
                .charged
                .remove(&special.name.to_lowercase());
        }
        tracing::debug!(fighter = %caller, special = %special.name, "special move used");
        Ok(())
    }

    /// Pays for `special` and announces it.
    fn spend_special(
        &mut self,
        caller: FighterId,
        special: &SpecialMove,
        text: Option<String>,
    ) -> Result<(), CommandError> {
        let cost = special.cost();
        self.combatant_mut(caller)?.fighter.spend_sp(cost);
        self.outbox.broadcast(NoticeKind::SpecialUsed {
            fighter: caller,
            special: special.name.clone(),
            cost,
            text,
            effects: special.effects.clone(),
        });
        Ok(())
    }

    /// Spends the action for a non-defense special.
    fn finish_action(&mut self, caller: FighterId) -> Result<(), CommandError> {
        let combatant = self.combatant_mut(caller)?;
        combatant.combat.actions = combatant.combat.actions.saturating_sub(1);
        combatant.combat.last_action = Some(LastAction::Special);
        Ok(())
    }

    fn special_attack(
        &mut self,
        caller: FighterId,
        special: &SpecialMove,
        target: Option<&str>,
        message: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        let target = self.require_target(
            caller,
            Checks::TARGETED_ACTION,
            "special attack",
            target,
            directory,
        )?;
        let kind = match special.category {
            MoveCategory::MeleeAttack => AttackType::Melee,
            _ => AttackType::Ranged,
        };
        attack_type_check(
            &self.roster,
            &self.ranges,
            caller,
            target,
            kind,
            &special.effects,
        )?;

        self.spend_special(caller, special, None)?;
        let template = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(SPECIAL_ATTACK_TEMPLATE);
        let mut battle = self.battle();
        if special.has(EffectKind::LungeAttack) {
            battle.move_fighter(
                Direction::Approach,
                caller,
                target,
                ArenaConfig::FREE_MOVE_STEPS,
                MoveMode::Free,
            );
        }
        battle.queue_attack(caller, target, Some(template), &special.effects, kind);
        if special.has(EffectKind::PartingAttack) {
            battle.move_fighter(
                Direction::Withdraw,
                caller,
                target,
                ArenaConfig::FREE_MOVE_STEPS,
                MoveMode::Free,
            );
        }
        battle.apply_drawbacks(caller, caller, &special.effects);
        self.finish_action(caller)
    }

    fn special_support_self(
        &mut self,
        caller: FighterId,
        special: &SpecialMove,
        message: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        self.check(
            caller,
            Checks::TURN | Checks::HAS_ACTION,
            "use a special move",
            None,
            directory,
        )?;

        let text = self
            .flavour(caller, message, None)
            .unwrap_or_else(|| self.render(caller, SPECIAL_SELF_TEMPLATE, None));
        self.spend_special(caller, special, Some(text))?;
        self.battle()
            .apply_support(caller, caller, &special.effects);
        self.finish_action(caller)?;
        self.battle()
            .apply_drawbacks(caller, caller, &special.effects);
        self.bonus_action(caller, special)
    }

    fn special_on_other(
        &mut self,
        caller: FighterId,
        special: &SpecialMove,
        target: Option<&str>,
        message: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        let hinder = special.category == MoveCategory::HinderOther;
        let verb = if hinder {
            "special hinder"
        } else {
            "special support"
        };
        let target = self.require_target(caller, Checks::TARGETED_ACTION, verb, target, directory)?;
        if special.has(EffectKind::TouchEffect) && self.ranges.get(caller, target) != 0 {
            return Err(CommandError::TouchOutOfReach);
        }

        let text = self
            .flavour(caller, message, Some(target))
            .unwrap_or_else(|| self.render(caller, SPECIAL_OTHER_TEMPLATE, Some(target)));
        self.spend_special(caller, special, Some(text))?;
        let mut battle = self.battle();
        if hinder {
            battle.apply_hinder(target, caller, &special.effects);
        } else {
            battle.apply_support(target, caller, &special.effects);
        }
        self.finish_action(caller)?;
        self.battle()
            .apply_drawbacks(caller, caller, &special.effects);
        self.bonus_action(caller, special)
    }

    /// Refunds the action once per turn.
    fn bonus_action(&mut self, caller: FighterId, special: &SpecialMove) -> Result<(), CommandError> {
        if special.has(EffectKind::BonusAction) {
            let combatant = self.combatant_mut(caller)?;
            combatant.combat.actions += 1;
            combatant.combat.used_special = true;
        }
        Ok(())
    }

    /// Answers the attack waiting on `caller` with a defense special. Can be
    /// used on anyone's turn.
    fn special_defense(
        &mut self,
        caller: FighterId,
        special: &SpecialMove,
        message: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        self.check(caller, Checks::IN_COMBAT, "use a special move", None, directory)?;
        let incoming = self
            .roster
            .get(caller)
            .and_then(|c| c.combat.incoming.clone())
            .ok_or(CommandError::NoIncomingAttack)?;
        if special.has(EffectKind::RangedOnlyDefense) && incoming.kind != AttackType::Ranged {
            return Err(CommandError::RangedOnlyDefense);
        }
        if special.has(EffectKind::MeleeOnlyDefense) && incoming.kind != AttackType::Melee {
            return Err(CommandError::MeleeOnlyDefense);
        }
        if special.has(EffectKind::Counterattack) {
            let attacker = incoming.attacker;
            let kind = AttackType::for_range(self.ranges.get(caller, attacker));
            attack_type_check(&self.roster, &self.ranges, caller, attacker, kind, &[])?;
        }

        let text = self
            .flavour(caller, message, None)
            .unwrap_or_else(|| self.render(caller, SPECIAL_SELF_TEMPLATE, None));
        self.spend_special(caller, special, Some(text))?;
        let tick_owner = self.current().unwrap_or(caller);
        let mut battle = self.battle();
        battle.resolve_defense(caller, DefenseAction::Defend, &special.effects);
        battle.apply_drawbacks(caller, tick_owner, &special.effects);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionKind;
    use crate::engine::PlayerCommand;
    use crate::engine::fixture::*;
    use crate::notice::Notice;
    use crate::state::Fighter;

    fn define(name: &str, category: MoveCategory, effects: &[EffectKind]) -> SpecialMove {
        SpecialMove::define(name, category, effects, "", &stats(10, 10, 10, 10, 10, 10)).unwrap()
    }

    fn with_move(mut fighter: Fighter, special: SpecialMove) -> Fighter {
        fighter.loadout_mut().add(special).unwrap();
        fighter
    }

    fn special(name: &str, target: Option<&str>) -> PlayerCommand {
        PlayerCommand::Special {
            name: name.into(),
            target: target.map(Into::into),
            message: None,
        }
    }

    fn drain_notices(enc: &mut Encounter) -> Vec<Notice> {
        enc.drain().0
    }

    #[test]
    fn attack_special_spends_sp_and_queues_with_effects() {
        let smash = define("Smash", MoveCategory::MeleeAttack, &[EffectKind::DoubleDamage]);
        let mut enc = started(vec![with_move(ann(), smash), bo()], [4]);
        enc.engage_for_tests(ANN, BO);
        let dir = enc.roster().clone();

        enc.execute(ANN, special("smash", Some("bo")), &dir).unwrap();
        let ann = enc.roster().get(ANN).unwrap();
        assert_eq!(ann.fighter.sp(), 4);
        assert_eq!(ann.combat.actions, 0);
        assert_eq!(ann.combat.last_action, Some(LastAction::Special));
        let incoming = enc.roster().get(BO).unwrap().combat.incoming.clone().unwrap();
        assert_eq!(incoming.roll, 4);
        assert!(incoming.effects.contains(&EffectKind::DoubleDamage));

        let notices = drain_notices(&mut enc);
        assert!(has(&notices, |k| matches!(
            k,
            NoticeKind::AttackQueued { text, .. } if text == "Ann uses a special attack on Bo!"
        )));
    }

    #[test]
    fn not_enough_sp_is_rejected() {
        let pricey = define(
            "Pricey",
            MoveCategory::MeleeAttack,
            &[EffectKind::DoubleDamage, EffectKind::Leech],
        );
        let mut enc = started(vec![with_move(ann(), pricey), bo()], []);
        enc.engage_for_tests(ANN, BO);
        enc.roster_mut_for_tests()
            .get_mut(ANN)
            .unwrap()
            .fighter
            .spend_sp(3);
        let dir = enc.roster().clone();
        assert_eq!(
            enc.execute(ANN, special("pricey", Some("bo")), &dir),
            Err(CommandError::NotEnoughSp {
                name: "Pricey".into()
            })
        );
    }

    #[test]
    fn unknown_and_missing_names() {
        let mut enc = duel([]);
        let dir = enc.roster().clone();
        assert_eq!(
            enc.execute(ANN, special("nope", None), &dir),
            Err(CommandError::UnknownSpecial)
        );
        assert_eq!(
            enc.execute(ANN, special("", None), &dir),
            Err(CommandError::NeedSpecialName)
        );
    }

    #[test]
    fn lunge_closes_in_before_attacking() {
        let lunge = define("Lunge", MoveCategory::MeleeAttack, &[EffectKind::LungeAttack]);
        let mut enc = started(vec![with_move(ann(), lunge), bo()], [3]);
        let dir = enc.roster().clone();
        enc.execute(ANN, special("lunge", Some("bo")), &dir).unwrap();
        assert_eq!(enc.ranges().get(ANN, BO), 0);
        assert_eq!(enc.roster().get(ANN).unwrap().combat.moves, 2);
        assert!(enc.roster().get(BO).unwrap().combat.incoming.is_some());
    }

    #[test]
    fn parting_attack_backs_off_afterwards() {
        let parting = define(
            "Hit and Run",
            MoveCategory::MeleeAttack,
            &[EffectKind::PartingAttack],
        );
        let mut enc = started(vec![with_move(ann(), parting), bo()], [3]);
        enc.engage_for_tests(ANN, BO);
        let dir = enc.roster().clone();
        enc.execute(ANN, special("hit", Some("bo")), &dir).unwrap();
        assert_eq!(enc.ranges().get(ANN, BO), 2);
    }

    #[test]
    fn desperation_needs_low_hp() {
        let last_stand = define(
            "Last Stand",
            MoveCategory::MeleeAttack,
            &[EffectKind::DoubleDamage, EffectKind::DesperationMove],
        );
        let mut enc = started(vec![with_move(ann(), last_stand), bo()], [2]);
        enc.engage_for_tests(ANN, BO);
        let dir = enc.roster().clone();
        assert_eq!(
            enc.execute(ANN, special("last", Some("bo")), &dir),
            Err(CommandError::TooMuchHp {
                name: "Last Stand".into()
            })
        );
        enc.roster_mut_for_tests()
            .get_mut(ANN)
            .unwrap()
            .fighter
            .take_damage(10);
        assert!(enc.execute(ANN, special("last", Some("bo")), &dir).is_ok());
    }

    #[test]
    fn vital_move_needs_high_hp() {
        let vital = define(
            "Vital",
            MoveCategory::MeleeAttack,
            &[EffectKind::DoubleDamage, EffectKind::VitalMove],
        );
        let mut enc = started(vec![with_move(ann(), vital), bo()], []);
        enc.engage_for_tests(ANN, BO);
        enc.roster_mut_for_tests()
            .get_mut(ANN)
            .unwrap()
            .fighter
            .take_damage(6);
        let dir = enc.roster().clone();
        assert_eq!(
            enc.execute(ANN, special("vital", Some("bo")), &dir),
            Err(CommandError::NotEnoughHp {
                name: "Vital".into()
            })
        );
    }

    #[test]
    fn charged_move_needs_charging_and_consumes_it() {
        let big = define(
            "Big Swing",
            MoveCategory::MeleeAttack,
            &[EffectKind::DoubleDamage, EffectKind::ChargeMove],
        );
        let mut enc = started(vec![with_move(ann(), big), bo()], [3]);
        enc.engage_for_tests(ANN, BO);
        let dir = enc.roster().clone();
        assert_eq!(
            enc.execute(ANN, special("big", Some("bo")), &dir),
            Err(CommandError::NotCharged)
        );

        enc.roster_mut_for_tests()
            .get_mut(ANN)
            .unwrap()
            .combat
            .charged
            .insert("big swing".into());
        enc.execute(ANN, special("big", Some("bo")), &dir).unwrap();
        assert!(!enc.roster().get(ANN).unwrap().combat.is_charged("Big Swing"));
    }

    #[test]
    fn opening_gambit_only_before_acting() {
        let opener = define(
            "Opener",
            MoveCategory::MeleeAttack,
            &[EffectKind::DoubleDamage, EffectKind::OpeningGambit],
        );
        let mut enc = started(vec![with_move(ann(), opener), bo()], []);
        enc.engage_for_tests(ANN, BO);
        enc.roster_mut_for_tests()
            .get_mut(ANN)
            .unwrap()
            .combat
            .last_action = Some(LastAction::Pass);
        let dir = enc.roster().clone();
        assert_eq!(
            enc.execute(ANN, special("opener", Some("bo")), &dir),
            Err(CommandError::NotOpening {
                name: "Opener".into()
            })
        );
    }

    #[test]
    fn support_self_heals_and_bonus_action_refunds_once() {
        let patch = define(
            "Patch Up",
            MoveCategory::SupportSelf,
            &[EffectKind::Heal, EffectKind::BonusAction],
        );
        let mut enc = started(vec![with_move(ann(), patch), bo()], []);
        enc.roster_mut_for_tests()
            .get_mut(ANN)
            .unwrap()
            .fighter
            .take_damage(8);
        let dir = enc.roster().clone();

        enc.execute(ANN, special("patch", None), &dir).unwrap();
        let ann = enc.roster().get(ANN).unwrap();
        assert_eq!(ann.fighter.hp(), 12);
        assert_eq!(ann.fighter.sp(), 2);
        assert_eq!(ann.combat.actions, 1);
        assert!(ann.combat.used_special);

        assert_eq!(
            enc.execute(ANN, special("patch", None), &dir),
            Err(CommandError::SpecialAlreadyUsed)
        );
    }

    #[test]
    fn support_other_buffs_on_the_users_clock() {
        let rally = define(
            "Rally",
            MoveCategory::SupportOther,
            &[EffectKind::GrantBuffedAtk],
        );
        let mut enc = started(vec![with_move(ann(), rally), bo()], []);
        let dir = enc.roster().clone();
        enc.execute(ANN, special("rally", Some("bo")), &dir).unwrap();

        let buff = *enc
            .roster()
            .get(BO)
            .unwrap()
            .combat
            .conditions
            .get(ConditionKind::BuffedAtk)
            .unwrap();
        assert_eq!(buff.tick_owner, ANN);
        assert_eq!(buff.remaining, 4);
        let notices = drain_notices(&mut enc);
        assert!(has(&notices, |k| matches!(
            k,
            NoticeKind::SpecialUsed { text: Some(text), .. } if text == "Ann uses a special move on Bo!"
        )));
    }

    #[test]
    fn touch_effect_needs_engagement() {
        let grab = define(
            "Grab",
            MoveCategory::HinderOther,
            &[EffectKind::InflictImmobilization, EffectKind::TouchEffect],
        );
        let mut enc = started(vec![with_move(ann(), grab), bo()], []);
        let dir = enc.roster().clone();
        assert_eq!(
            enc.execute(ANN, special("grab", Some("bo")), &dir),
            Err(CommandError::TouchOutOfReach)
        );
        enc.engage_for_tests(ANN, BO);
        enc.execute(ANN, special("grab", Some("bo")), &dir).unwrap();
        assert!(enc
            .roster()
            .get(BO)
            .unwrap()
            .combat
            .conditions
            .has(ConditionKind::Immobilization));
    }

    #[test]
    fn defense_special_answers_out_of_turn() {
        let shell = define("Shell", MoveCategory::Defense, &[EffectKind::NegateDamage]);
        // Ann's attack rolls 6, Bo's defense rolls 1.
        let mut enc = started(vec![ann(), with_move(bo(), shell)], [6, 1]);
        enc.engage_for_tests(ANN, BO);
        let dir = enc.roster().clone();

        assert_eq!(
            enc.execute(BO, special("shell", None), &dir),
            Err(CommandError::NoIncomingAttack)
        );
        enc.execute(
            ANN,
            PlayerCommand::Attack {
                target: "bo".into(),
                message: None,
            },
            &dir,
        )
        .unwrap();
        enc.execute(BO, special("shell", None), &dir).unwrap();

        let bo = enc.roster().get(BO).unwrap();
        assert_eq!(bo.fighter.hp(), 15);
        assert_eq!(bo.fighter.sp(), 2);
        assert!(bo.combat.incoming.is_none());
        assert_eq!(bo.combat.last_action, None);
    }

    #[test]
    fn ranged_only_defense_rejects_melee() {
        let deflect = define(
            "Deflect",
            MoveCategory::Defense,
            &[EffectKind::BoostedDefense, EffectKind::RangedOnlyDefense],
        );
        let mut enc = started(vec![ann(), with_move(bo(), deflect)], [3]);
        enc.engage_for_tests(ANN, BO);
        let dir = enc.roster().clone();
        enc.execute(
            ANN,
            PlayerCommand::Attack {
                target: "bo".into(),
                message: None,
            },
            &dir,
        )
        .unwrap();
        assert_eq!(
            enc.execute(BO, special("deflect", None), &dir),
            Err(CommandError::RangedOnlyDefense)
        );
        assert!(enc.roster().get(BO).unwrap().combat.incoming.is_some());
    }
}
