//! Turn scheduling: the periodic tick, turn advancement, and the per-step
//! defense countdown.

use crate::combat::DefenseAction;
use crate::condition::ConditionKind;
use crate::notice::{EncounterOutcome, NoticeKind};
use crate::state::{FighterId, LastAction};

use super::Encounter;

impl Encounter {
    /// One turn-timer tick.
    ///
    /// Advances when the current fighter has nothing left to do, warns them
    /// as time runs low, and disengages them at expiry. None of this happens
    /// while any attack is waiting on a defender.
    pub fn on_tick(&mut self) {
        if !self.is_active() {
            return;
        }
        let Some(current) = self.current() else {
            return;
        };
        self.timer = self.timer.saturating_sub(1);
        if self.roster.any_unresolved_attack() {
            return;
        }

        let spent = self
            .roster
            .get(current)
            .is_some_and(|c| c.combat.is_spent());
        if spent {
            self.advance_turn();
            return;
        }

        if self.timer == 0 {
            if let Some(c) = self.roster.get_mut(current) {
                c.combat.last_action = Some(LastAction::Disengage);
            }
            self.outbox
                .broadcast(NoticeKind::TimedOut { fighter: current });
            self.advance_turn();
        } else if self.timer == self.config.turn_warning_ticks {
            self.outbox.whisper(current, NoticeKind::TurnWarning);
        }
    }

    /// Ends the current turn, or the whole encounter if nobody is left to
    /// fight.
    pub(crate) fn advance_turn(&mut self) {
        let Some(ending) = self.current() else {
            return;
        };

        let standing: Vec<FighterId> = self.roster.standing().map(|c| c.id()).collect();
        let all_disengaged = !standing.is_empty()
            && self
                .roster
                .standing()
                .all(|c| c.combat.last_action == Some(LastAction::Disengage));
        if all_disengaged {
            self.end(EncounterOutcome::AllDisengaged);
            return;
        }
        match standing.as_slice() {
            [] => {
                self.end(EncounterOutcome::NoSurvivors);
                return;
            }
            [winner] => {
                self.end(EncounterOutcome::Winner(*winner));
                return;
            }
            _ => {}
        }

        let mut expired = Vec::new();
        for combatant in self.roster.iter_mut() {
            let fighter = combatant.id();
            for kind in combatant.combat.conditions.tickdown(ending) {
                expired.push((fighter, kind));
            }
        }
        for (fighter, kind) in expired {
            self.outbox
                .broadcast(NoticeKind::ConditionExpired { fighter, kind });
        }

        if let Some(c) = self.roster.get_mut(ending) {
            c.combat.actions = 0;
            c.combat.moves = 0;
            c.combat.second = None;
        }

        self.turn = (self.turn + 1) % self.roster.len();
        self.timer = self.config.turn_timer_ticks;
        let Some(current) = self.current() else {
            return;
        };
        self.outbox.broadcast(NoticeKind::TurnStarted {
            previous: Some(ending),
            current,
        });
        self.start_turn(current);
        tracing::debug!(room = %self.room.id, %ending, %current, "turn advanced");
    }

    /// Grants turn resources, adjusted by the fighter's conditions.
    pub(crate) fn start_turn(&mut self, fighter: FighterId) {
        let Some(c) = self.roster.get_mut(fighter) else {
            return;
        };
        let state = &mut c.combat;
        state.actions = 1;
        state.moves = c.fighter.stats().base_moves();
        state.used_special = false;
        state.second = None;

        let conditions = &state.conditions;
        if conditions.has(ConditionKind::BuffedMob) {
            state.moves = state.moves.saturating_add(1);
        }
        if conditions.has(ConditionKind::DebuffedMob) {
            state.moves = state.moves.saturating_sub(1);
        }
        if conditions.has(ConditionKind::Immobilization) {
            state.moves = 0;
        }
        if conditions.has(ConditionKind::DisabledAction) {
            state.actions = 0;
        }
        if c.fighter.is_defeated() {
            state.actions = 0;
            state.moves = 0;
        }

        let active: Vec<ConditionKind> = state.conditions.iter().map(|c| c.kind).collect();
        for kind in active {
            self.outbox
                .whisper(fighter, NoticeKind::ConditionActive { kind });
        }
        self.prompt(fighter);
    }

    /// Sends a fighter their resource summary.
    pub fn prompt(&mut self, fighter: FighterId) {
        let Some(c) = self.roster.get(fighter) else {
            return;
        };
        let max = c.fighter.maximums();
        self.outbox.whisper(
            fighter,
            NoticeKind::Prompt {
                hp: c.fighter.hp(),
                hp_max: max.hp_max,
                sp: c.fighter.sp(),
                sp_max: max.sp_max,
                actions: c.combat.actions,
                moves: c.combat.moves,
            },
        );
    }

    /// One step of `fighter`'s defense countdown.
    ///
    /// Returns true while the countdown should keep running. At expiry the
    /// attack is defended automatically.
    pub fn defense_tick(&mut self, fighter: FighterId) -> bool {
        if !self.is_active() {
            return false;
        }
        let warning = self.config.defense_warning_steps;
        let Some(c) = self.roster.get_mut(fighter) else {
            return false;
        };
        let Some(attacker) = c.combat.incoming.as_ref().map(|a| a.attacker) else {
            c.combat.defense_countdown = None;
            return false;
        };
        let remaining = c.combat.defense_countdown.unwrap_or(0).saturating_sub(1);
        c.combat.defense_countdown = Some(remaining);

        if remaining == 0 {
            self.outbox.whisper(fighter, NoticeKind::AutoDefend);
            self.battle()
                .resolve_defense(fighter, DefenseAction::Defend, &[]);
            return false;
        }
        if remaining == warning {
            self.outbox
                .whisper(fighter, NoticeKind::DefenseWarning { attacker });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture::*;
    use super::*;
    use crate::engine::{Phase, PlayerCommand};
    use crate::notice::{Audience, TimerRequest};

    #[test]
    fn first_turn_grants_resources() {
        let enc = duel([]);
        assert_eq!(enc.current(), Some(ANN));
        let ann = enc.roster().get(ANN).unwrap();
        assert_eq!(ann.combat.actions, 1);
        assert_eq!(ann.combat.moves, 2);
        assert_eq!(enc.ranges().get(ANN, BO), 2);
        assert_eq!(enc.timer(), 60);
    }

    #[test]
    fn start_announces_order_and_requests_the_ticker() {
        let mut enc = forming_duel([]);
        enc.start(ANN).unwrap();
        let (notices, timers) = enc.drain();
        assert!(matches!(notices[0].kind, NoticeKind::FightStarted { instigator } if instigator == ANN));
        assert!(notices.iter().any(|n| matches!(
            &n.kind,
            NoticeKind::TurnOrder { order } if order == &vec![ANN, BO]
        )));
        assert!(notices.iter().any(|n| n.audience == Audience::Fighter(ANN)
            && matches!(n.kind, NoticeKind::Prompt { actions: 1, moves: 2, .. })));
        assert_eq!(timers, vec![TimerRequest::StartTurnTicker]);
    }

    #[test]
    fn initiative_sorts_by_roll() {
        let mut enc = forming_duel([5, 900]);
        enc.start(ANN).unwrap();
        assert_eq!(enc.roster().ids(), vec![BO, ANN]);
        assert_eq!(enc.current(), Some(BO));
    }

    #[test]
    fn spent_fighter_advances_on_next_tick() {
        let mut enc = duel([]);
        let dir = enc.roster().clone();
        enc.execute(ANN, PlayerCommand::Pass { message: None }, &dir)
            .unwrap();
        enc.on_tick();
        assert_eq!(enc.current(), Some(BO));
        assert_eq!(enc.roster().get(ANN).unwrap().combat.moves, 0);
    }

    #[test]
    fn timeout_warns_then_disengages() {
        let mut enc = duel([]);
        for _ in 0..50 {
            enc.on_tick();
        }
        let (notices, _) = enc.drain();
        assert!(notices
            .iter()
            .any(|n| n.kind == NoticeKind::TurnWarning && n.audience == Audience::Fighter(ANN)));

        for _ in 0..10 {
            enc.on_tick();
        }
        assert_eq!(enc.current(), Some(BO));
        assert_eq!(
            enc.roster().get(ANN).unwrap().combat.last_action,
            Some(LastAction::Disengage)
        );
    }

    #[test]
    fn pending_attack_blocks_advancement() {
        // Ann rolls 3 against Bo.
        let mut enc = duel_engaged([3]);
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
        for _ in 0..70 {
            enc.on_tick();
        }
        assert_eq!(enc.current(), Some(ANN));
    }

    #[test]
    fn everyone_disengaging_ends_the_fight() {
        let mut enc = duel([]);
        let dir = enc.roster().clone();
        enc.execute(ANN, PlayerCommand::Disengage { message: None }, &dir)
            .unwrap();
        enc.on_tick();
        enc.execute(BO, PlayerCommand::Disengage { message: None }, &dir)
            .unwrap();
        enc.on_tick();
        assert_eq!(enc.phase(), Phase::Ended(EncounterOutcome::AllDisengaged));
        let (_, timers) = enc.drain();
        assert!(timers.contains(&TimerRequest::StopTurnTicker));
    }

    #[test]
    fn last_fighter_standing_wins() {
        let mut enc = duel([]);
        enc.roster_mut_for_tests()
            .get_mut(BO)
            .unwrap()
            .fighter
            .take_damage(100);
        let dir = enc.roster().clone();
        enc.execute(ANN, PlayerCommand::Pass { message: None }, &dir)
            .unwrap();
        enc.on_tick();
        assert_eq!(enc.phase(), Phase::Ended(EncounterOutcome::Winner(ANN)));
    }

    #[test]
    fn conditions_tick_on_their_owners_turn() {
        let mut enc = duel([]);
        {
            let roster = enc.roster_mut_for_tests();
            let bo = roster.get_mut(BO).unwrap();
            bo.combat
                .conditions
                .add(ConditionKind::Immobilization, 1, ANN);
            bo.combat.conditions.add(ConditionKind::BuffedMob, 2, BO);
        }
        enc.on_tick_until_turn_of(BO);
        let bo = enc.roster().get(BO).unwrap();
        assert!(!bo.combat.conditions.has(ConditionKind::Immobilization));
        assert_eq!(bo.combat.moves, 3);
        let (notices, _) = enc.drain();
        assert!(notices.iter().any(|n| matches!(
            n.kind,
            NoticeKind::ConditionExpired { fighter, kind: ConditionKind::Immobilization } if fighter == BO
        )));
        assert!(notices.iter().any(|n| n.audience == Audience::Fighter(BO)
            && n.kind == NoticeKind::ConditionActive { kind: ConditionKind::BuffedMob }));
    }

    #[test]
    fn join_slots_in_before_the_current_turn() {
        let mut enc = trio([]);
        enc.on_tick_until_turn_of(BO);
        enc.join(fighter(DEE, "Dee", stats(3, 3, 3, 3, 4, 3))).unwrap();
        assert_eq!(enc.roster().ids(), vec![ANN, DEE, BO, CY]);
        assert_eq!(enc.current(), Some(BO));
        assert_eq!(enc.ranges().get(DEE, ANN), 5);
        assert_eq!(enc.ranges().get(CY, DEE), 5);

        enc.on_tick_until_turn_of(CY);
        enc.on_tick_until_turn_of(ANN);
        enc.on_tick_until_turn_of(DEE);
    }

    #[test]
    fn defense_countdown_warns_then_defends() {
        // Attack roll 4, automatic defense roll 4: a tie, so no damage.
        let mut enc = duel_engaged([4, 4]);
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
        enc.drain();
        for _ in 0..20 {
            assert!(enc.defense_tick(BO));
        }
        let (notices, _) = enc.drain();
        assert!(notices.iter().any(|n| matches!(
            n.kind,
            NoticeKind::DefenseWarning { attacker } if attacker == ANN
        )));
        for _ in 0..9 {
            assert!(enc.defense_tick(BO));
        }
        assert!(!enc.defense_tick(BO));
        let (notices, _) = enc.drain();
        assert!(notices.iter().any(|n| n.kind == NoticeKind::AutoDefend));
        assert!(!enc.roster().any_unresolved_attack());
        assert_eq!(enc.roster().get(BO).unwrap().fighter.hp(), 15);
    }

    #[test]
    fn defense_tick_without_attack_stops() {
        let mut enc = duel([]);
        assert!(!enc.defense_tick(BO));
    }
}
