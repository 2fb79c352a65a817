//! Encounter lifecycle, turn scheduling, and command execution.
//!
//! An [`Encounter`] is the authoritative state of one fight. Every mutation
//! goes through it: player commands via [`Encounter::execute`], the turn
//! tick via [`Encounter::on_tick`], and defense countdown steps via
//! [`Encounter::defense_tick`]. Each call runs to completion and leaves its
//! notices and timer requests in the encounter's outbox for the caller to
//! drain.
//!
//! # Phases
//!
//! ```text
//! Forming --start--> Active --(all disengaged | one standing | stop)--> Ended
//! ```

mod checks;
mod commands;
mod errors;
mod special;
mod turns;

#[cfg(test)]
mod fixture;

pub use checks::Checks;
pub use commands::{AllyOp, PlayerCommand, Steps, apply_ally};
pub use errors::{CheckError, CommandError, EncounterError};

use std::collections::BTreeMap;

use crate::combat::{Battle, initiative_roll};
use crate::config::ArenaConfig;
use crate::env::{RngOracle, RoomInfo};
use crate::notice::{EncounterOutcome, Notice, NoticeKind, Outbox, TimerRequest};
use crate::range::RangeMap;
use crate::state::{Combatant, Fighter, FighterId, Roster};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Forming,
    Active,
    Ended(EncounterOutcome),
}

/// One fight in one room.
pub struct Encounter {
    room: RoomInfo,
    config: ArenaConfig,
    rng: Box<dyn RngOracle>,
    roster: Roster,
    ranges: RangeMap,
    phase: Phase,
    /// Index into the roster of the fighter whose turn it is.
    turn: usize,
    /// Ticks left before the current turn times out.
    timer: u32,
    outbox: Outbox,
}

impl Encounter {
    pub fn new(room: RoomInfo, config: ArenaConfig, rng: Box<dyn RngOracle>) -> Self {
        let ranges = RangeMap::new(room.size);
        Self {
            room,
            config,
            rng,
            roster: Roster::new(),
            ranges,
            phase: Phase::Forming,
            turn: 0,
            timer: 0,
            outbox: Outbox::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn room(&self) -> &RoomInfo {
        &self.room
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ranges(&self) -> &RangeMap {
        &self.ranges
    }

    /// Fighter whose turn it is, once the encounter has started.
    pub fn current(&self) -> Option<FighterId> {
        if self.phase == Phase::Forming {
            return None;
        }
        self.roster.at(self.turn).map(Combatant::id)
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Takes the notices and timer requests produced so far.
    pub fn drain(&mut self) -> (Vec<Notice>, Vec<TimerRequest>) {
        self.outbox.drain()
    }

    pub(crate) fn battle(&mut self) -> Battle<'_> {
        Battle::new(
            &mut self.roster,
            &mut self.ranges,
            &mut *self.rng,
            &mut self.outbox,
            &self.config,
        )
    }

    pub(crate) fn combatant_mut(&mut self, id: FighterId) -> Result<&mut Combatant, CheckError> {
        self.roster.get_mut(id).ok_or(CheckError::NotInCombat)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Adds a fighter before the fight starts.
    pub fn enlist(&mut self, fighter: Fighter) -> Result<(), EncounterError> {
        if self.phase != Phase::Forming {
            return Err(EncounterError::AlreadyStarted);
        }
        if self.roster.contains(fighter.id) {
            return Err(EncounterError::AlreadyEnrolled { fighter: fighter.id });
        }
        self.roster.push(Combatant::new(fighter));
        Ok(())
    }

    /// Rolls initiative, places everyone at the room's starting range, and
    /// opens the first turn.
    pub fn start(&mut self, instigator: FighterId) -> Result<(), EncounterError> {
        if self.phase != Phase::Forming {
            return Err(EncounterError::AlreadyStarted);
        }
        if !self.room.combat_allowed {
            return Err(EncounterError::CombatNotAllowed);
        }
        if self.roster.len() < 2 {
            return Err(EncounterError::NotEnoughFighters);
        }

        self.outbox
            .broadcast(NoticeKind::FightStarted { instigator });

        let mut rolls = BTreeMap::new();
        for combatant in self.roster.iter() {
            let roll = initiative_roll(combatant.fighter.stats().mob, &mut *self.rng);
            rolls.insert(combatant.id(), roll);
        }
        self.roster
            .sort_by_key_desc(|c| rolls.get(&c.id()).copied().unwrap_or(0));
        let order = self.roster.ids();
        self.outbox.broadcast(NoticeKind::TurnOrder {
            order: order.clone(),
        });

        self.ranges = RangeMap::with_members(self.room.size, &order, self.room.starting_range());
        self.phase = Phase::Active;
        self.turn = 0;
        self.timer = self.config.turn_timer_ticks;

        if let Some(first) = order.first().copied() {
            self.outbox.broadcast(NoticeKind::TurnStarted {
                previous: None,
                current: first,
            });
            self.start_turn(first);
        }
        self.outbox.timer(TimerRequest::StartTurnTicker);
        tracing::debug!(room = %self.room.id, fighters = order.len(), "encounter started");
        Ok(())
    }

    /// Whether [`Encounter::join`] would accept `fighter`.
    pub fn can_join(&self, fighter: FighterId) -> Result<(), EncounterError> {
        if self.phase != Phase::Active {
            return Err(EncounterError::NotActive);
        }
        if self.roster.contains(fighter) {
            return Err(EncounterError::AlreadyEnrolled { fighter });
        }
        Ok(())
    }

    /// Adds a fighter to a running fight, directly before the current turn
    /// and as far from everyone as the room allows.
    pub fn join(&mut self, fighter: Fighter) -> Result<(), EncounterError> {
        let id = fighter.id;
        self.can_join(id)?;
        self.roster.insert(self.turn, Combatant::new(fighter));
        self.turn += 1;
        self.ranges.add_distant(id);
        self.outbox.broadcast(NoticeKind::Joined { fighter: id });
        tracing::debug!(room = %self.room.id, fighter = %id, "fighter joined");
        Ok(())
    }

    /// Ends the fight from outside the turn loop. No-op once ended.
    pub fn stop(&mut self) {
        if !self.is_ended() {
            self.end(EncounterOutcome::Stopped);
        }
    }

    fn end(&mut self, outcome: EncounterOutcome) {
        self.phase = Phase::Ended(outcome);
        for combatant in self.roster.iter_mut() {
            if combatant.combat.defense_countdown.take().is_some() {
                self.outbox
                    .timer(TimerRequest::CancelDefenseCountdown(combatant.id()));
            }
        }
        self.outbox.timer(TimerRequest::StopTurnTicker);
        self.outbox
            .broadcast(NoticeKind::EncounterEnded { outcome });
        tracing::debug!(room = %self.room.id, ?outcome, "encounter ended");
    }

    /// Consumes the encounter, dropping all combat-scoped state.
    pub fn into_fighters(self) -> Vec<Fighter> {
        self.roster.into_fighters()
    }
}
