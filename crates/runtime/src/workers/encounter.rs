//! Encounter worker that owns one authoritative [`arena_core::Encounter`].
//!
//! Every input for a fight (player commands, turn ticks, defense countdown
//! steps) arrives through one mpsc channel and runs to completion against the
//! encounter before the next is taken. After each input the worker drains
//! the encounter's outbox: notices go to the event bus, timer requests start
//! or abort clock tasks.
use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use arena_core::{
    AllyOp, CheckError, CommandError, Encounter, EncounterError, EncounterOutcome, Fighter,
    FighterId, NoticeKind, Phase, PlayerCommand, RoomId, TimerRequest,
};

use super::LobbyCommand;
use super::timers::{spawn_countdown, spawn_ticker};
use crate::api::EncounterView;
use crate::events::{CombatEvent, Event, EventBus, LifecycleEvent};
use crate::oracle::FighterIndex;

/// Commands that can be sent to an encounter worker
pub(crate) enum EncounterCommand {
    /// Run a player command for `fighter`.
    Execute {
        fighter: FighterId,
        command: PlayerCommand,
        reply: oneshot::Sender<Result<(), CommandError>>,
    },
    /// Edit an ally list and hand the result back.
    Ally {
        fighter: FighterId,
        op: AllyOp,
        reply: oneshot::Sender<Result<NoticeKind, CommandError>>,
    },
    /// Add a fighter to the running fight. A rejected fighter is returned.
    Join {
        fighter: Fighter,
        reply: oneshot::Sender<Result<(), (EncounterError, Box<Fighter>)>>,
    },
    /// Copy of one participant's persistent state.
    Snapshot {
        fighter: FighterId,
        reply: oneshot::Sender<Option<Fighter>>,
    },
    View {
        reply: oneshot::Sender<EncounterView>,
    },
    Stop,
    /// One turn-timer tick.
    Tick,
    /// One step of a defense countdown.
    DefenseStep(FighterId),
}

/// Where to reach a running encounter.
#[derive(Clone)]
pub(crate) struct EncounterLink {
    pub room: RoomId,
    /// Distinguishes successive encounters in the same room.
    pub serial: u64,
    pub tx: mpsc::Sender<EncounterCommand>,
}

/// Wall-clock length of the engine's abstract timer units.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Timings {
    pub turn_tick: Duration,
    pub defense_step: Duration,
}

/// Background task driving one fight.
pub(crate) struct EncounterWorker {
    serial: u64,
    encounter: Encounter,
    directory: FighterIndex,
    command_rx: mpsc::Receiver<EncounterCommand>,
    command_tx: mpsc::WeakSender<EncounterCommand>,
    lobby_tx: mpsc::WeakSender<LobbyCommand>,
    event_bus: EventBus,
    timings: Timings,
    ticker: Option<JoinHandle<()>>,
    countdowns: HashMap<FighterId, JoinHandle<()>>,
}

impl EncounterWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        serial: u64,
        encounter: Encounter,
        directory: FighterIndex,
        command_rx: mpsc::Receiver<EncounterCommand>,
        command_tx: mpsc::WeakSender<EncounterCommand>,
        lobby_tx: mpsc::WeakSender<LobbyCommand>,
        event_bus: EventBus,
        timings: Timings,
    ) -> Self {
        Self {
            serial,
            encounter,
            directory,
            command_rx,
            command_tx,
            lobby_tx,
            event_bus,
            timings,
            ticker: None,
            countdowns: HashMap::new(),
        }
    }

    fn room(&self) -> RoomId {
        self.encounter.room().id
    }

    /// Main worker loop. Returns once the encounter has ended and its
    /// fighters have been handed back to the lobby.
    pub(crate) async fn run(mut self) {
        // Notices and timers produced by `start` before the worker existed.
        self.flush();

        while !self.encounter.is_ended() {
            match self.command_rx.recv().await {
                Some(cmd) => self.handle_command(cmd),
                // Lobby is gone: the runtime is shutting down.
                None => self.encounter.stop(),
            }
            self.flush();
        }

        self.finish().await;
    }

    fn handle_command(&mut self, cmd: EncounterCommand) {
        match cmd {
            EncounterCommand::Execute {
                fighter,
                command,
                reply,
            } => {
                let name = command.as_ref().to_owned();
                debug!(room = %self.room(), %fighter, command = %name, "executing command");
                let result = self.encounter.execute(fighter, command, &self.directory);
                if let Err(error) = &result {
                    warn!(room = %self.room(), %fighter, command = %name, %error, "command rejected");
                }
                if reply.send(result).is_err() {
                    debug!("Execute reply channel closed (caller dropped)");
                }
            }
            EncounterCommand::Ally { fighter, op, reply } => {
                let result = self.encounter.ally(fighter, &op, &self.directory);
                if reply.send(result).is_err() {
                    debug!("Ally reply channel closed (caller dropped)");
                }
            }
            EncounterCommand::Join { fighter, reply } => {
                let id = fighter.id;
                let result = match self.encounter.can_join(id) {
                    Ok(()) => {
                        let joined = self.encounter.join(fighter);
                        debug_assert!(joined.is_ok(), "join rejected after can_join passed");
                        info!(room = %self.room(), fighter = %id, "fighter joined encounter");
                        Ok(())
                    }
                    Err(error) => Err((error, Box::new(fighter))),
                };
                if reply.send(result).is_err() {
                    debug!("Join reply channel closed (caller dropped)");
                }
            }
            EncounterCommand::Snapshot { fighter, reply } => {
                let snapshot = self
                    .encounter
                    .roster()
                    .get(fighter)
                    .map(|c| c.fighter.clone());
                if reply.send(snapshot).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
            EncounterCommand::View { reply } => {
                if reply.send(EncounterView::capture(&self.encounter)).is_err() {
                    debug!("View reply channel closed (caller dropped)");
                }
            }
            EncounterCommand::Stop => {
                info!(room = %self.room(), "encounter stopped from outside");
                self.encounter.stop();
            }
            EncounterCommand::Tick => {
                self.encounter.on_tick();
            }
            EncounterCommand::DefenseStep(fighter) => {
                if !self.encounter.defense_tick(fighter)
                    && let Some(handle) = self.countdowns.remove(&fighter)
                {
                    debug!(room = %self.room(), %fighter, "defense countdown finished");
                    handle.abort();
                }
            }
        }
    }

    /// Publishes pending notices and applies pending timer requests.
    fn flush(&mut self) {
        let room = self.room();
        let (notices, timers) = self.encounter.drain();
        for notice in notices {
            self.event_bus
                .publish(Event::Combat(CombatEvent { room, notice }));
        }
        for request in timers {
            self.apply_timer(request);
        }
    }

    fn apply_timer(&mut self, request: TimerRequest) {
        debug!(room = %self.room(), ?request, "timer request");
        match request {
            TimerRequest::StartTurnTicker => {
                if let Some(old) = self.ticker.take() {
                    old.abort();
                }
                self.ticker = Some(spawn_ticker(
                    self.command_tx.clone(),
                    self.timings.turn_tick,
                ));
            }
            TimerRequest::StopTurnTicker => {
                if let Some(ticker) = self.ticker.take() {
                    ticker.abort();
                }
            }
            TimerRequest::StartDefenseCountdown(fighter) => {
                let handle = spawn_countdown(
                    self.command_tx.clone(),
                    fighter,
                    self.timings.defense_step,
                );
                if let Some(old) = self.countdowns.insert(fighter, handle) {
                    old.abort();
                }
            }
            TimerRequest::CancelDefenseCountdown(fighter) => {
                if let Some(handle) = self.countdowns.remove(&fighter) {
                    handle.abort();
                }
            }
        }
    }

    /// Stops the clocks, turns away anything still queued, and hands the
    /// fighters back to the lobby.
    async fn finish(mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        for (_, handle) in self.countdowns.drain() {
            handle.abort();
        }

        self.command_rx.close();
        while let Some(cmd) = self.command_rx.recv().await {
            self.reject(cmd);
        }

        let room = self.room();
        let outcome = match self.encounter.phase() {
            Phase::Ended(outcome) => outcome,
            _ => EncounterOutcome::Stopped,
        };
        info!(%room, ?outcome, "encounter finished");
        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::EncounterEnded { room, outcome }));

        let fighters = self.encounter.into_fighters();
        let Some(lobby) = self.lobby_tx.upgrade() else {
            debug!(%room, "lobby gone, dropping {} fighters", fighters.len());
            return;
        };
        let finished = LobbyCommand::Finished {
            room,
            serial: self.serial,
            fighters,
        };
        if lobby.send(finished).await.is_err() {
            debug!(%room, "lobby closed before fighters were returned");
        }
    }

    /// Answers a command that arrived after the fight ended.
    fn reject(&self, cmd: EncounterCommand) {
        let over = || CommandError::Check(CheckError::NotInCombat);
        match cmd {
            EncounterCommand::Execute { reply, .. } => {
                let _ = reply.send(Err(over()));
            }
            EncounterCommand::Ally { reply, .. } => {
                let _ = reply.send(Err(over()));
            }
            EncounterCommand::Join { fighter, reply } => {
                let _ = reply.send(Err((EncounterError::NotActive, Box::new(fighter))));
            }
            EncounterCommand::Snapshot { fighter, reply } => {
                let snapshot = self
                    .encounter
                    .roster()
                    .get(fighter)
                    .map(|c| c.fighter.clone());
                let _ = reply.send(snapshot);
            }
            EncounterCommand::View { reply } => {
                let _ = reply.send(EncounterView::capture(&self.encounter));
            }
            EncounterCommand::Stop | EncounterCommand::Tick | EncounterCommand::DefenseStep(_) => {}
        }
    }
}
