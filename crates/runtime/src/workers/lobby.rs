//! Lobby worker that owns every fighter not currently in a fight.
//!
//! Fighters are moved into an encounter worker when a fight starts or they
//! join one, and are handed back by that worker when the fight ends. While
//! they are away the lobby only remembers which room they fight in, so
//! commands can be routed to the right encounter.
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use arena_core::{
    AllyOp, Encounter, EncounterError, Fighter, FighterId, NoticeKind, PcgRng, RoomId, RoomInfo,
    WorldOracle, apply_ally, compute_seed,
};

use super::encounter::{EncounterWorker, Timings};
use super::{EncounterCommand, EncounterLink};
use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, LifecycleEvent};
use crate::oracle::FighterIndex;
use crate::runtime::RuntimeConfig;

/// Commands that can be sent to the lobby worker
pub(crate) enum LobbyCommand {
    /// Admit a new fighter into the world, standing in `room`.
    Register {
        fighter: Fighter,
        room: RoomId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Walk an idle fighter to another room.
    Move {
        fighter: FighterId,
        room: RoomId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Start a fight in `room`, or join the one already running there.
    Fight {
        room: RoomId,
        instigator: FighterId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Find the encounter a fighter is currently in.
    Route {
        fighter: FighterId,
        reply: oneshot::Sender<Result<Option<EncounterLink>>>,
    },
    /// Find the encounter running in a room.
    Encounter {
        room: RoomId,
        reply: oneshot::Sender<Option<EncounterLink>>,
    },
    Ally {
        fighter: FighterId,
        op: AllyOp,
        reply: oneshot::Sender<Result<NoticeKind>>,
    },
    Rest {
        fighter: FighterId,
        reply: oneshot::Sender<Result<()>>,
    },
    Fighter {
        fighter: FighterId,
        reply: oneshot::Sender<Result<Fighter>>,
    },
    /// An encounter worker handing its fighters back.
    Finished {
        room: RoomId,
        serial: u64,
        fighters: Vec<Fighter>,
    },
}

struct ActiveEncounter {
    link: EncounterLink,
    worker: JoinHandle<()>,
}

/// A lookup for a fighter whose encounter is closing, answered once the
/// encounter hands them back.
enum Deferred {
    Fighter {
        fighter: FighterId,
        reply: oneshot::Sender<Result<Fighter>>,
    },
    Ally {
        fighter: FighterId,
        op: AllyOp,
        reply: oneshot::Sender<Result<NoticeKind>>,
    },
}

impl Deferred {
    fn fighter(&self) -> FighterId {
        match self {
            Self::Fighter { fighter, .. } | Self::Ally { fighter, .. } => *fighter,
        }
    }
}

/// Background task that owns idle fighters and spawns encounters.
pub(crate) struct LobbyWorker {
    config: RuntimeConfig,
    base_seed: u64,
    world: Arc<dyn WorldOracle>,
    directory: FighterIndex,
    event_bus: EventBus,
    command_rx: mpsc::Receiver<LobbyCommand>,
    command_tx: mpsc::WeakSender<LobbyCommand>,
    /// Fighters not in any encounter.
    idle: BTreeMap<FighterId, Fighter>,
    /// Room each registered fighter stands in.
    locations: BTreeMap<FighterId, RoomId>,
    /// Room of the encounter each fighting fighter is in.
    engaged: BTreeMap<FighterId, RoomId>,
    encounters: HashMap<RoomId, ActiveEncounter>,
    /// Lookups waiting on a closing encounter's `Finished`.
    deferred: Vec<Deferred>,
    next_serial: u64,
}

impl LobbyWorker {
    pub(crate) fn new(
        config: RuntimeConfig,
        base_seed: u64,
        world: Arc<dyn WorldOracle>,
        directory: FighterIndex,
        event_bus: EventBus,
        command_rx: mpsc::Receiver<LobbyCommand>,
        command_tx: mpsc::WeakSender<LobbyCommand>,
    ) -> Self {
        Self {
            config,
            base_seed,
            world,
            directory,
            event_bus,
            command_rx,
            command_tx,
            idle: BTreeMap::new(),
            locations: BTreeMap::new(),
            engaged: BTreeMap::new(),
            encounters: HashMap::new(),
            deferred: Vec::new(),
            next_serial: 0,
        }
    }

    /// Main worker loop. Runs until every handle is dropped, then stops the
    /// encounters still running.
    pub(crate) async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        for (room, active) in self.encounters.drain() {
            if active.link.tx.send(EncounterCommand::Stop).await.is_err() {
                debug!(%room, "encounter already closed at shutdown");
            }
            if let Err(error) = active.worker.await {
                warn!(%room, %error, "encounter worker failed");
            }
        }
        info!("lobby worker stopped");
    }

    async fn handle_command(&mut self, cmd: LobbyCommand) {
        match cmd {
            LobbyCommand::Register {
                fighter,
                room,
                reply,
            } => {
                let result = self.register(fighter, room);
                if reply.send(result).is_err() {
                    debug!("Register reply channel closed (caller dropped)");
                }
            }
            LobbyCommand::Move {
                fighter,
                room,
                reply,
            } => {
                let result = self.move_to(fighter, room);
                if reply.send(result).is_err() {
                    debug!("Move reply channel closed (caller dropped)");
                }
            }
            LobbyCommand::Fight {
                room,
                instigator,
                reply,
            } => {
                let result = self.fight(room, instigator).await;
                if reply.send(result).is_err() {
                    debug!("Fight reply channel closed (caller dropped)");
                }
            }
            LobbyCommand::Route { fighter, reply } => {
                let result = self.route(fighter);
                if reply.send(result).is_err() {
                    debug!("Route reply channel closed (caller dropped)");
                }
            }
            LobbyCommand::Encounter { room, reply } => {
                let link = self.live_encounter(room).map(|active| active.link.clone());
                if reply.send(link).is_err() {
                    debug!("Encounter reply channel closed (caller dropped)");
                }
            }
            LobbyCommand::Ally { fighter, op, reply } => {
                self.lookup(Deferred::Ally { fighter, op, reply });
            }
            LobbyCommand::Rest { fighter, reply } => {
                let result = self.rest(fighter);
                if reply.send(result).is_err() {
                    debug!("Rest reply channel closed (caller dropped)");
                }
            }
            LobbyCommand::Fighter { fighter, reply } => {
                self.lookup(Deferred::Fighter { fighter, reply });
            }
            LobbyCommand::Finished {
                room,
                serial,
                fighters,
            } => self.finished(room, serial, fighters),
        }
    }

    // ========================================================================
    // Out-of-combat operations
    // ========================================================================

    fn register(&mut self, fighter: Fighter, room: RoomId) -> Result<()> {
        if self.locations.contains_key(&fighter.id) {
            return Err(RuntimeError::AlreadyRegistered {
                fighter: fighter.id,
            });
        }
        if self.directory.is_taken(&fighter.name) {
            return Err(RuntimeError::NameTaken {
                name: fighter.name.clone(),
            });
        }
        self.room_info(room)?;
        fighter.verify_for_entry()?;

        info!(fighter = %fighter.id, name = %fighter.name, %room, "fighter registered");
        self.directory.insert(fighter.id, fighter.name.clone());
        self.locations.insert(fighter.id, room);
        self.idle.insert(fighter.id, fighter);
        Ok(())
    }

    fn move_to(&mut self, fighter: FighterId, room: RoomId) -> Result<()> {
        self.idle_fighter(fighter)?;
        self.room_info(room)?;
        self.locations.insert(fighter, room);
        debug!(%fighter, %room, "fighter moved");
        Ok(())
    }

    fn ally(&mut self, fighter: FighterId, op: &AllyOp) -> Result<NoticeKind> {
        self.idle_fighter(fighter)?;
        let entry = self
            .idle
            .get_mut(&fighter)
            .ok_or(RuntimeError::UnknownFighter { fighter })?;
        Ok(apply_ally(entry, op, &self.directory)?)
    }

    fn rest(&mut self, fighter: FighterId) -> Result<()> {
        self.idle_fighter(fighter)?;
        let room = self
            .locations
            .get(&fighter)
            .copied()
            .ok_or(RuntimeError::UnknownFighter { fighter })?;
        if !self.room_info(room)?.recovery {
            return Err(RuntimeError::NoRecoveryHere { room });
        }
        if let Some(entry) = self.idle.get_mut(&fighter) {
            entry.recover();
            debug!(%fighter, %room, "fighter rested");
        }
        Ok(())
    }

    fn route(&self, fighter: FighterId) -> Result<Option<EncounterLink>> {
        if !self.locations.contains_key(&fighter) {
            return Err(RuntimeError::UnknownFighter { fighter });
        }
        Ok(self
            .engaged
            .get(&fighter)
            .and_then(|room| self.live_encounter(*room))
            .map(|active| active.link.clone()))
    }

    /// Whether `fighter` is in an encounter that no longer takes commands
    /// but has not handed its fighters back yet.
    fn returning(&self, fighter: FighterId) -> bool {
        self.engaged
            .get(&fighter)
            .and_then(|room| self.encounters.get(room))
            .is_some_and(|active| active.link.tx.is_closed())
    }

    /// Answer a fighter lookup now, or hold it until the fighter is back.
    fn lookup(&mut self, request: Deferred) {
        if self.returning(request.fighter()) {
            debug!(fighter = %request.fighter(), "lookup waits for fighter to return");
            self.deferred.push(request);
            return;
        }
        match request {
            Deferred::Fighter { fighter, reply } => {
                let result = self.idle_fighter(fighter).cloned();
                if reply.send(result).is_err() {
                    debug!("Fighter reply channel closed (caller dropped)");
                }
            }
            Deferred::Ally { fighter, op, reply } => {
                let result = self.ally(fighter, &op);
                if reply.send(result).is_err() {
                    debug!("Ally reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// An idle fighter, or why they are not available.
    fn idle_fighter(&self, fighter: FighterId) -> Result<&Fighter> {
        if self.engaged.contains_key(&fighter) {
            return Err(RuntimeError::InCombat { fighter });
        }
        self.idle
            .get(&fighter)
            .ok_or(RuntimeError::UnknownFighter { fighter })
    }

    fn room_info(&self, room: RoomId) -> Result<RoomInfo> {
        let mut info = self
            .world
            .room(room)
            .ok_or(RuntimeError::UnknownRoom { room })?;
        if info.size == 0 {
            info.size = self.config.arena.default_room_size;
        }
        Ok(info)
    }

    /// The encounter in `room`, unless it has already stopped taking
    /// commands.
    fn live_encounter(&self, room: RoomId) -> Option<&ActiveEncounter> {
        self.encounters
            .get(&room)
            .filter(|active| !active.link.tx.is_closed())
    }

    // ========================================================================
    // Encounters
    // ========================================================================

    async fn fight(&mut self, room: RoomId, instigator: FighterId) -> Result<()> {
        let info = self.room_info(room)?;
        self.idle_fighter(instigator)?;
        if self.locations.get(&instigator) != Some(&room) {
            return Err(RuntimeError::NotInRoom {
                fighter: instigator,
                room,
            });
        }

        if let Some(link) = self.live_encounter(room).map(|active| active.link.clone()) {
            return self.join(link, instigator).await;
        }
        self.start(info, instigator)
    }

    async fn join(&mut self, link: EncounterLink, fighter: FighterId) -> Result<()> {
        let Some(entry) = self.idle.remove(&fighter) else {
            return Err(RuntimeError::UnknownFighter { fighter });
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        if let Err(mpsc::error::SendError(cmd)) = link
            .tx
            .send(EncounterCommand::Join {
                fighter: entry,
                reply: reply_tx,
            })
            .await
        {
            if let EncounterCommand::Join { fighter: entry, .. } = cmd {
                self.idle.insert(fighter, entry);
            }
            return Err(RuntimeError::EncounterClosed { room: link.room });
        }

        match reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)? {
            Ok(()) => {
                self.engaged.insert(fighter, link.room);
                self.event_bus
                    .publish(Event::Lifecycle(LifecycleEvent::FighterJoined {
                        room: link.room,
                        fighter,
                    }));
                Ok(())
            }
            Err((error, entry)) => {
                self.idle.insert(fighter, *entry);
                Err(error.into())
            }
        }
    }

    fn start(&mut self, info: RoomInfo, instigator: FighterId) -> Result<()> {
        let room = info.id;
        if !info.combat_allowed {
            return Err(EncounterError::CombatNotAllowed.into());
        }

        // Instigator first, then everyone else idle in the room by id.
        let mut ids = vec![instigator];
        ids.extend(
            self.locations
                .iter()
                .filter(|(id, at)| **at == room && **id != instigator && self.idle.contains_key(*id))
                .map(|(id, _)| *id),
        );
        if ids.len() < 2 {
            return Err(EncounterError::NotEnoughFighters.into());
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        let seed = compute_seed(self.base_seed, serial, room.0, 0);
        let mut encounter = Encounter::new(
            info,
            self.config.arena.clone(),
            Box::new(PcgRng::seeded(seed)),
        );
        for id in &ids {
            if let Some(entry) = self.idle.remove(id)
                && let Err(error) = encounter.enlist(entry)
            {
                warn!(%room, fighter = %id, %error, "could not enlist fighter");
            }
        }

        if let Err(error) = encounter.start(instigator) {
            for entry in encounter.into_fighters() {
                self.idle.insert(entry.id, entry);
            }
            return Err(error.into());
        }

        let (tx, rx) = mpsc::channel(self.config.command_buffer_size);
        let link = EncounterLink {
            room,
            serial,
            tx: tx.clone(),
        };
        let worker = EncounterWorker::new(
            serial,
            encounter,
            self.directory.clone(),
            rx,
            tx.downgrade(),
            self.command_tx.clone(),
            self.event_bus.clone(),
            Timings {
                turn_tick: self.config.turn_tick,
                defense_step: self.config.defense_step,
            },
        );
        let worker = tokio::spawn(worker.run());

        for id in &ids {
            self.engaged.insert(*id, room);
        }
        if let Some(previous) = self.encounters.insert(room, ActiveEncounter { link, worker }) {
            debug!(%room, serial = previous.link.serial, "replacing finishing encounter");
        }

        info!(%room, serial, %instigator, fighters = ids.len(), "encounter started");
        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::EncounterStarted {
                room,
                fighters: ids,
            }));
        Ok(())
    }

    fn finished(&mut self, room: RoomId, serial: u64, fighters: Vec<Fighter>) {
        if self
            .encounters
            .get(&room)
            .is_some_and(|active| active.link.serial == serial)
        {
            self.encounters.remove(&room);
        }

        let ids: Vec<FighterId> = fighters.iter().map(|f| f.id).collect();
        for fighter in fighters {
            // Only clear the engagement this encounter made.
            if self.engaged.get(&fighter.id) == Some(&room) {
                self.engaged.remove(&fighter.id);
            }
            self.idle.insert(fighter.id, fighter);
        }

        for request in std::mem::take(&mut self.deferred) {
            self.lookup(request);
        }

        info!(%room, serial, fighters = ids.len(), "fighters returned to lobby");
        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::FightersReturned {
                room,
                fighters: ids,
            }));
    }
}
