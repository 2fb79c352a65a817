//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing: lobby requests go to the lobby
//! worker, and commands for fighters in a fight go straight to that fight's
//! encounter worker so separate encounters never wait on each other.
use tokio::sync::{broadcast, mpsc, oneshot};

use arena_core::{
    AllyOp, Fighter, FighterDirectory, FighterId, NoticeKind, PlayerCommand, RoomId,
};

use super::errors::{Result, RuntimeError};
use super::view::EncounterView;
use crate::events::{Event, EventBus, Topic};
use crate::oracle::FighterIndex;
use crate::workers::{EncounterCommand, EncounterLink, LobbyCommand};

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<LobbyCommand>,
    event_bus: EventBus,
    directory: FighterIndex,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<LobbyCommand>,
        event_bus: EventBus,
        directory: FighterIndex,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            directory,
        }
    }

    async fn lobby<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> LobbyCommand) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    async fn encounter<T>(
        &self,
        link: &EncounterLink,
        build: impl FnOnce(oneshot::Sender<T>) -> EncounterCommand,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        link.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::EncounterClosed { room: link.room })?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    async fn route(&self, fighter: FighterId) -> Result<Option<EncounterLink>> {
        self.lobby(|reply| LobbyCommand::Route { fighter, reply })
            .await?
    }

    /// Admit a fighter, standing in `room`. Stats and special moves are
    /// checked against the entry rules first.
    pub async fn register_fighter(&self, fighter: Fighter, room: RoomId) -> Result<()> {
        self.lobby(|reply| LobbyCommand::Register {
            fighter,
            room,
            reply,
        })
        .await?
    }

    /// Walk an idle fighter to another room.
    pub async fn move_fighter(&self, fighter: FighterId, room: RoomId) -> Result<()> {
        self.lobby(|reply| LobbyCommand::Move {
            fighter,
            room,
            reply,
        })
        .await?
    }

    /// Start a fight in `room` with every idle fighter there, or join the one
    /// already running.
    pub async fn fight(&self, room: RoomId, instigator: FighterId) -> Result<()> {
        self.lobby(|reply| LobbyCommand::Fight {
            room,
            instigator,
            reply,
        })
        .await?
    }

    /// Run a player command for a fighter who is in a fight.
    ///
    /// On rejection the error's `Display` text is the message for that
    /// fighter; nothing in the encounter changed.
    pub async fn command(&self, fighter: FighterId, command: PlayerCommand) -> Result<()> {
        let Some(link) = self.route(fighter).await? else {
            return Err(RuntimeError::Command(
                arena_core::CheckError::NotInCombat.into(),
            ));
        };
        match self
            .encounter(&link, |reply| EncounterCommand::Execute {
                fighter,
                command,
                reply,
            })
            .await
        {
            Ok(result) => Ok(result?),
            Err(RuntimeError::EncounterClosed { .. }) => Err(RuntimeError::Command(
                arena_core::CheckError::NotInCombat.into(),
            )),
            Err(error) => Err(error),
        }
    }

    /// Edit or list a fighter's allies, in or out of a fight.
    pub async fn ally(&self, fighter: FighterId, op: AllyOp) -> Result<NoticeKind> {
        if let Some(link) = self.route(fighter).await? {
            let sent = self
                .encounter(&link, |reply| EncounterCommand::Ally {
                    fighter,
                    op: op.clone(),
                    reply,
                })
                .await;
            match sent {
                Ok(result) => return Ok(result?),
                // The fight ended first; the lobby answers once the fighter is back.
                Err(RuntimeError::EncounterClosed { .. }) => {}
                Err(error) => return Err(error),
            }
        }
        self.lobby(|reply| LobbyCommand::Ally { fighter, op, reply })
            .await?
    }

    /// Restore HP and SP. Only outside a fight, in a recovery room.
    pub async fn rest(&self, fighter: FighterId) -> Result<()> {
        self.lobby(|reply| LobbyCommand::Rest { fighter, reply })
            .await?
    }

    /// Current persistent state of a fighter, wherever they are.
    pub async fn fighter(&self, fighter: FighterId) -> Result<Fighter> {
        if let Some(link) = self.route(fighter).await? {
            match self
                .encounter(&link, |reply| EncounterCommand::Snapshot { fighter, reply })
                .await
            {
                Ok(Some(snapshot)) => return Ok(snapshot),
                Ok(None) | Err(RuntimeError::EncounterClosed { .. }) => {}
                Err(error) => return Err(error),
            }
        }
        self.lobby(|reply| LobbyCommand::Fighter { fighter, reply })
            .await?
    }

    /// Snapshot of the encounter running in `room`, if any.
    pub async fn encounter_view(&self, room: RoomId) -> Result<Option<EncounterView>> {
        let Some(link) = self
            .lobby(|reply| LobbyCommand::Encounter { room, reply })
            .await?
        else {
            return Ok(None);
        };
        match self
            .encounter(&link, |reply| EncounterCommand::View { reply })
            .await
        {
            Ok(view) => Ok(Some(view)),
            Err(RuntimeError::EncounterClosed { .. }) => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Stop the encounter in `room` from outside the turn loop.
    pub async fn stop(&self, room: RoomId) -> Result<()> {
        let link = self
            .lobby(|reply| LobbyCommand::Encounter { room, reply })
            .await?;
        if let Some(link) = link
            && link.tx.send(EncounterCommand::Stop).await.is_err()
        {
            tracing::debug!(%room, "encounter closed before stop");
        }
        Ok(())
    }

    /// Resolve a typed name to a registered fighter.
    pub fn resolve(&self, name: &str) -> Option<FighterId> {
        self.directory.resolve(name)
    }

    /// Display name of a registered fighter.
    pub fn name_of(&self, fighter: FighterId) -> Option<String> {
        self.directory.name_of(fighter)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Combat` - Engine notices from every encounter
    /// - `Topic::Lifecycle` - Encounters starting and ending
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use arena_runtime::Topic;
    ///
    /// let mut combat_rx = handle.subscribe(Topic::Combat);
    /// while let Ok(event) = combat_rx.recv().await {
    ///     // Render notices
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Get the shared fighter directory
    pub fn directory(&self) -> &FighterIndex {
        &self.directory
    }
}
