//! Event-driven loop answering for provider-controlled fighters.
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use arena_core::{FighterId, PlayerCommand, RoomId};

use crate::api::{CommandProvider, RuntimeHandle};
use crate::events::{Event, LifecycleEvent, Topic};

/// Drives a set of fighters in one encounter through a [`CommandProvider`].
///
/// Every combat notice from the room is a chance for one of the fighters to
/// act: the autopilot takes a fresh view, asks the provider, and sends at
/// most one command. An accepted command produces new notices, which start
/// the next round.
pub struct Autopilot {
    handle: RuntimeHandle,
    room: RoomId,
    fighters: Vec<FighterId>,
    provider: Box<dyn CommandProvider>,
}

impl Autopilot {
    pub fn new(
        handle: RuntimeHandle,
        room: RoomId,
        fighters: Vec<FighterId>,
        provider: Box<dyn CommandProvider>,
    ) -> Self {
        Self {
            handle,
            room,
            fighters,
            provider,
        }
    }

    /// Runs until the encounter in the room ends or the runtime goes away.
    pub async fn run(self) {
        let mut combat = self.handle.subscribe(Topic::Combat);
        let mut lifecycle = self.handle.subscribe(Topic::Lifecycle);

        // The fight may have opened before we subscribed.
        if !self.act().await {
            return;
        }

        loop {
            tokio::select! {
                event = combat.recv() => match event {
                    Ok(Event::Combat(event)) if event.room == self.room => {
                        if !self.act().await {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(room = %self.room, skipped, "autopilot lagged behind combat events");
                        if !self.act().await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                },
                event = lifecycle.recv() => match event {
                    Ok(Event::Lifecycle(LifecycleEvent::EncounterEnded { room, .. }))
                        if room == self.room => break,
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                },
            }
        }
        debug!(room = %self.room, "autopilot finished");
    }

    /// Gives each fighter, in order, the chance to send one command. Stops
    /// at the first accepted command. Returns `false` once the encounter is
    /// gone.
    async fn act(&self) -> bool {
        let view = match self.handle.encounter_view(self.room).await {
            Ok(Some(view)) => view,
            Ok(None) => return false,
            Err(error) => {
                warn!(room = %self.room, %error, "autopilot could not read the encounter");
                return false;
            }
        };
        if !matches!(view.phase, arena_core::Phase::Active) {
            return false;
        }

        for &fighter in &self.fighters {
            let Some(command) = self.provider.next_command(fighter, &view).await else {
                continue;
            };
            let name = command.as_ref().to_owned();
            match self.handle.command(fighter, command).await {
                Ok(()) => return true,
                Err(error) => {
                    debug!(%fighter, command = %name, %error, "provider command rejected");
                    if view.is_turn_of(fighter) && name != "pass" {
                        let pass = PlayerCommand::Pass { message: None };
                        if self.handle.command(fighter, pass).await.is_ok() {
                            return true;
                        }
                    }
                }
            }
        }
        true
    }
}
