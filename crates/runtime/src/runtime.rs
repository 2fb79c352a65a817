//! High-level runtime orchestrator.
//!
//! The runtime owns the lobby worker, wires up command/event channels, and
//! exposes a builder-based API for clients to host fights.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use arena_core::{ArenaConfig, FighterId, RoomId, WorldOracle};

use crate::api::{CommandProvider, Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::oracle::FighterIndex;
use crate::providers::Autopilot;
use crate::workers::LobbyWorker;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub arena: ArenaConfig,
    /// Wall-clock length of one turn-timer tick.
    pub turn_tick: Duration,
    /// Wall-clock length of one defense countdown step.
    pub defense_step: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Base seed for every encounter's dice. Random when unset.
    pub seed: Option<u64>,
}

impl RuntimeConfig {
    pub const DEFAULT_TURN_TICK: Duration = Duration::from_secs(2);
    pub const DEFAULT_DEFENSE_STEP: Duration = Duration::from_secs(1);
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            turn_tick: Self::DEFAULT_TURN_TICK,
            defense_step: Self::DEFAULT_DEFENSE_STEP,
            event_buffer_size: 100,
            command_buffer_size: 32,
            seed: None,
        }
    }
}

/// Main runtime hosting every encounter
///
/// Design: Runtime owns the lobby worker, which in turn owns one worker per
/// running encounter. [`RuntimeHandle`] provides a cloneable façade for
/// clients.
pub struct Runtime {
    // Shared handle (can be cloned for clients)
    handle: RuntimeHandle,

    // Background workers
    lobby_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Answers turns and incoming attacks for `fighters` in `room` with
    /// `provider` until the encounter there ends.
    pub fn spawn_autopilot(
        &self,
        room: RoomId,
        fighters: Vec<FighterId>,
        provider: impl CommandProvider + 'static,
    ) -> JoinHandle<()> {
        let autopilot = Autopilot::new(self.handle(), room, fighters, Box::new(provider));
        tokio::spawn(autopilot.run())
    }

    /// Shutdown the runtime gracefully
    ///
    /// Running encounters are stopped once every other handle is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.lobby_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<Arc<dyn WorldOracle>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required world oracle
    pub fn world(mut self, world: impl WorldOracle + 'static) -> Self {
        self.world = Some(Arc::new(world));
        self
    }

    /// Fix the dice seed so runs can be replayed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the runtime and spawn the lobby worker
    pub async fn build(self) -> Result<Runtime> {
        let world = self.world.ok_or(RuntimeError::MissingWorld)?;
        let base_seed = self.config.seed.unwrap_or_else(rand::random);

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let directory = FighterIndex::new();
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);

        tracing::info!(
            base_seed,
            turn_tick_ms = self.config.turn_tick.as_millis() as u64,
            defense_step_ms = self.config.defense_step.as_millis() as u64,
            "starting arena runtime"
        );

        let worker = LobbyWorker::new(
            self.config,
            base_seed,
            world,
            directory.clone(),
            event_bus.clone(),
            command_rx,
            command_tx.downgrade(),
        );
        let lobby_worker_handle = tokio::spawn(worker.run());

        let handle = RuntimeHandle::new(command_tx, event_bus, directory);

        Ok(Runtime {
            handle,
            lobby_worker_handle,
        })
    }
}
