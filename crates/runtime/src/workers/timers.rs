//! Clock tasks fulfilling the engine's timer requests.
//!
//! Each task holds only a weak sender, so it never keeps an encounter's
//! channel open by itself, and stops on its own once the encounter worker is
//! gone. Cancellation is done by aborting the returned handle.
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use arena_core::FighterId;

use super::EncounterCommand;

/// Sends [`EncounterCommand::Tick`] every `period`, first after one period.
pub(super) fn spawn_ticker(
    tx: mpsc::WeakSender<EncounterCommand>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let Some(tx) = tx.upgrade() else { break };
            if tx.send(EncounterCommand::Tick).await.is_err() {
                break;
            }
        }
    })
}

/// Sends [`EncounterCommand::DefenseStep`] for `fighter` every `step` until
/// aborted. The engine counts the steps and decides when to stop.
pub(super) fn spawn_countdown(
    tx: mpsc::WeakSender<EncounterCommand>,
    fighter: FighterId,
    step: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            time::sleep(step).await;
            let Some(tx) = tx.upgrade() else { break };
            if tx.send(EncounterCommand::DefenseStep(fighter)).await.is_err() {
                break;
            }
        }
    })
}
