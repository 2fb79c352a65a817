//! Arena demonstration client.
//!
//! Loads arena content, registers the roster with a fresh runtime, and lets
//! bots fight out one encounter while the transcript streams to stdout.
//!
//! # Examples
//!
//! ```bash
//! # Replayable run in the "Pit" room with faster turns
//! ARENA_ROOM=Pit ARENA_SEED=7 ARENA_TICK_MS=200 cargo run -p arena-cli
//!
//! # Machine-readable event stream
//! ARENA_JSON_EVENTS=1 cargo run -p arena-cli
//! ```
mod config;
mod logging;
mod render;

use std::path::Path;

use anyhow::{Context, Result, bail};
use arena_content::{ConfigLoader, RoomLoader, RosterLoader};
use arena_core::{ArenaConfig, FighterId, RoomInfo};
use arena_runtime::{
    BotProvider, Event, LifecycleEvent, RoomTable, Runtime, RuntimeConfig, Topic,
};
use tokio::sync::broadcast::error::RecvError;

use config::CliConfig;
use render::Transcript;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();
    let _guard = logging::setup_logging(&config.log_dir())?;

    let result = run(config).await;
    if let Err(error) = &result {
        tracing::error!("Arena run failed: {:#}", error);
    }
    result
}

async fn run(config: CliConfig) -> Result<()> {
    // 1. Content
    let arena = load_arena_config(&config.config_path())?;
    let rooms_path = config.rooms_path();
    let rooms = RoomLoader::load(&rooms_path)
        .with_context(|| format!("loading rooms from {}", rooms_path.display()))?;
    let roster_path = config.roster_path();
    let roster = RosterLoader::load(&roster_path)
        .with_context(|| format!("loading roster from {}", roster_path.display()))?;
    let room = pick_room(config.room.as_deref(), &rooms)?;

    tracing::info!(
        rooms = rooms.len(),
        fighters = roster.len(),
        room = %room.id,
        "content loaded"
    );

    // 2. Runtime
    let runtime_config = RuntimeConfig {
        arena,
        turn_tick: config.turn_tick,
        defense_step: config.defense_step,
        seed: config.seed,
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder()
        .config(runtime_config)
        .world(RoomTable::new(rooms))
        .build()
        .await?;
    let handle = runtime.handle();

    // 3. Roster
    let mut names = Vec::new();
    let mut contenders: Vec<FighterId> = Vec::new();
    for entry in roster {
        let id = entry.fighter.id;
        let name = entry.fighter.name.clone();
        match handle.register_fighter(entry.fighter, entry.room).await {
            Ok(()) => {
                if entry.room == room.id {
                    contenders.push(id);
                }
                names.push((id, name));
            }
            Err(error) => {
                tracing::warn!(fighter = %id, %error, "fighter turned away");
                println!("{name} can't enter the arena: {error}");
            }
        }
    }
    let Some(&instigator) = contenders.first() else {
        bail!("No fighters start in {}", room.name);
    };
    let transcript = Transcript::new(names);

    // 4. Fight
    let mut combat = handle.subscribe(Topic::Combat);
    let mut lifecycle = handle.subscribe(Topic::Lifecycle);
    handle.fight(room.id, instigator).await?;
    let autopilot = runtime.spawn_autopilot(
        room.id,
        contenders.clone(),
        config.seed.map(BotProvider::new).unwrap_or_default(),
    );

    println!("== {} ==", room.name);
    loop {
        tokio::select! {
            event = combat.recv() => match event {
                Ok(Event::Combat(event)) if event.room == room.id => {
                    if config.json_events {
                        println!("{}", serde_json::to_string(&Event::Combat(event))?);
                    } else {
                        println!("{}", transcript.line(&event));
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "transcript lagged behind combat events");
                }
                Err(RecvError::Closed) => break,
            },
            event = lifecycle.recv() => match event {
                Ok(Event::Lifecycle(event)) if event.room() == room.id => {
                    if config.json_events {
                        println!("{}", serde_json::to_string(&Event::Lifecycle(event.clone()))?);
                    }
                    if matches!(event, LifecycleEvent::FightersReturned { .. }) {
                        break;
                    }
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    // Late combat notices are still buffered; the transcript is complete
    // once both receivers are drained.
    while let Ok(Event::Combat(event)) = combat.try_recv() {
        if event.room == room.id && !config.json_events {
            println!("{}", transcript.line(&event));
        }
    }

    if !config.json_events {
        println!("== Results ==");
        for id in &contenders {
            let fighter = handle.fighter(*id).await?;
            let max = fighter.maximums();
            println!(
                "{}: HP {}/{}  SP {}/{}",
                fighter.name,
                fighter.hp(),
                max.hp_max,
                fighter.sp(),
                max.sp_max
            );
        }
    }

    autopilot.await.context("autopilot task failed")?;
    drop(handle);
    runtime.shutdown().await?;
    tracing::info!("Arena run complete");
    Ok(())
}

/// Arena tuning is optional; without a file the defaults apply.
fn load_arena_config(path: &Path) -> Result<ArenaConfig> {
    if !path.exists() {
        tracing::info!("No arena config at {}, using defaults", path.display());
        return Ok(ArenaConfig::default());
    }
    ConfigLoader::load(path).with_context(|| format!("loading arena config from {}", path.display()))
}

/// Resolves `query` as a room id, then as a case-insensitive name. Without
/// a query the first room that allows combat is used.
fn pick_room(query: Option<&str>, rooms: &[RoomInfo]) -> Result<RoomInfo> {
    let found = match query.map(str::trim) {
        Some(query) => match query.parse::<u32>() {
            Ok(id) => rooms.iter().find(|room| room.id.0 == id),
            Err(_) => rooms
                .iter()
                .find(|room| room.name.eq_ignore_ascii_case(query)),
        },
        None => rooms.iter().find(|room| room.combat_allowed),
    };
    match (found, query) {
        (Some(room), _) => Ok(room.clone()),
        (None, Some(query)) => bail!("Unknown room: {}", query),
        (None, None) => bail!("No room allows combat"),
    }
}
