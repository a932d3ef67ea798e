//! Epoch Gate Demo
//!
//! Builds a small level, runs a scripted session through the deterministic
//! simulation, prints the events, then replays the same recording and
//! verifies the outcome is identical.

use std::collections::BTreeMap;

use anyhow::{ensure, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use epoch_gate::core::rng::derive_session_seed;
use epoch_gate::game::epoch::Epoch;
use epoch_gate::game::events::GameEventData;
use epoch_gate::game::map::{LayerData, LayerRole, LevelData, MarkerData, TileProps};
use epoch_gate::game::tick::{replay_session, SessionConfig};
use epoch_gate::{InputFrame, InputRecording, TICK_RATE, VERSION};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Epoch Gate v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    demo_session()
}

fn demo_session() -> Result<()> {
    let level = demo_level();
    let seed = derive_session_seed(&level.name, 1);
    info!(level = %level.name, seed, "=== Starting Demo Session ===");

    let recording = scripted_inputs(&level.name, seed);
    let config = SessionConfig::default();

    let (state, events) = replay_session(&level, &recording, &config)?;

    for event in &events {
        match &event.data {
            GameEventData::EpochShifted { epoch, travels } => {
                info!(tick = event.tick, ?epoch, travels, "traveled");
            }
            GameEventData::KeySpawned { epoch, position } => {
                let (x, y) = position.to_floats();
                info!(tick = event.tick, ?epoch, "key waiting at ({:.1}, {:.1})", x, y);
            }
            GameEventData::KeyCollected { collected, required, .. } => {
                info!(tick = event.tick, "key collected ({}/{})", collected, required);
            }
            GameEventData::DoorUnlocked { .. } => {
                info!(tick = event.tick, "door unlocked");
            }
            GameEventData::PlayerDied { reason } => {
                info!(tick = event.tick, "{}", reason.message());
            }
            GameEventData::LevelCompleted { travels, .. } => {
                info!(tick = event.tick, travels, "level completed");
            }
        }
    }

    info!("=== Session Results ===");
    let (x, y) = state.player.position.to_floats();
    info!(
        tick = state.tick,
        epoch = ?state.current_epoch(),
        travels = state.travel_count(),
        keys = state.collected_count(),
        "final position ({:.1}, {:.1})",
        x,
        y
    );
    match state.report() {
        Some(report) => info!("{}", report.message),
        None => info!("session ran out of scripted input while still playing"),
    }
    info!("total events: {}", events.len());

    info!("=== Verifying Determinism ===");
    let (replayed, replay_events) = replay_session(&level, &recording, &config)?;
    ensure!(
        replayed.player.position == state.player.position
            && replayed.tick == state.tick
            && replay_events.len() == events.len(),
        "replay diverged from the original session"
    );
    info!("DETERMINISM VERIFIED: replay matches");
    Ok(())
}

/// Scripted inputs: wander right, travel, wander down, travel back.
fn scripted_inputs(level_name: &str, seed: u64) -> InputRecording {
    let mut recording = InputRecording::new(level_name, seed);
    recording.record(0, InputFrame::with_movement(127, InputFrame::NO_INPUT));
    recording.record(90, InputFrame::travel());
    recording.record(91, InputFrame::with_movement(InputFrame::NO_INPUT, 127));
    recording.record(180, InputFrame::travel());
    recording.record(181, InputFrame::with_movement(127, 127));
    recording.record(600, InputFrame::new());
    recording
}

/// A 12x8 level: solid border in both epochs, a lava pool in the Past, a
/// wall that only exists in the Future, door on the right edge.
fn demo_level() -> LevelData {
    const FLOOR: i64 = 1;
    const ROCK: i64 = 2;
    const LAVA: i64 = 3;
    const DOOR: i64 = 4;
    const W: usize = 12;
    const H: usize = 8;

    let mut tile_props = BTreeMap::new();
    tile_props.insert(1, TileProps::default());
    tile_props.insert(
        2,
        TileProps {
            collides: true,
            ..TileProps::default()
        },
    );
    tile_props.insert(
        3,
        TileProps {
            kills: true,
            death_type: Some("lava".to_string()),
            ..TileProps::default()
        },
    );
    tile_props.insert(
        4,
        TileProps {
            collides: true,
            ..TileProps::default()
        },
    );

    let mut bordered = vec![vec![-1i64; W]; H];
    for (r, row) in bordered.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            if r == 0 || r == H - 1 || c == 0 || c == W - 1 {
                *cell = ROCK;
            }
        }
    }
    // Door replaces a border cell on the right edge
    bordered[4][W - 1] = DOOR;

    let past_principal = bordered.clone();
    let mut future_principal = bordered;
    // A wall that only exists in the Future
    for r in 1..5 {
        future_principal[r][6] = ROCK;
    }

    let mut past_background = vec![vec![FLOOR; W]; H];
    // Lava pool in the Past
    past_background[5][3] = LAVA;
    past_background[5][4] = LAVA;

    let future_background = vec![vec![FLOOR; W]; H];

    let marker = |name: &str, kind: &str, epoch: Option<Epoch>, x: f64, y: f64| MarkerData {
        name: name.to_string(),
        kind: kind.to_string(),
        epoch,
        x,
        y,
    };

    LevelData {
        name: "demo-cavern".to_string(),
        width: W as u32,
        height: H as u32,
        required_keys: 1,
        door_open_tile: 9,
        tile_props,
        layers: vec![
            LayerData {
                epoch: Epoch::Past,
                role: LayerRole::Background,
                grid: past_background,
            },
            LayerData {
                epoch: Epoch::Past,
                role: LayerRole::Principal,
                grid: past_principal,
            },
            LayerData {
                epoch: Epoch::Future,
                role: LayerRole::Background,
                grid: future_background,
            },
            LayerData {
                epoch: Epoch::Future,
                role: LayerRole::Principal,
                grid: future_principal,
            },
        ],
        markers: vec![
            marker("player", "player", None, 24.0, 24.0),
            marker("door", "door", None, 184.0, 72.0),
            marker("spawn_key_1", "item", Some(Epoch::Past), 40.0, 104.0),
            marker("spawn_key_2", "item", Some(Epoch::Past), 136.0, 40.0),
            marker("spawn_key_3", "item", Some(Epoch::Future), 40.0, 104.0),
            marker("spawn_key_4", "item", Some(Epoch::Future), 168.0, 104.0),
        ],
    }
}
