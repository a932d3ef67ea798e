//! Shared test fixtures: a tiny 8x8 level with known geometry.
//!
//! Layout (tile coordinates, 16 world units per tile):
//! - Past principal: solid rock at (1,1), door at (6,6)
//! - Future principal: wall at (5,4), door at (6,6)
//! - Future background: lava at (2,1), floor everywhere else
//! - Past background: floor everywhere
//! - Player start (72,72); two key spawn candidates per epoch

use std::collections::BTreeMap;

use crate::core::vec2::FixedVec2;
use crate::game::epoch::Epoch;
use crate::game::map::{LayerData, LayerRole, LevelData, MarkerData, TileProps};
use crate::game::state::SessionState;

/// Plain floor, no properties.
pub const FLOOR_TILE: u32 = 1;
/// Colliding rock.
pub const SOLID_TILE: u32 = 2;
/// Lethal lava.
pub const LAVA_TILE: u32 = 3;
/// The closed door (colliding).
pub const DOOR_TILE: u32 = 4;
/// The open door visual.
pub const DOOR_OPEN_TILE: u32 = 9;

/// Center of the lava tile in the Future background.
pub const LAVA_POS: FixedVec2 = FixedVec2::from_ints(40, 24);
/// Open floor in both epochs, also the player start.
pub const SAFE_POS: FixedVec2 = FixedVec2::from_ints(72, 72);
/// Open in the Future, solid rock in the Past principal layer.
pub const WALL_POS: FixedVec2 = FixedVec2::from_ints(24, 24);
/// The door marker.
pub const DOOR_POS: FixedVec2 = FixedVec2::from_ints(104, 104);

fn filled(value: i64) -> Vec<Vec<i64>> {
    vec![vec![value; 8]; 8]
}

fn marker(name: &str, kind: &str, epoch: Option<Epoch>, x: f64, y: f64) -> MarkerData {
    MarkerData {
        name: name.to_string(),
        kind: kind.to_string(),
        epoch,
        x,
        y,
    }
}

/// The fixture level as asset data.
pub fn tiny_level_data() -> LevelData {
    let mut tile_props = BTreeMap::new();
    tile_props.insert(FLOOR_TILE, TileProps::default());
    tile_props.insert(
        SOLID_TILE,
        TileProps {
            collides: true,
            ..TileProps::default()
        },
    );
    tile_props.insert(
        LAVA_TILE,
        TileProps {
            kills: true,
            death_type: Some("lava".to_string()),
            ..TileProps::default()
        },
    );
    tile_props.insert(
        DOOR_TILE,
        TileProps {
            collides: true,
            ..TileProps::default()
        },
    );

    let past_background = filled(FLOOR_TILE as i64);

    let mut past_principal = filled(-1);
    past_principal[1][1] = SOLID_TILE as i64;
    past_principal[6][6] = DOOR_TILE as i64;

    let mut future_background = filled(FLOOR_TILE as i64);
    future_background[1][2] = LAVA_TILE as i64;

    let mut future_principal = filled(-1);
    future_principal[4][5] = SOLID_TILE as i64;
    future_principal[6][6] = DOOR_TILE as i64;

    LevelData {
        name: "tiny".to_string(),
        width: 8,
        height: 8,
        required_keys: 1,
        door_open_tile: DOOR_OPEN_TILE,
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
            marker("player", "player", None, 72.0, 72.0),
            marker("door", "door", None, 104.0, 104.0),
            marker("spawn_key_1", "item", Some(Epoch::Past), 24.0, 88.0),
            marker("spawn_key_2", "item", Some(Epoch::Past), 88.0, 24.0),
            marker("spawn_key_3", "item", Some(Epoch::Future), 40.0, 88.0),
            marker("spawn_key_4", "item", Some(Epoch::Future), 88.0, 40.0),
        ],
    }
}

/// A fresh session on the fixture level with a fixed seed.
pub fn tiny_session() -> SessionState {
    session_with_seed(42)
}

/// A fresh session on the fixture level with the given seed.
pub fn session_with_seed(seed: u64) -> SessionState {
    SessionState::new(&tiny_level_data(), seed).expect("fixture level is structurally valid")
}
