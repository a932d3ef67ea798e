//! Level Geometry Store
//!
//! Loads and exposes the four tile layers (one Background + Principal pair
//! per epoch), the map-authored markers, and the single runtime geometry
//! mutation: rewriting the door tile to its open visual.
//!
//! The backing asset format is a serde document ([`LevelData`]); converting
//! from whatever tile-map editor produced it is the caller's concern. Layers
//! and markers may be absent from the asset - that is a data-integrity
//! condition reported at load time, never a crash.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::fixed::{to_fixed, world_to_tile};
use crate::core::vec2::FixedVec2;
use crate::game::epoch::Epoch;

// =============================================================================
// TILES
// =============================================================================

/// Role of a tile layer within its epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    /// Decorative layer. Never collidable, but still hazard-checkable.
    Background,
    /// The collidable layer of an epoch.
    Principal,
}

/// How a lethal tile kills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeathKind {
    /// Drowning.
    Water,
    /// Burning.
    Lava,
    /// Impalement.
    Spikes,
}

impl DeathKind {
    /// Parse the `deathType` custom property from the map asset.
    pub fn from_property(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "water" => Some(DeathKind::Water),
            "lava" => Some(DeathKind::Lava),
            "spikes" => Some(DeathKind::Spikes),
            _ => None,
        }
    }
}

/// A single occupied cell of a tile layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Visual index into the tileset.
    pub id: u32,
    /// Player movement is blocked by this tile.
    pub collides: bool,
    /// Standing on this tile kills the player.
    pub kills: bool,
    /// How it kills. `None` with `kills` set falls back to a generic message.
    pub death_kind: Option<DeathKind>,
}

/// One (epoch, role) grid of tiles.
///
/// The grid is immutable after load except for the door rewrite. The
/// `visible`/`collision_enabled` flags are runtime activation state owned by
/// the epoch timeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileLayer {
    /// Epoch this layer belongs to.
    pub epoch: Epoch,
    /// Background or Principal.
    pub role: LayerRole,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Row-major cells; `None` is an empty cell.
    cells: Vec<Option<Tile>>,
    /// Should a renderer draw this layer right now?
    pub visible: bool,
    /// Does movement resolve against this layer right now?
    pub collision_enabled: bool,
}

impl TileLayer {
    /// Look up a tile by integer tile coordinates. Out of bounds is `None`.
    pub fn tile_at(&self, col: i32, row: i32) -> Option<&Tile> {
        if col < 0 || row < 0 || col as u32 >= self.width || row as u32 >= self.height {
            return None;
        }
        self.cells[(row as u32 * self.width + col as u32) as usize].as_ref()
    }

    /// Look up the tile under a continuous world position.
    pub fn tile_at_world(&self, pos: FixedVec2) -> Option<&Tile> {
        self.tile_at(world_to_tile(pos.x), world_to_tile(pos.y))
    }

    fn cell_mut(&mut self, col: i32, row: i32) -> Option<&mut Option<Tile>> {
        if col < 0 || row < 0 || col as u32 >= self.width || row as u32 >= self.height {
            return None;
        }
        Some(&mut self.cells[(row as u32 * self.width + col as u32) as usize])
    }
}

// =============================================================================
// LEVEL DATA (asset-side representation)
// =============================================================================

/// Custom properties of a tileset entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TileProps {
    /// `collides` custom property.
    #[serde(default)]
    pub collides: bool,
    /// `kills` custom property.
    #[serde(default)]
    pub kills: bool,
    /// `deathType` custom property (`water`, `lava`, `spikes`).
    #[serde(default)]
    pub death_type: Option<String>,
}

/// One tile layer as authored in the map asset. `-1` cells are empty.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayerData {
    /// Epoch the layer belongs to.
    pub epoch: Epoch,
    /// Background or Principal.
    pub role: LayerRole,
    /// Row-major grid of tileset indices, `-1` for empty.
    pub grid: Vec<Vec<i64>>,
}

/// A map-authored object: key spawn candidate, door, or player start.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarkerData {
    /// Object name (e.g. `spawn_key_3`, `door`).
    #[serde(default)]
    pub name: String,
    /// Object type (e.g. `item`, `door`, `player`).
    #[serde(default)]
    pub kind: String,
    /// Epoch the marker is scoped to. Required for key spawn markers.
    #[serde(default)]
    pub epoch: Option<Epoch>,
    /// World-space X in map units.
    pub x: f64,
    /// World-space Y in map units.
    pub y: f64,
}

impl MarkerData {
    fn is_key_spawn(&self) -> bool {
        self.kind == "item" || self.name.contains("spawn_key")
    }

    fn is_door(&self) -> bool {
        self.kind == "door" || self.name == "door"
    }

    fn is_player_start(&self) -> bool {
        self.kind == "player" || self.name == "player"
    }

    fn position(&self) -> FixedVec2 {
        FixedVec2::new(to_fixed(self.x), to_fixed(self.y))
    }
}

/// The complete level asset, as deserialized from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelData {
    /// Level name, also mixed into the session seed.
    pub name: String,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Keys the player must collect before the door unlocks.
    #[serde(default = "default_required_keys")]
    pub required_keys: u32,
    /// Tileset index the door cell is rewritten to when unlocked.
    pub door_open_tile: u32,
    /// Custom properties per tileset index (sorted map for determinism).
    #[serde(default)]
    pub tile_props: BTreeMap<u32, TileProps>,
    /// The authored tile layers.
    pub layers: Vec<LayerData>,
    /// The authored object markers.
    #[serde(default)]
    pub markers: Vec<MarkerData>,
}

fn default_required_keys() -> u32 {
    1
}

// =============================================================================
// ERRORS & VALIDATION
// =============================================================================

/// Structural failures in the level asset. These are load-time errors;
/// everything softer is a [`ValidationReport`] finding.
#[derive(Debug, Error)]
pub enum LevelError {
    /// Level dimensions are zero.
    #[error("level '{0}' has zero width or height")]
    ZeroDimensions(String),

    /// A layer grid does not match the declared dimensions.
    #[error("layer ({epoch:?}, {role:?}) row {row} has {found} cells, expected {expected}")]
    GridShape {
        epoch: Epoch,
        role: LayerRole,
        row: usize,
        expected: u32,
        found: usize,
    },

    /// Two layers claim the same (epoch, role) slot.
    #[error("duplicate layer for ({epoch:?}, {role:?})")]
    DuplicateLayer { epoch: Epoch, role: LayerRole },
}

/// Soft data-integrity findings from the load-time validation pass.
///
/// A level with findings still loads and runs; it may just be unsolvable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// (epoch, role) slots with no authored layer.
    pub missing_layers: Vec<(Epoch, LayerRole)>,
    /// No door marker was found; the level cannot be completed.
    pub missing_door: bool,
    /// No player start marker; the fallback spawn is used.
    pub missing_player_spawn: bool,
    /// Key spawn markers found in the Past.
    pub past_spawn_markers: usize,
    /// Key spawn markers found in the Future.
    pub future_spawn_markers: usize,
}

impl ValidationReport {
    /// True when the objective can always be reached: a door exists and both
    /// epochs offer at least one key spawn candidate (the epoch roll is
    /// 50/50, so one empty epoch makes half of all sessions unsolvable).
    pub fn fully_solvable(&self) -> bool {
        !self.missing_door && self.past_spawn_markers > 0 && self.future_spawn_markers > 0
    }
}

// =============================================================================
// LEVEL MAP
// =============================================================================

/// The loaded level: four optional tile layers plus marker data.
#[derive(Clone, Debug)]
pub struct LevelMap {
    /// Level name from the asset.
    pub name: String,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Keys required to unlock the door.
    pub required_keys: u32,
    /// Tileset index for the open door visual.
    pub door_open_tile: u32,
    /// Layer slots indexed by [`layer_index`]. Absent layers stay `None`.
    layers: [Option<TileLayer>; 4],
    /// Key spawn candidates, indexed by epoch.
    spawn_markers: [Vec<FixedVec2>; 2],
    /// Door marker position, if authored.
    pub door_position: Option<FixedVec2>,
    /// Player start marker, if authored.
    pub player_spawn: Option<FixedVec2>,
    report: ValidationReport,
}

fn layer_index(epoch: Epoch, role: LayerRole) -> usize {
    let e = match epoch {
        Epoch::Past => 0,
        Epoch::Future => 1,
    };
    let r = match role {
        LayerRole::Background => 0,
        LayerRole::Principal => 1,
    };
    e * 2 + r
}

impl LevelMap {
    /// Build the level from its asset, running the validation pass.
    ///
    /// Structural problems are errors; missing layers and markers are logged
    /// and recorded in the [`ValidationReport`].
    pub fn from_data(data: &LevelData) -> Result<Self, LevelError> {
        if data.width == 0 || data.height == 0 {
            return Err(LevelError::ZeroDimensions(data.name.clone()));
        }

        let mut layers: [Option<TileLayer>; 4] = [None, None, None, None];

        for layer_data in &data.layers {
            let idx = layer_index(layer_data.epoch, layer_data.role);
            if layers[idx].is_some() {
                return Err(LevelError::DuplicateLayer {
                    epoch: layer_data.epoch,
                    role: layer_data.role,
                });
            }
            layers[idx] = Some(build_layer(data, layer_data)?);
        }

        let mut spawn_markers: [Vec<FixedVec2>; 2] = [Vec::new(), Vec::new()];
        let mut door_position = None;
        let mut player_spawn = None;

        for marker in &data.markers {
            if marker.is_key_spawn() {
                match marker.epoch {
                    Some(epoch) => spawn_markers[epoch as usize].push(marker.position()),
                    None => warn!(
                        level = %data.name,
                        marker = %marker.name,
                        "key spawn marker without an epoch, ignoring"
                    ),
                }
            } else if marker.is_door() {
                door_position = Some(marker.position());
            } else if marker.is_player_start() {
                player_spawn = Some(marker.position());
            }
        }

        let mut report = ValidationReport {
            missing_door: door_position.is_none(),
            missing_player_spawn: player_spawn.is_none(),
            past_spawn_markers: spawn_markers[Epoch::Past as usize].len(),
            future_spawn_markers: spawn_markers[Epoch::Future as usize].len(),
            ..ValidationReport::default()
        };

        for epoch in [Epoch::Past, Epoch::Future] {
            for role in [LayerRole::Background, LayerRole::Principal] {
                if layers[layer_index(epoch, role)].is_none() {
                    warn!(level = %data.name, ?epoch, ?role, "tile layer missing from asset");
                    report.missing_layers.push((epoch, role));
                }
            }
        }
        if report.missing_door {
            warn!(level = %data.name, "no door marker, level cannot be completed");
        }
        if report.past_spawn_markers == 0 || report.future_spawn_markers == 0 {
            warn!(
                level = %data.name,
                past = report.past_spawn_markers,
                future = report.future_spawn_markers,
                "an epoch has no key spawn markers"
            );
        }

        Ok(Self {
            name: data.name.clone(),
            width: data.width,
            height: data.height,
            required_keys: data.required_keys,
            door_open_tile: data.door_open_tile,
            layers,
            spawn_markers,
            door_position,
            player_spawn,
            report,
        })
    }

    /// The load-time validation findings.
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Borrow a layer slot. `None` when the asset did not author it.
    pub fn layer(&self, epoch: Epoch, role: LayerRole) -> Option<&TileLayer> {
        self.layers[layer_index(epoch, role)].as_ref()
    }

    /// Mutably borrow a layer slot.
    pub fn layer_mut(&mut self, epoch: Epoch, role: LayerRole) -> Option<&mut TileLayer> {
        self.layers[layer_index(epoch, role)].as_mut()
    }

    /// Tile under a world position in the given layer. Out-of-bounds lookups
    /// and absent layers are `None`, never an error.
    pub fn tile_at(&self, epoch: Epoch, role: LayerRole, pos: FixedVec2) -> Option<&Tile> {
        self.layer(epoch, role)?.tile_at_world(pos)
    }

    /// Key spawn candidates authored for an epoch.
    pub fn spawn_markers(&self, epoch: Epoch) -> &[FixedVec2] {
        &self.spawn_markers[epoch as usize]
    }

    /// True if any collision-enabled layer has a solid tile under `pos`.
    pub fn solid_at(&self, pos: FixedVec2) -> bool {
        self.layers.iter().flatten().any(|layer| {
            layer.collision_enabled
                && layer.tile_at_world(pos).is_some_and(|tile| tile.collides)
        })
    }

    /// Rewrite the cell under `pos` to `new_tile_id`.
    ///
    /// This is the door-opening mutation and the only runtime geometry write.
    /// The rewritten cell is non-colliding and non-lethal. Idempotent:
    /// rewriting a cell that already carries `new_tile_id` is a no-op, as is
    /// targeting an absent layer or an out-of-bounds position.
    pub fn rewrite_tile(&mut self, epoch: Epoch, role: LayerRole, pos: FixedVec2, new_tile_id: u32) {
        let col = world_to_tile(pos.x);
        let row = world_to_tile(pos.y);
        let Some(layer) = self.layer_mut(epoch, role) else {
            return;
        };
        let Some(cell) = layer.cell_mut(col, row) else {
            return;
        };
        if cell.as_ref().is_some_and(|tile| tile.id == new_tile_id) {
            return;
        }
        *cell = Some(Tile {
            id: new_tile_id,
            collides: false,
            kills: false,
            death_kind: None,
        });
    }
}

fn build_layer(data: &LevelData, layer_data: &LayerData) -> Result<TileLayer, LevelError> {
    if layer_data.grid.len() != data.height as usize {
        return Err(LevelError::GridShape {
            epoch: layer_data.epoch,
            role: layer_data.role,
            row: layer_data.grid.len(),
            expected: data.width,
            found: 0,
        });
    }

    let mut cells = Vec::with_capacity((data.width * data.height) as usize);

    for (row_idx, row) in layer_data.grid.iter().enumerate() {
        if row.len() != data.width as usize {
            return Err(LevelError::GridShape {
                epoch: layer_data.epoch,
                role: layer_data.role,
                row: row_idx,
                expected: data.width,
                found: row.len(),
            });
        }
        for &raw in row {
            cells.push(if raw < 0 {
                None
            } else {
                Some(tile_from_id(data, raw as u32))
            });
        }
    }

    Ok(TileLayer {
        epoch: layer_data.epoch,
        role: layer_data.role,
        width: data.width,
        height: data.height,
        cells,
        visible: false,
        collision_enabled: false,
    })
}

fn tile_from_id(data: &LevelData, id: u32) -> Tile {
    let props = data.tile_props.get(&id);
    Tile {
        id,
        collides: props.is_some_and(|p| p.collides),
        kills: props.is_some_and(|p| p.kills),
        death_kind: props
            .and_then(|p| p.death_type.as_deref())
            .and_then(DeathKind::from_property),
    }
}

// =============================================================================
// TESTS
// =============================================================================
