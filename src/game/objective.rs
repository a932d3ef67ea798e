//! Objective Controller
//!
//! Key spawning and door gating. The key's hiding place - one epoch, one
//! spawn marker inside it - is rolled lazily on first use and then held for
//! the whole session. Collecting every required key rewrites the door tile
//! open; walking into the open door completes the level exactly once.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::fixed::{DOOR_PROXIMITY, KEY_PICKUP_RADIUS};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::FixedVec2;
use crate::game::epoch::Epoch;
use crate::game::events::GameEvent;
use crate::game::map::{LayerRole, LevelMap};
use crate::game::state::{SessionOutcome, SessionState};

/// Where the key is hidden, fixed for the whole session once rolled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPlacement {
    /// Epoch the key exists in.
    pub epoch: Epoch,
    /// World position of the chosen spawn marker.
    pub position: FixedVec2,
}

/// Objective progress for one session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectiveState {
    /// The session's hiding place. `None` until first resolved.
    chosen: Option<KeyPlacement>,
    /// Keys collected so far.
    pub collected: u32,
    /// Keys required to unlock the door.
    pub required: u32,
    /// Has the door been rewritten open?
    pub door_unlocked: bool,
    /// Door marker position, read once at level load.
    pub door_position: Option<FixedVec2>,
    /// The key instance currently present in the world, if any.
    pub spawned: Option<FixedVec2>,
    /// Level-complete latch; set exactly once.
    completed: bool,
}

impl ObjectiveState {
    /// Create objective state from level data.
    pub fn new(required: u32, door_position: Option<FixedVec2>) -> Self {
        Self {
            chosen: None,
            collected: 0,
            required,
            door_unlocked: false,
            door_position,
            spawned: None,
            completed: false,
        }
    }

    /// The session's key placement, if already rolled.
    pub fn placement(&self) -> Option<KeyPlacement> {
        self.chosen
    }

    /// Has the level been completed?
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Roll the hiding place if it has not been rolled yet.
    ///
    /// The epoch is chosen 50/50 regardless of how many markers each epoch
    /// has; then one marker is chosen uniformly within that epoch. A chosen
    /// epoch with no markers leaves the objective unresolved - the level is
    /// unsolvable this session, which validation already warned about.
    fn resolve_placement(&mut self, rng: &mut DeterministicRng, map: &LevelMap) {
        if self.chosen.is_some() {
            return;
        }

        let epoch = if rng.next_int(2) == 0 {
            Epoch::Past
        } else {
            Epoch::Future
        };

        let markers = map.spawn_markers(epoch);
        match rng.choose(markers) {
            Some(&position) => {
                debug!(?epoch, ?position, "key placement resolved");
                self.chosen = Some(KeyPlacement { epoch, position });
            }
            None => {
                warn!(?epoch, "chosen epoch has no key spawn markers");
            }
        }
    }
}

/// Despawn any current key instance and spawn one at the hiding place iff
/// the given epoch matches it and keys are still needed.
///
/// Called once at session start and after every toggle.
pub fn refresh_for_epoch(state: &mut SessionState, epoch: Epoch) {
    state.objective.spawned = None;

    // Lazy roll: spawn markers only exist once geometry load completed
    let (objective, rng, map) = state.objective_parts();
    objective.resolve_placement(rng, map);

    let Some(placement) = state.objective.chosen else {
        return;
    };
    if state.objective.collected >= state.objective.required {
        return;
    }
    if epoch != placement.epoch {
        debug!(key_epoch = ?placement.epoch, active = ?epoch, "key is in the other epoch");
        return;
    }

    state.objective.spawned = Some(placement.position);
    let event = GameEvent::key_spawned(state.tick, placement.epoch, placement.position);
    state.push_event(event);
}

/// Collect the spawned key if the player overlaps it.
pub fn try_collect(state: &mut SessionState) {
    if !state.player.alive {
        return;
    }
    let Some(key_pos) = state.objective.spawned else {
        return;
    };

    let reach_sq = KEY_PICKUP_RADIUS as i64 * KEY_PICKUP_RADIUS as i64;
    if state.player.position.distance_squared_wide(key_pos) > reach_sq {
        return;
    }

    state.objective.spawned = None;
    state.objective.collected += 1;

    info!(
        collected = state.objective.collected,
        required = state.objective.required,
        "key collected"
    );
    let event = GameEvent::key_collected(
        state.tick,
        state.objective.collected,
        state.objective.required,
        key_pos,
    );
    state.push_event(event);

    if state.objective.collected >= state.objective.required {
        unlock_door(state);
    }
}

/// Rewrite the door tile open and record the unlock.
///
/// The rewrite goes to both epochs' principal layers so the open door is
/// consistent across travel. Idempotent at every level: the tile rewrite is
/// a no-op on repeat and the unlock flag is a latch.
pub fn unlock_door(state: &mut SessionState) {
    if state.objective.door_unlocked {
        return;
    }
    let Some(door_pos) = state.objective.door_position else {
        // Data-integrity condition reported at load; nothing to open
        warn!("all keys collected but the level has no door");
        return;
    };

    let open_tile = state.map.door_open_tile;
    for epoch in [Epoch::Past, Epoch::Future] {
        state
            .map
            .rewrite_tile(epoch, LayerRole::Principal, door_pos, open_tile);
    }
    state.objective.door_unlocked = true;

    info!(?door_pos, "door unlocked");
    let event = GameEvent::door_unlocked(state.tick, door_pos);
    state.push_event(event);
}

/// Complete the level if the player stands close enough to the unlocked
/// door. Edge-triggered: fires exactly once per session no matter how long
/// the player lingers in the doorway.
pub fn check_door_entry(state: &mut SessionState) {
    if !state.player.alive || state.objective.completed || !state.objective.door_unlocked {
        return;
    }
    let Some(door_pos) = state.objective.door_position else {
        return;
    };

    let threshold_sq = DOOR_PROXIMITY as i64 * DOOR_PROXIMITY as i64;
    if state.player.position.distance_squared_wide(door_pos) >= threshold_sq {
        return;
    }

    state.objective.completed = true;
    let travels = state.timeline.travel_count();
    info!(travels, tick = state.tick, "level completed");
    let event = GameEvent::level_completed(state.tick, travels);
    state.push_event(event);
    state.begin_closing(SessionOutcome::Completed);
}

// =============================================================================
// TESTS
// =============================================================================
