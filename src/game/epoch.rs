//! Epoch State Machine
//!
//! Owns the single bit of truth "which epoch is active" and keeps the four
//! tile layers' visibility and collision flags in sync with it. Toggling is
//! the time-travel operation; it always succeeds and is fully applied before
//! it returns, so the hazard checker can trust the flags immediately after.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::map::{LayerRole, LevelMap};

/// One of the two mutually exclusive world overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Epoch {
    /// The past overlay.
    Past = 0,
    /// The future overlay, where every session starts.
    Future = 1,
}

impl Epoch {
    /// The other epoch.
    pub fn other(self) -> Epoch {
        match self {
            Epoch::Past => Epoch::Future,
            Epoch::Future => Epoch::Past,
        }
    }
}

/// The time-travel manager: active epoch plus a monotone travel counter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EpochTimeline {
    active: Epoch,
    travels: u32,
}

impl EpochTimeline {
    /// The epoch a fresh session starts in.
    pub const DEFAULT_EPOCH: Epoch = Epoch::Future;

    /// Create a timeline in the default epoch with zero travels.
    pub fn new() -> Self {
        Self {
            active: Self::DEFAULT_EPOCH,
            travels: 0,
        }
    }

    /// The currently active epoch.
    pub fn current(&self) -> Epoch {
        self.active
    }

    /// Number of travels performed this session.
    pub fn travel_count(&self) -> u32 {
        self.travels
    }

    /// Flip the active epoch and synchronize all four layers before
    /// returning. Returns the new epoch and the updated travel counter.
    pub fn toggle(&mut self, map: &mut LevelMap) -> (Epoch, u32) {
        self.active = self.active.other();
        self.travels += 1;
        self.sync(map);
        debug!(epoch = ?self.active, travels = self.travels, "traveled");
        (self.active, self.travels)
    }

    /// Apply the active epoch to the map: the active epoch's Background and
    /// Principal layers become visible, its Principal layer collidable, and
    /// the other epoch's layers neither. Absent layers are skipped.
    pub fn sync(&self, map: &mut LevelMap) {
        for epoch in [Epoch::Past, Epoch::Future] {
            let active = epoch == self.active;
            for role in [LayerRole::Background, LayerRole::Principal] {
                if let Some(layer) = map.layer_mut(epoch, role) {
                    layer.visible = active;
                    layer.collision_enabled = active && role == LayerRole::Principal;
                }
            }
        }
    }

    /// Restore the default epoch and a zero counter, reapplying visibility.
    pub fn reset(&mut self, map: &mut LevelMap) {
        self.active = Self::DEFAULT_EPOCH;
        self.travels = 0;
        self.sync(map);
    }
}

impl Default for EpochTimeline {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
