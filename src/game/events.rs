//! Session Events
//!
//! Events generated during simulation, consumed by the surrounding scene/UI
//! layer to drive screens, sounds, and the end-of-level report.

use serde::{Deserialize, Serialize};

use crate::core::vec2::FixedVec2;
use crate::game::epoch::Epoch;
use crate::game::hazard::DeathReason;

/// Priority for event processing order. Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Death ends everything else, so it goes first
    PlayerDeath = 0,
    /// Then pickups
    KeyCollection = 1,
    /// Then door state changes
    DoorUnlock = 2,
    /// Then epoch bookkeeping
    EpochShift = 3,
    /// Lowest priority
    Other = 255,
}

/// Event payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// The active epoch changed.
    EpochShifted {
        epoch: Epoch,
        travels: u32,
    },

    /// The key appeared in the world (active epoch matches its hiding epoch).
    KeySpawned {
        epoch: Epoch,
        position: FixedVec2,
    },

    /// The player picked up the key.
    KeyCollected {
        collected: u32,
        required: u32,
        position: FixedVec2,
    },

    /// All required keys collected; the door tile was rewritten open.
    DoorUnlocked {
        position: FixedVec2,
    },

    /// The player died.
    PlayerDied {
        reason: DeathReason,
    },

    /// The player walked through the unlocked door.
    LevelCompleted {
        travels: u32,
        duration_ticks: u64,
    },
}

/// A session event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when the event occurred
    pub tick: u64,
    /// Processing priority
    pub priority: EventPriority,
    /// Event payload
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u64, priority: EventPriority, data: GameEventData) -> Self {
        Self {
            tick,
            priority,
            data,
        }
    }

    /// The active epoch changed.
    pub fn epoch_shifted(tick: u64, epoch: Epoch, travels: u32) -> Self {
        Self::new(
            tick,
            EventPriority::EpochShift,
            GameEventData::EpochShifted { epoch, travels },
        )
    }

    /// The key materialized at its hiding place.
    pub fn key_spawned(tick: u64, epoch: Epoch, position: FixedVec2) -> Self {
        Self::new(
            tick,
            EventPriority::Other,
            GameEventData::KeySpawned { epoch, position },
        )
    }

    /// The player collected the key.
    pub fn key_collected(tick: u64, collected: u32, required: u32, position: FixedVec2) -> Self {
        Self::new(
            tick,
            EventPriority::KeyCollection,
            GameEventData::KeyCollected {
                collected,
                required,
                position,
            },
        )
    }

    /// The door opened.
    pub fn door_unlocked(tick: u64, position: FixedVec2) -> Self {
        Self::new(
            tick,
            EventPriority::DoorUnlock,
            GameEventData::DoorUnlocked { position },
        )
    }

    /// The player died.
    pub fn player_died(tick: u64, reason: DeathReason) -> Self {
        Self::new(
            tick,
            EventPriority::PlayerDeath,
            GameEventData::PlayerDied { reason },
        )
    }

    /// The level was completed.
    pub fn level_completed(tick: u64, travels: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Other,
            GameEventData::LevelCompleted {
                travels,
                duration_ticks: tick,
            },
        )
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        // Ordering identity only; payload equality is not part of event order
        self.tick == other.tick && self.priority == other.priority
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
    }
}
