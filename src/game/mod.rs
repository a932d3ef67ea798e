//! Game Logic Module
//!
//! All session simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `map`: Level geometry, tile layers, markers, validation
//! - `epoch`: The two-epoch state machine and layer activation
//! - `input`: Input capture, normalization, recording
//! - `state`: Session state, player state, lifecycle
//! - `tick`: The simulation loop
//! - `objective`: Key spawning, door gating, level completion
//! - `hazard`: Lethal tiles and transition safety
//! - `events`: Session events for the surrounding scene layer

pub mod epoch;
pub mod events;
pub mod hazard;
pub mod input;
pub mod map;
pub mod objective;
pub mod state;
pub mod tick;

#[cfg(test)]
pub mod testutil;

// Re-export key types
pub use epoch::{Epoch, EpochTimeline};
pub use events::{GameEvent, GameEventData};
pub use hazard::DeathReason;
pub use input::{InputDelta, InputFrame, InputRecording, MOVE_LUT};
pub use map::{LevelData, LevelError, LevelMap, ValidationReport};
pub use objective::{KeyPlacement, ObjectiveState};
pub use state::{PlayerState, SessionOutcome, SessionPhase, SessionReport, SessionState};
pub use tick::{SessionConfig, TickResult};
