//! # Epoch Gate
//!
//! Deterministic session core for a two-epoch time-travel puzzle game.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       EPOCH GATE                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  └── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │                                                              │
//! │  game/           - Session logic (deterministic)             │
//! │  ├── map.rs      - Level geometry, layers, markers           │
//! │  ├── epoch.rs    - Two-epoch state machine                   │
//! │  ├── input.rs    - Input capture and recording               │
//! │  ├── state.rs    - Session and player state                  │
//! │  ├── tick.rs     - The simulation loop                       │
//! │  ├── objective.rs- Key spawning and door gating              │
//! │  ├── hazard.rs   - Lethal tiles and transition safety        │
//! │  └── events.rs   - Session events                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in session logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! Given the same level data, seed, and input recording, a session plays
//! out **identically** on any platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_HALF, FIXED_ONE, FIXED_SCALE};
pub use core::rng::DeterministicRng;
pub use core::vec2::FixedVec2;
pub use game::input::{InputFrame, InputRecording};
pub use game::state::{PlayerState, SessionOutcome, SessionState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// End-of-level delay in ticks (1.5 seconds * 60 Hz), covering the outcome
/// screen fade before the session reports itself over
pub const END_TRANSITION_TICKS: u32 = 90;
