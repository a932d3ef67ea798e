//! Core deterministic primitives.
//!
//! Everything in this module is designed for perfect cross-platform
//! determinism: integer-only math, a seeded PRNG, no system time.

pub mod fixed;
pub mod rng;
pub mod vec2;

// Re-export core types
pub use fixed::{Fixed, FIXED_HALF, FIXED_ONE, FIXED_SCALE, TILE_SIZE};
pub use rng::DeterministicRng;
pub use vec2::FixedVec2;
