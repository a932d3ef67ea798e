//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the simulation. All gameplay logic uses
//! integer arithmetic only - no floats outside of display conversion.
//!
//! ## Format: Q16.16
//!
//! 32-bit signed integer, 16 integer bits, 16 fractional bits.
//! Range: -32768.0 to +32767.99998, precision 1/65536.
//! World units are pixels of the original tile maps, so the range covers
//! maps thousands of tiles wide.

/// Q16.16 fixed-point number stored as i32.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE;

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1;

// =============================================================================
// WORLD CONSTANTS (integer literals - no float conversion at runtime)
// =============================================================================

/// Tick duration: 1/60 second = round(65536/60)
pub const TICK_DURATION: Fixed = 1092;

/// Edge length of one tile in world units: 16.0
pub const TILE_SIZE: Fixed = 16 * FIXED_ONE;

/// Walking speed: 120.0 world units/sec
pub const WALK_SPEED: Fixed = 120 * FIXED_ONE;

/// Running speed: 160.0 world units/sec
pub const RUN_SPEED: Fixed = 160 * FIXED_ONE;

/// Player collision half-extent: 6.0 (12x12 body, fits a one-tile corridor)
pub const PLAYER_HALF_EXTENT: Fixed = 6 * FIXED_ONE;

/// Distance below which a player standing at the door completes the level: 20.0
pub const DOOR_PROXIMITY: Fixed = 20 * FIXED_ONE;

/// Distance below which the player picks up the key: 12.0
pub const KEY_PICKUP_RADIUS: Fixed = 12 * FIXED_ONE;

// =============================================================================
// CORE OPERATIONS (deterministic, wrapping semantics)
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// Only use at compile time or during load. Never in the tick loop.
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert fixed-point to float for display/rendering only.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Multiply two fixed-point numbers.
///
/// Uses an i64 intermediate to prevent overflow, then truncates.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Divide two fixed-point numbers.
///
/// Pre-shifts the numerator to keep precision. Divide-by-zero returns 0
/// rather than panicking, for determinism.
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    let wide = (a as i64) << FIXED_SCALE;
    (wide / b as i64) as Fixed
}

/// Square root using Newton-Raphson iteration.
///
/// Returns 0 for non-positive inputs. Exactly 6 iterations for determinism.
/// Prefer squared distances when a comparison suffices.
#[inline]
pub fn fixed_sqrt(x: Fixed) -> Fixed {
    if x <= 0 {
        return 0;
    }

    let mut guess = (x >> 1).max(1);

    for _ in 0..6 {
        let div = fixed_div(x, guess);
        guess = (guess.wrapping_add(div)) >> 1;

        if guess == 0 {
            guess = 1;
        }
    }

    guess
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    if x < 0 { x.wrapping_neg() } else { x }
}

/// Minimum of two fixed-point numbers.
#[inline]
pub fn fixed_min(a: Fixed, b: Fixed) -> Fixed {
    if a < b { a } else { b }
}

/// Maximum of two fixed-point numbers.
#[inline]
pub fn fixed_max(a: Fixed, b: Fixed) -> Fixed {
    if a > b { a } else { b }
}

/// Clamp a fixed-point number to a range.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    fixed_max(min, fixed_min(max, value))
}

/// Convert a world coordinate to an integer tile coordinate.
///
/// Floor division so negative world positions map below tile 0 and get
/// rejected by grid bounds checks instead of wrapping into the grid.
#[inline]
pub fn world_to_tile(coord: Fixed) -> i32 {
    (coord as i64).div_euclid(TILE_SIZE as i64) as i32
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_ONE, 65536);
        assert_eq!(FIXED_HALF, 32768);
        assert_eq!(TILE_SIZE, 16 * FIXED_ONE);
        assert_eq!(TICK_DURATION, 1092); // round(65536/60)
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.0), FIXED_ONE);
        assert_eq!(to_fixed(0.5), FIXED_HALF);
        assert_eq!(to_fixed(-1.0), -FIXED_ONE);
    }

    #[test]
    fn test_fixed_mul() {
        assert_eq!(fixed_mul(to_fixed(2.0), to_fixed(3.0)), to_fixed(6.0));
        assert_eq!(fixed_mul(FIXED_HALF, FIXED_HALF), to_fixed(0.25));
        assert_eq!(fixed_mul(to_fixed(-2.0), to_fixed(3.0)), to_fixed(-6.0));
    }

    #[test]
    fn test_fixed_div() {
        assert_eq!(fixed_div(to_fixed(6.0), to_fixed(2.0)), to_fixed(3.0));
        assert_eq!(fixed_div(FIXED_ONE, to_fixed(4.0)), to_fixed(0.25));

        // Divide by zero returns 0
        assert_eq!(fixed_div(FIXED_ONE, 0), 0);
    }

    #[test]
    fn test_fixed_sqrt() {
        assert!((fixed_sqrt(to_fixed(4.0)) - to_fixed(2.0)).abs() < 100);
        assert!((fixed_sqrt(FIXED_ONE) - FIXED_ONE).abs() < 100);
        assert_eq!(fixed_sqrt(0), 0);
        assert_eq!(fixed_sqrt(-FIXED_ONE), 0);
        assert!(fixed_sqrt(1) >= 0);
    }

    #[test]
    fn test_world_to_tile() {
        assert_eq!(world_to_tile(0), 0);
        assert_eq!(world_to_tile(to_fixed(15.9)), 0);
        assert_eq!(world_to_tile(to_fixed(16.0)), 1);
        assert_eq!(world_to_tile(to_fixed(50.0)), 3);
        assert_eq!(world_to_tile(to_fixed(-0.5)), -1);
        assert_eq!(world_to_tile(to_fixed(-16.1)), -2);
    }

    #[test]
    fn test_fixed_clamp() {
        assert_eq!(fixed_clamp(to_fixed(5.0), 0, to_fixed(3.0)), to_fixed(3.0));
        assert_eq!(fixed_clamp(to_fixed(-5.0), 0, to_fixed(3.0)), 0);
        assert_eq!(fixed_clamp(to_fixed(1.0), 0, to_fixed(3.0)), to_fixed(1.0));
    }
}
