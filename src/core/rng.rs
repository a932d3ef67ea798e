//! Deterministic Random Number Generator
//!
//! Xorshift128+ for fast, high-quality, deterministic randomness.
//! Given the same seed, produces an identical sequence on all platforms.
//! The objective placement rolled from this RNG is what makes a session
//! replayable from its seed alone.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::fixed::Fixed;

/// Deterministic PRNG using the Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use epoch_gate::core::rng::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(12345);
/// let value = rng.next_u64();
/// assert_eq!(value, 6233086606872742541); // Always the same!
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random integer in range [0, max).
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Simple modulo - slight bias for very large max, but acceptable
        (self.next_u64() % max as u64) as u32
    }

    /// Generate a random integer in range [min, max].
    #[inline]
    pub fn next_int_range(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let range = (max - min + 1) as u32;
        min + self.next_int(range) as i32
    }

    /// Generate a random Fixed in range [0, max).
    #[inline]
    pub fn next_fixed(&mut self, max: Fixed) -> Fixed {
        if max <= 0 {
            return 0;
        }
        // Use upper 32 bits to avoid overflow in multiplication
        let raw = (self.next_u64() >> 32) as u32;
        ((raw as i64 * max as i64) >> 32) as Fixed
    }

    /// Generate a random Fixed in range [min, max).
    #[inline]
    pub fn next_fixed_range(&mut self, min: Fixed, max: Fixed) -> Fixed {
        if min >= max {
            return min;
        }
        min + self.next_fixed(max - min)
    }

    /// Generate a random boolean with the given probability.
    ///
    /// `probability` is in range [0, FIXED_ONE] where FIXED_ONE = 100%.
    #[inline]
    pub fn next_bool(&mut self, probability: Fixed) -> bool {
        self.next_fixed(crate::core::fixed::FIXED_ONE) < probability
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_int(slice.len() as u32) as usize;
            Some(&slice[idx])
        }
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a session seed from the level identity and a per-session nonce.
///
/// The nonce comes from whatever the surrounding game loop considers a new
/// session (a frame counter, wall clock, lobby id). Mixing the level name in
/// keeps distinct levels on distinct sequences even under a reused nonce, and
/// the result is reproducible for replays.
pub fn derive_session_seed(level_name: &str, session_nonce: u64) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"EPOCH_GATE_SEED_V1");
    hasher.update(level_name.as_bytes());
    hasher.update(session_nonce.to_le_bytes());

    let hash = hasher.finalize();

    // First 8 bytes as seed; the slice length is fixed so this cannot fail
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[0..8]);
    u64::from_le_bytes(bytes)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{to_fixed, FIXED_HALF};

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(54321);

        // Very unlikely to match
        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_rng_known_values() {
        // Regression guard: if these change, recorded sessions break.
        let mut rng = DeterministicRng::new(42);
        assert_eq!(rng.next_u64(), 16629283624882167704);
        assert_eq!(rng.next_u64(), 1420492921613871959);
        assert_eq!(rng.next_u64(), 9768315062676884790);
    }

    #[test]
    fn test_next_int() {
        let mut rng = DeterministicRng::new(1234);

        for _ in 0..1000 {
            assert!(rng.next_int(100) < 100);
        }

        assert_eq!(rng.next_int(0), 0);
        assert_eq!(rng.next_int(1), 0);
    }

    #[test]
    fn test_next_fixed() {
        let mut rng = DeterministicRng::new(9999);

        let max = to_fixed(100.0);
        for _ in 0..1000 {
            let val = rng.next_fixed(max);
            assert!(val >= 0 && val < max);
        }
    }

    #[test]
    fn test_next_fixed_range() {
        let mut rng = DeterministicRng::new(31337);
        let min = to_fixed(-8.0);
        let max = to_fixed(8.0);
        for _ in 0..1000 {
            let val = rng.next_fixed_range(min, max);
            assert!(val >= min && val < max);
        }
        assert_eq!(rng.next_fixed_range(max, min), max);
    }

    #[test]
    fn test_next_bool_rough_balance() {
        let mut rng = DeterministicRng::new(777);
        let hits = (0..10_000).filter(|_| rng.next_bool(FIXED_HALF)).count();
        assert!((4_000..6_000).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn test_choose() {
        let mut rng = DeterministicRng::new(1);
        let empty: [u32; 0] = [];
        assert!(rng.choose(&empty).is_none());

        let items = [10, 20, 30];
        for _ in 0..100 {
            assert!(items.contains(rng.choose(&items).unwrap()));
        }
    }

    #[test]
    fn test_next_int_range_fuzzed_seeds() {
        use rand::Rng;

        let mut seeder = rand::thread_rng();
        for _ in 0..100 {
            let mut rng = DeterministicRng::new(seeder.gen());
            let v = rng.next_int_range(-5, 5);
            assert!((-5..=5).contains(&v));
            assert_eq!(rng.next_int_range(3, 3), 3);
            assert_eq!(rng.next_int_range(7, 2), 7);
        }
    }

    #[test]
    fn test_derive_session_seed() {
        let seed1 = derive_session_seed("crypt-01", 7);
        let seed2 = derive_session_seed("crypt-01", 7);
        assert_eq!(seed1, seed2);

        assert_ne!(seed1, derive_session_seed("crypt-01", 8));
        assert_ne!(seed1, derive_session_seed("crypt-02", 7));
    }

    #[test]
    fn test_state_checkpoint() {
        let mut rng = DeterministicRng::new(5555);

        for _ in 0..50 {
            rng.next_u64();
        }

        let saved_state = rng.state();
        let next_values: Vec<u64> = (0..10).map(|_| rng.next_u64()).collect();

        rng.set_state(saved_state);
        for expected in next_values {
            assert_eq!(rng.next_u64(), expected);
        }
    }
}
