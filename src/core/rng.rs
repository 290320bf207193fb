//! Deterministic Random Number Generator
//!
//! Uses Xorshift128+ algorithm for fast, high-quality, deterministic randomness.
//! Given the same seed, produces identical sequence on all platforms, so a
//! session can be replayed from its seed and recorded inputs.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Deterministic PRNG using Xorshift128+ algorithm.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG will produce the exact same sequence
/// of random numbers on any platform.
///
/// # Example
///
/// ```
/// use brain_bench::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
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

    /// Generate a random u32.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
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
        let range = (max as i64 - min as i64 + 1) as u64;
        (min as i64 + (self.next_u64() % range) as i64) as i32
    }

    /// Generate a random u64 in range [min, max].
    #[inline]
    pub fn next_u64_range(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        match (max - min).checked_add(1) {
            Some(range) => min + self.next_u64() % range,
            None => self.next_u64(),
        }
    }

    /// Generate a random index in range [0, len).
    #[inline]
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u64() % len as u64) as usize
    }

    /// Generate a coin flip.
    #[inline]
    pub fn next_bool_half(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// Return true with probability `numerator / denominator`.
    #[inline]
    pub fn next_chance(&mut self, numerator: u32, denominator: u32) -> bool {
        self.next_int(denominator) < numerator
    }

    /// Shuffle a slice in place using Fisher-Yates algorithm.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_index(i + 1);
            slice.swap(i, j);
        }
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_index(slice.len());
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

/// Derive a session seed from the session id and its variant plan.
///
/// The plan is hashed in the caller's order, before shuffling.
pub fn derive_session_seed(session_id: &[u8; 16], plan: &[&str]) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"BRAIN_BENCH_SEED_V1");
    hasher.update(session_id);

    for variant in plan {
        hasher.update((variant.len() as u32).to_le_bytes());
        hasher.update(variant.as_bytes());
    }

    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[0..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        // Same seed must produce same sequence
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
    fn test_next_int() {
        let mut rng = DeterministicRng::new(1234);

        for _ in 0..1000 {
            let val = rng.next_int(100);
            assert!(val < 100);
        }

        // Edge case: max = 0
        assert_eq!(rng.next_int(0), 0);

        // Edge case: max = 1
        assert_eq!(rng.next_int(1), 0);
    }

    #[test]
    fn test_next_int_range() {
        let mut rng = DeterministicRng::new(5678);

        for _ in 0..1000 {
            let val = rng.next_int_range(-10, 10);
            assert!((-10..=10).contains(&val));
        }

        // Edge case: min = max
        assert_eq!(rng.next_int_range(5, 5), 5);
    }

    #[test]
    fn test_next_u64_range_hits_both_ends() {
        let mut rng = DeterministicRng::new(42);
        let mut seen_min = false;
        let mut seen_max = false;

        for _ in 0..2000 {
            let val = rng.next_u64_range(2000, 2003);
            assert!((2000..=2003).contains(&val));
            seen_min |= val == 2000;
            seen_max |= val == 2003;
        }

        assert!(seen_min && seen_max);
        assert_eq!(rng.next_u64_range(7, 7), 7);
    }

    #[test]
    fn test_coin_flip_is_roughly_fair() {
        let mut rng = DeterministicRng::new(99);
        let heads = (0..10_000).filter(|_| rng.next_bool_half()).count();
        assert!((4_500..5_500).contains(&heads));
    }

    #[test]
    fn test_shuffle_determinism() {
        let mut rng1 = DeterministicRng::new(1111);
        let mut rng2 = DeterministicRng::new(1111);

        let mut arr1 = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mut arr2 = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

        rng1.shuffle(&mut arr1);
        rng2.shuffle(&mut arr2);

        assert_eq!(arr1, arr2);

        let mut sorted = arr1;
        sorted.sort();
        assert_eq!(sorted, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_choose_empty() {
        let mut rng = DeterministicRng::new(3);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[9]), Some(&9));
    }

    #[test]
    fn test_derive_session_seed() {
        let id = [1u8; 16];

        let seed1 = derive_session_seed(&id, &["maths", "towers"]);
        let seed2 = derive_session_seed(&id, &["maths", "towers"]);
        assert_eq!(seed1, seed2);

        let seed3 = derive_session_seed(&[2u8; 16], &["maths", "towers"]);
        assert_ne!(seed1, seed3);

        let seed4 = derive_session_seed(&id, &["towers", "maths"]);
        assert_ne!(seed1, seed4);
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
