//! State Hashing for Verification
//!
//! Provides deterministic hashing of session state for:
//! - Replay validation (same seed + same inputs = same hash)
//! - Regression checks on variant behavior

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for session state.
///
/// Wraps SHA-256 with helpers for the primitive types the engine stores.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for session state.
    pub fn for_session_state() -> Self {
        Self::new(b"BRAIN_BENCH_STATE_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i64 value (little-endian).
    #[inline]
    pub fn update_i64(&mut self, value: i64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a usize, widened to u64.
    #[inline]
    pub fn update_usize(&mut self, value: usize) {
        self.update_u64(value as u64);
    }

    /// Update with an f64 by its bit pattern.
    #[inline]
    pub fn update_f64(&mut self, value: f64) {
        self.update_u64(value.to_bits());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with a length-prefixed string.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.hasher.update(value.as_bytes());
    }

    /// Update with an optional value; `None` and `Some` never collide.
    #[inline]
    pub fn update_option<T, F>(&mut self, value: Option<T>, update: F)
    where
        F: FnOnce(&mut Self, T),
    {
        match value {
            Some(inner) => {
                self.update_u8(1);
                update(self, inner);
            }
            None => self.update_u8(0),
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute hash with domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute state hash for session verification.
///
/// This function is called by `Session::compute_hash()`.
/// The closure adds session-specific data after the clock and seed.
pub fn compute_state_hash<F>(now_ms: u64, seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_session_state();

    // Always hash clock and seed first
    hasher.update_u64(now_ms);
    hasher.update_u64(seed);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_session_state();
            hasher.update_u32(100);
            hasher.update_u64(12345);
            hasher.update_f64(0.473);
            hasher.update_str("maths");
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_option_tagging() {
        let none = {
            let mut h = StateHasher::new(b"test");
            h.update_option(None::<u32>, |h, v| h.update_u32(v));
            h.finalize()
        };
        let zero = {
            let mut h = StateHasher::new(b"test");
            h.update_option(Some(0u32), |h, v| h.update_u32(v));
            h.finalize()
        };

        assert_ne!(none, zero);
    }

    #[test]
    fn test_domain_separation() {
        let data = [1u8, 2, 3, 4];

        let hash1 = hash_with_domain(b"DOMAIN_A", &data);
        let hash2 = hash_with_domain(b"DOMAIN_B", &data);

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_compute_state_hash() {
        let hash = compute_state_hash(100, 12345, |hasher| {
            hasher.update_u32(5);
            hasher.update_bool(true);
        });

        let hash2 = compute_state_hash(100, 12345, |hasher| {
            hasher.update_u32(5);
            hasher.update_bool(true);
        });

        assert_eq!(hash, hash2);

        let hash3 = compute_state_hash(101, 12345, |hasher| {
            hasher.update_u32(5);
            hasher.update_bool(true);
        });

        assert_ne!(hash, hash3);
    }
}
