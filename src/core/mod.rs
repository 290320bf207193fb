//! Core deterministic primitives.
//!
//! All types in this module are designed for exact replay: a logical
//! millisecond clock, seeded randomness and ordered containers only.

pub mod rng;
pub mod hash;
pub mod sample;
pub mod schedule;

// Re-export core types
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash, StateHasher};
pub use schedule::{Epoch, Millis, Scheduler, TimerHandle};
