//! # Brain Bench
//!
//! Deterministic session engine for a suite of cognitive mini-games.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         BRAIN BENCH                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── rng.rs       - Deterministic Xorshift128+ PRNG          │
//! │  ├── hash.rs      - State hashing for verification           │
//! │  ├── schedule.rs  - Epoch-tagged timers on a logical clock   │
//! │  └── sample.rs    - Sampling without repeats                 │
//! │                                                              │
//! │  content/         - Static puzzle banks                      │
//! │  ├── towers.rs    - Tower configurations and solver          │
//! │  └── builtin.rs   - Bundled bank                             │
//! │                                                              │
//! │  game/            - Game logic (deterministic)               │
//! │  ├── state.rs     - Shared totals, phases, result records    │
//! │  ├── scoring.rs   - Answer scoring and strike limit          │
//! │  ├── context.rs   - Per-dispatch access to the session       │
//! │  ├── registry.rs  - Static variant table                     │
//! │  └── variants/    - The ten mini-games                       │
//! │                                                              │
//! │  session/         - Orchestration                            │
//! │  ├── orchestrator.rs - Plan, advance, replay                 │
//! │  ├── results.rs   - Per-variant records                      │
//! │  ├── config.rs    - Seed and timings                         │
//! │  └── driver.rs    - Tokio task owning a live session         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/`, `game/` and session state machine are deterministic:
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time; every delay runs on a logical millisecond clock
//! - All randomness from seeded Xorshift128+
//!
//! Given the same plan, seed and timed inputs, a session replays to the
//! **identical state hash**. Only the async driver reads real time.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod content;
pub mod game;
pub mod session;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use content::{ContentBank, ContentError};
pub use game::{AnswerOutcome, Cue, CuePort, Game, GameInput, Phase, ResultRecord, SessionEvent, Variant};
pub use session::{Session, SessionConfig, SessionError, SessionResults, SessionSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Incorrect answers that end an instance.
pub const STRIKE_LIMIT: u32 = game::scoring::STRIKE_LIMIT;
