//! Session Layer
//!
//! Runs a shuffled plan of variants one instance at a time and collects
//! their results.
//!
//! ## Module Structure
//!
//! - `config`: Seed and phase timings
//! - `orchestrator`: The session state machine and replay
//! - `results`: Per-variant records and average comparison
//! - `driver`: Tokio task owning a live session
//! - `autoplay`: Scripted player for demos, tests and benchmarks

pub mod config;
pub mod orchestrator;
pub mod results;
pub mod driver;
pub mod autoplay;

pub use autoplay::{play_to_end, AutoplayError, ScriptedPlayer};
pub use config::{ConfigError, SessionConfig, TimingConfig};
pub use driver::{spawn_session, DriverConfig, DriverError, SessionHandle};
pub use orchestrator::{replay_session, Session, SessionError, SessionSnapshot};
pub use results::{Comparison, SessionResults, Standing};
