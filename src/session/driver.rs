//! Async Session Driver
//!
//! Runs a [`Session`] inside a single tokio task that owns it exclusively.
//! The logical clock follows the runtime clock, commands arrive on an mpsc
//! channel and snapshots go out on a broadcast channel whenever the session
//! produced events.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::core::schedule::Millis;
use crate::game::input::{GameInput, SessionInput};
use crate::game::state::AnswerOutcome;
use crate::session::orchestrator::{Session, SessionSnapshot};
use crate::session::results::SessionResults;

/// Shortest tick interval the driver will run at.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Driver settings.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// How often the clock is synced and due timers fired; clamped to
    /// [`MIN_TICK_INTERVAL`].
    pub tick_interval: Duration,
    /// Snapshot broadcast buffer.
    pub snapshot_capacity: usize,
    /// Command queue depth.
    pub command_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            snapshot_capacity: 16,
            command_capacity: 64,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The driver task has stopped.
    #[error("session driver has stopped")]
    Closed,
}

enum Command {
    Apply {
        input: SessionInput,
        reply: oneshot::Sender<AnswerOutcome>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Cloneable handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: broadcast::Sender<SessionSnapshot>,
}

impl SessionHandle {
    /// Start the session.
    pub async fn start(&self) -> Result<(), DriverError> {
        self.apply(SessionInput::Start).await.map(|_| ())
    }

    /// Submit to the active instance.
    pub async fn submit(&self, input: GameInput) -> Result<AnswerOutcome, DriverError> {
        self.apply(SessionInput::Submit { input }).await
    }

    /// Skip the active instance.
    pub async fn force_advance(&self) -> Result<(), DriverError> {
        self.apply(SessionInput::ForceAdvance).await.map(|_| ())
    }

    /// Apply any session command.
    pub async fn apply(&self, input: SessionInput) -> Result<AnswerOutcome, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Apply { input, reply })
            .await
            .map_err(|_| DriverError::Closed)?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    /// Current snapshot, with the clock synced first.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply })
            .await
            .map_err(|_| DriverError::Closed)?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    /// Receive snapshots as the session changes.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// Stop the driver; the task returns the results collected so far.
    pub async fn shutdown(&self) -> Result<(), DriverError> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| DriverError::Closed)
    }
}

/// Move `session` into its own task.
///
/// The task finishes when the session ends, on shutdown, or when every
/// handle is dropped, and yields the session results.
pub fn spawn_session(session: Session, config: DriverConfig) -> (SessionHandle, JoinHandle<SessionResults>) {
    let (command_tx, command_rx) = mpsc::channel(config.command_capacity);
    let (snapshot_tx, _) = broadcast::channel(config.snapshot_capacity);

    let handle = SessionHandle {
        commands: command_tx,
        snapshots: snapshot_tx.clone(),
    };
    let task = tokio::spawn(run_session(session, config, command_rx, snapshot_tx));
    (handle, task)
}

async fn run_session(
    mut session: Session,
    config: DriverConfig,
    mut commands: mpsc::Receiver<Command>,
    snapshots: broadcast::Sender<SessionSnapshot>,
) -> SessionResults {
    let clock = DriverClock::new(session.now());
    let mut ticker = interval(config.tick_interval.max(MIN_TICK_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(session = %session.id(), "session driver started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.advance_to(clock.now());
            }
            command = commands.recv() => match command {
                Some(Command::Apply { input, reply }) => {
                    session.advance_to(clock.now());
                    let outcome = session.apply(input);
                    // The caller may have given up waiting
                    let _ = reply.send(outcome);
                }
                Some(Command::Snapshot { reply }) => {
                    session.advance_to(clock.now());
                    let _ = reply.send(session.snapshot());
                }
                Some(Command::Shutdown) | None => {
                    info!(session = %session.id(), "session driver shutting down");
                    break;
                }
            }
        }

        if !session.take_events().is_empty() {
            // No subscribers is fine
            let _ = snapshots.send(session.snapshot());
        }

        if session.is_ended() {
            debug!(session = %session.id(), "session ended, driver exiting");
            break;
        }
    }

    session.results().clone()
}

/// Maps runtime time onto the session's logical clock.
struct DriverClock {
    origin: Instant,
    base: Millis,
}

impl DriverClock {
    fn new(base: Millis) -> Self {
        Self {
            origin: Instant::now(),
            base,
        }
    }

    fn now(&self) -> Millis {
        self.base + self.origin.elapsed().as_millis() as Millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentBank;
    use crate::game::events::SilentCues;
    use crate::game::registry::Variant;
    use crate::session::config::SessionConfig;

    fn towers_session(seed: u64) -> Session {
        Session::new(
            &[Variant::Towers],
            ContentBank::builtin(),
            SessionConfig::seeded(seed),
            Box::new(SilentCues),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_runtime() {
        let (handle, _task) = spawn_session(towers_session(1), DriverConfig::default());
        handle.start().await.unwrap();

        let early = handle.snapshot().await.unwrap();
        assert!(early.started);
        assert!(!early.accepting_input);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        let later = handle.snapshot().await.unwrap();
        assert!(later.accepting_input);
        assert!(later.now_ms >= 1100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_tick_interval_is_clamped() {
        let config = DriverConfig {
            tick_interval: Duration::ZERO,
            ..DriverConfig::default()
        };
        let (handle, task) = spawn_session(towers_session(4), config);
        handle.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(handle.snapshot().await.unwrap().accepting_input);

        handle.shutdown().await.unwrap();
        assert!(task.await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_strike_out_finishes_task() {
        let (handle, task) = spawn_session(towers_session(2), DriverConfig::default());
        handle.start().await.unwrap();

        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(2100)).await;
            let outcome = handle.submit(GameInput::Number { value: 999 }).await.unwrap();
            assert_eq!(outcome, AnswerOutcome::Incorrect);
        }

        let results = task.await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.get(Variant::Towers).unwrap().percentage_correct, Some(0.0));
        assert_eq!(handle.snapshot().await, Err(DriverError::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_returns_partial_results() {
        let session = Session::new(
            &[Variant::Towers, Variant::Definitions],
            ContentBank::builtin(),
            SessionConfig::seeded(3),
            Box::new(SilentCues),
        )
        .unwrap();
        let (handle, task) = spawn_session(session, DriverConfig::default());

        handle.start().await.unwrap();
        handle.force_advance().await.unwrap();
        handle.shutdown().await.unwrap();

        let results = task.await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots_are_published() {
        let (handle, _task) = spawn_session(towers_session(4), DriverConfig::default());
        let mut updates = handle.subscribe();

        handle.start().await.unwrap();
        let snapshot = loop {
            let update = updates.recv().await.unwrap();
            if update.started {
                break update;
            }
        };
        assert_eq!(snapshot.phase, Some(crate::game::state::Phase::Generating));
        assert_eq!(snapshot.variant, Some(Variant::Towers));
    }
}
