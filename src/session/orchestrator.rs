//! Session Orchestrator
//!
//! Owns the shuffled plan, the single live game instance and the results
//! map. Every mutation happens in one of four entry points (start, submit,
//! force advance, clock advance), processed one at a time. Completion of an
//! instance is reported through its [`GameContext`] and the orchestrator
//! advances after the dispatch returns, so instances never call back into
//! the session.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::content::{ContentBank, ContentError};
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::{derive_session_seed, DeterministicRng};
use crate::core::schedule::{Epoch, Millis, Scheduler};
use crate::game::context::{GameContext, GameTimer};
use crate::game::events::{CuePort, SessionEvent, SilentCues};
use crate::game::input::{GameInput, SessionInput, TimedInput};
use crate::game::registry::Variant;
use crate::game::state::{AnswerOutcome, Phase};
use crate::game::view::VariantView;
use crate::game::{submit_gated, Game};
use crate::session::config::{ConfigError, SessionConfig};
use crate::session::results::SessionResults;

/// Errors creating a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No variants selected.
    #[error("session plan is empty")]
    EmptyPlan,

    /// A variant was selected twice.
    #[error("variant {0} appears more than once in the plan")]
    DuplicateVariant(Variant),

    /// A planned variant has no usable content.
    #[error("content for {variant} is unusable")]
    Content {
        /// Variant whose bank failed validation.
        variant: Variant,
        /// Validation failure.
        #[source]
        source: ContentError,
    },

    /// The configuration is unusable.
    #[error("invalid session config: {0}")]
    Config(#[from] ConfigError),
}

/// Pull-based view of the session for a presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub id: Uuid,
    /// Logical clock.
    pub now_ms: Millis,
    /// Session has been started.
    pub started: bool,
    /// Every planned variant has a record.
    pub ended: bool,
    /// Position of the active instance in the plan.
    pub position: Option<usize>,
    /// Planned variant count.
    pub plan_len: usize,
    /// Active variant.
    pub variant: Option<Variant>,
    /// Progress of the active instance.
    pub progress: u32,
    /// Incorrect answers of the active instance.
    pub strikes: u32,
    /// Input gate of the active instance.
    pub accepting_input: bool,
    /// Phase of the active instance.
    pub phase: Option<Phase>,
    /// Variant-specific visible state.
    pub view: Option<VariantView>,
}

/// A running session.
pub struct Session {
    /// Session identifier.
    id: Uuid,
    /// RNG seed in use.
    seed: u64,
    /// Variants in play order.
    plan: Vec<Variant>,
    /// Index of the active instance; `None` before the first.
    cursor: Option<usize>,
    /// Content banks for every planned variant.
    content: ContentBank,
    /// Session configuration.
    config: SessionConfig,
    /// Session RNG, shared by every instance in turn.
    rng: DeterministicRng,
    /// Pending timed phases.
    timers: Scheduler<GameTimer>,
    /// Epoch of the active instance.
    epoch: Epoch,
    /// Logical clock.
    now: Millis,
    /// Active instance.
    current: Option<Box<dyn Game>>,
    /// Records of finished instances.
    results: SessionResults,
    /// Session has been started.
    started: bool,
    /// Session has ended.
    ended: bool,
    /// Undrained events.
    events: Vec<SessionEvent>,
    /// Commands applied so far, for replay.
    inputs: Vec<TimedInput>,
    /// Audio port.
    cues: Box<dyn CuePort + Send>,
}

impl Session {
    /// Create a session over `plan`.
    ///
    /// The timings and every planned variant's content are validated up front. The plan is
    /// shuffled with the session RNG and the first instance is created, but
    /// nothing runs until [`Session::start`].
    pub fn new(
        plan: &[Variant],
        content: ContentBank,
        config: SessionConfig,
        cues: Box<dyn CuePort + Send>,
    ) -> Result<Self, SessionError> {
        if plan.is_empty() {
            return Err(SessionError::EmptyPlan);
        }
        config.timing.validate()?;

        let mut seen = BTreeSet::new();
        for &variant in plan {
            if !seen.insert(variant) {
                return Err(SessionError::DuplicateVariant(variant));
            }
            content
                .validate(variant)
                .map_err(|source| SessionError::Content { variant, source })?;
        }

        let id = Uuid::new_v4();
        let seed = config.seed.unwrap_or_else(|| {
            let names: Vec<&str> = plan.iter().map(|v| v.as_str()).collect();
            derive_session_seed(id.as_bytes(), &names)
        });

        let mut rng = DeterministicRng::new(seed);
        let mut shuffled = plan.to_vec();
        rng.shuffle(&mut shuffled);

        info!(session = %id, seed, plan = ?shuffled, "session created");

        let mut session = Self {
            id,
            seed,
            plan: shuffled,
            cursor: None,
            content,
            config,
            rng,
            timers: Scheduler::new(),
            epoch: Epoch::default(),
            now: 0,
            current: None,
            results: SessionResults::new(),
            started: false,
            ended: false,
            events: Vec::new(),
            inputs: Vec::new(),
            cues,
        };
        session.advance();
        Ok(session)
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Seed in use; pass it back through [`SessionConfig::seed`] to replay.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Variants in play order.
    pub fn plan(&self) -> &[Variant] {
        &self.plan
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Logical clock.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Whether the session has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether every planned variant has finished.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// The active variant.
    pub fn current_variant(&self) -> Option<Variant> {
        self.current.as_ref().map(|game| game.variant())
    }

    /// The active instance.
    pub fn current_game(&self) -> Option<&dyn Game> {
        self.current.as_deref()
    }

    /// Results collected so far; complete once the session has ended.
    pub fn results(&self) -> &SessionResults {
        &self.results
    }

    /// Commands applied so far.
    pub fn inputs(&self) -> &[TimedInput] {
        &self.inputs
    }

    /// Due time of the next live timer.
    pub fn next_timer_due(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    /// Whether the active instance is accepting input.
    pub fn accepting_input(&self) -> bool {
        self.current
            .as_ref()
            .map_or(false, |game| game.core().accepting_input())
    }

    /// Mark the session as running and start the active instance.
    pub fn start(&mut self) {
        if self.started || self.ended {
            return;
        }
        self.inputs.push(TimedInput::new(self.now, SessionInput::Start));
        self.started = true;
        info!(session = %self.id, "session started");
        self.start_current();
    }

    /// Submit to the active instance.
    ///
    /// Submissions before start, after the end or while input is closed are
    /// neutral. Invalid submissions are logged, recorded as
    /// [`SessionEvent`]s and also neutral.
    pub fn submit(&mut self, input: GameInput) -> AnswerOutcome {
        if !self.started || self.ended {
            return AnswerOutcome::Neutral;
        }
        let Some(variant) = self.current_variant() else {
            return AnswerOutcome::Neutral;
        };
        self.inputs.push(TimedInput::submit(self.now, input));

        match self.dispatch(|game, ctx| submit_gated(game, &input, ctx)) {
            Some(Ok(outcome)) => outcome,
            Some(Err(err)) => {
                warn!(%variant, input = input.kind(), %err, "input rejected");
                self.events
                    .push(SessionEvent::input_rejected(self.now, variant, err.to_string()));
                AnswerOutcome::Neutral
            }
            None => AnswerOutcome::Neutral,
        }
    }

    /// Abandon the active instance and move to the next one.
    ///
    /// The abandoned instance's record is stored from its partial totals and
    /// all of its pending timers are cancelled.
    pub fn force_advance(&mut self) {
        if self.ended {
            return;
        }
        self.inputs.push(TimedInput::new(self.now, SessionInput::ForceAdvance));
        if let Some(variant) = self.current_variant() {
            info!(%variant, "instance skipped");
            self.events.push(SessionEvent::instance_skipped(self.now, variant));
        }
        self.advance();
    }

    /// Apply a session command.
    pub fn apply(&mut self, input: SessionInput) -> AnswerOutcome {
        match input {
            SessionInput::Start => {
                self.start();
                AnswerOutcome::Neutral
            }
            SessionInput::Submit { input } => self.submit(input),
            SessionInput::ForceAdvance => {
                self.force_advance();
                AnswerOutcome::Neutral
            }
        }
    }

    /// Move the clock forward by `ms`, firing due timers.
    pub fn advance_time(&mut self, ms: Millis) {
        let target = self.now + ms;
        self.advance_to(target);
    }

    /// Move the clock to `target`, firing due timers in order.
    ///
    /// Timers left over from an earlier instance are dropped.
    pub fn advance_to(&mut self, target: Millis) {
        while let Some(timer) = self.timers.pop_due(target) {
            self.now = self.now.max(timer.handle.due());
            if timer.epoch != self.epoch {
                debug!(epoch = timer.epoch.0, current = self.epoch.0, "dropping stale timer");
                continue;
            }
            let payload = timer.payload;
            self.dispatch(|game, ctx| game.on_timer(payload, ctx));
        }
        self.now = self.now.max(target);
    }

    /// Fire every timer due now.
    pub fn run_pending(&mut self) {
        self.advance_to(self.now);
    }

    /// Fire timers until the active instance accepts input.
    ///
    /// Returns false if the session ends or runs out of timers first.
    pub fn run_until_input(&mut self) -> bool {
        loop {
            if self.ended {
                return false;
            }
            if self.accepting_input() {
                return true;
            }
            match self.timers.next_due() {
                Some(due) => self.advance_to(due),
                None => return false,
            }
        }
    }

    /// Drain events generated since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot for a presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        let game = self.current.as_deref();
        SessionSnapshot {
            id: self.id,
            now_ms: self.now,
            started: self.started,
            ended: self.ended,
            position: self.cursor.filter(|_| game.is_some()),
            plan_len: self.plan.len(),
            variant: game.map(|g| g.variant()),
            progress: game.map_or(0, |g| g.core().progress()),
            strikes: game.map_or(0, |g| g.core().num_incorrect()),
            accepting_input: game.map_or(false, |g| g.core().accepting_input()),
            phase: game.map(|g| g.core().phase()),
            view: game.map(|g| g.view()),
        }
    }

    /// Hash of the full session state, for replay verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.now, self.seed, |hasher| {
            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
            hasher.update_u32(self.epoch.0);
            hasher.update_option(self.cursor, |h, cursor| h.update_usize(cursor));
            hasher.update_bool(self.started);
            hasher.update_bool(self.ended);
            hasher.update_usize(self.timers.len());
            self.results.hash_into(hasher);
            hasher.update_option(self.current.as_deref(), |h, game| {
                h.update_str(game.variant().as_str());
                game.hash_into(h);
            });
        })
    }

    fn start_current(&mut self) {
        let Some(variant) = self.current_variant() else {
            return;
        };
        info!(%variant, "instance started");
        self.events.push(SessionEvent::instance_started(self.now, variant));
        self.dispatch(|game, ctx| game.start(ctx));
    }

    /// Run `f` against the active instance, advancing if it completed.
    fn dispatch<R, F>(&mut self, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn Game, &mut GameContext<'_>) -> R,
    {
        let game = self.current.as_mut()?;
        let mut ctx = GameContext::new(
            self.now,
            self.epoch,
            game.variant(),
            &self.config.timing,
            &mut self.rng,
            &mut self.timers,
            &mut self.events,
            &mut *self.cues,
        );
        let result = f(game.as_mut(), &mut ctx);
        let completed = ctx.completed();

        if completed {
            self.advance();
        }
        Some(result)
    }

    /// Finalize the active instance, if any, and create the next one.
    fn advance(&mut self) {
        let cancelled = self.timers.cancel_epoch(self.epoch);
        if cancelled > 0 {
            debug!(epoch = self.epoch.0, cancelled, "cancelled instance timers");
        }
        self.epoch = self.epoch.next();

        if let Some(game) = self.current.take() {
            let variant = game.variant();
            let record = game.finalize();
            info!(%variant, ?record, "instance completed");
            self.events
                .push(SessionEvent::instance_completed(self.now, variant, record));
            self.results.insert(variant, record);
        }

        loop {
            let next = self.cursor.map_or(0, |cursor| cursor + 1);
            self.cursor = Some(next);

            let Some(&variant) = self.plan.get(next) else {
                self.ended = true;
                info!(session = %self.id, completed = self.results.len(), "session ended");
                self.events
                    .push(SessionEvent::session_ended(self.now, self.results.len()));
                return;
            };

            match variant.create(&self.content, &mut self.rng) {
                Ok(game) => {
                    info!(%variant, position = next, "instance created");
                    self.events
                        .push(SessionEvent::instance_created(self.now, variant, next));
                    self.current = Some(game);
                    if self.started {
                        self.start_current();
                    }
                    return;
                }
                Err(err) => {
                    error!(%variant, %err, "failed to create instance, skipping");
                }
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("seed", &self.seed)
            .field("plan", &self.plan)
            .field("cursor", &self.cursor)
            .field("now", &self.now)
            .field("started", &self.started)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

/// Rebuild a session from recorded commands.
///
/// `config` must carry the original seed and `plan` must be in the order
/// originally requested. Each command is applied after the clock reaches its
/// timestamp.
pub fn replay_session(
    plan: &[Variant],
    content: ContentBank,
    config: SessionConfig,
    inputs: &[TimedInput],
) -> Result<Session, SessionError> {
    let mut session = Session::new(plan, content, config, Box::new(SilentCues))?;
    for timed in inputs {
        session.advance_to(timed.at_ms);
        session.apply(timed.input);
    }
    Ok(session)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::SessionEventData;

    fn session(plan: &[Variant], seed: u64) -> Session {
        Session::new(
            plan,
            ContentBank::builtin(),
            SessionConfig::seeded(seed),
            Box::new(SilentCues),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_empty_plan() {
        let result = Session::new(&[], ContentBank::builtin(), SessionConfig::default(), Box::new(SilentCues));
        assert!(matches!(result, Err(SessionError::EmptyPlan)));
    }

    #[test]
    fn test_rejects_duplicates() {
        let result = Session::new(
            &[Variant::Colors, Variant::Towers, Variant::Colors],
            ContentBank::builtin(),
            SessionConfig::default(),
            Box::new(SilentCues),
        );
        assert!(matches!(result, Err(SessionError::DuplicateVariant(Variant::Colors))));
    }

    #[test]
    fn test_rejects_unusable_timing() {
        let mut config = SessionConfig::seeded(1);
        config.timing.detection_tick_ms = 0;
        let result = Session::new(&[Variant::Detection], ContentBank::builtin(), config, Box::new(SilentCues));
        assert!(matches!(result, Err(SessionError::Config(ConfigError::InvalidTiming(_)))));
    }

    #[test]
    fn test_rejects_missing_content() {
        let mut content = ContentBank::builtin();
        content.towers.clear();
        let result = Session::new(&[Variant::Towers], content, SessionConfig::default(), Box::new(SilentCues));
        assert!(matches!(
            result,
            Err(SessionError::Content { variant: Variant::Towers, .. })
        ));
    }

    #[test]
    fn test_plan_shuffle_is_seeded() {
        let a = session(&Variant::ALL, 5);
        let b = session(&Variant::ALL, 5);
        assert_eq!(a.plan(), b.plan());

        let mut sorted = a.plan().to_vec();
        sorted.sort();
        assert_eq!(sorted, Variant::ALL.to_vec());
    }

    #[test]
    fn test_nothing_runs_before_start() {
        let mut s = session(&[Variant::Towers], 1);
        assert!(!s.is_started());
        assert_eq!(s.current_variant(), Some(Variant::Towers));
        assert!(s.next_timer_due().is_none());

        assert_eq!(s.submit(GameInput::Number { value: 3 }), AnswerOutcome::Neutral);
        s.advance_time(10_000);
        assert!(!s.accepting_input());
        assert!(s.inputs().is_empty());
    }

    #[test]
    fn test_strike_out_advances_to_end() {
        let mut s = session(&[Variant::Towers], 2);
        s.start();

        for _ in 0..3 {
            assert!(s.run_until_input());
            assert!(matches!(s.snapshot().view, Some(VariantView::Towers(_))));
            // No bank entry needs this many moves
            assert_eq!(s.submit(GameInput::Number { value: 999 }), AnswerOutcome::Incorrect);
        }
        assert!(!s.run_until_input());

        assert!(s.is_ended());
        assert_eq!(s.current_variant(), None);
        let record = s.results().get(Variant::Towers).unwrap();
        assert_eq!(record.percentage_correct, Some(0.0));

        let events = s.take_events();
        let completed = events
            .iter()
            .filter(|e| matches!(e.data, SessionEventData::InstanceCompleted { .. }))
            .count();
        assert_eq!(completed, 1);
        assert!(matches!(
            events.last().map(|e| &e.data),
            Some(SessionEventData::SessionEnded { completed: 1 })
        ));
    }

    #[test]
    fn test_force_advance_cancels_old_timers() {
        let mut s = session(&[Variant::Towers, Variant::Definitions], 3);
        s.start();
        let first = s.current_variant().unwrap();
        assert!(s.next_timer_due().is_some());
        let old_epoch = s.epoch;

        s.force_advance();
        assert_ne!(s.current_variant(), Some(first));
        assert!(s.timers.iter().all(|(_, epoch, _)| epoch != old_epoch));
        assert!(s.results().get(first).is_some());

        s.force_advance();
        assert!(s.is_ended());
        assert_eq!(s.results().len(), 2);
        assert!(s.timers.is_empty());
    }

    #[test]
    fn test_stale_timer_is_dropped() {
        let mut s = session(&[Variant::Towers], 4);
        s.start();
        let stale = Epoch(s.epoch.0 - 1);
        s.timers.schedule(s.now + 10, stale, GameTimer::Settle);
        assert_eq!(s.timers.len(), 2);

        // A live Settle would queue another Generate
        s.advance_time(10);
        assert_eq!(s.timers.len(), 1);
        assert_eq!(s.snapshot().phase, Some(Phase::Generating));
    }

    #[test]
    fn test_invalid_input_is_neutral_and_logged() {
        let mut s = session(&[Variant::Towers], 6);
        s.start();
        assert!(s.run_until_input());

        assert_eq!(s.submit(GameInput::Choose { option: 0 }), AnswerOutcome::Neutral);
        assert!(s.accepting_input());
        let rejected = s
            .take_events()
            .into_iter()
            .any(|e| matches!(e.data, SessionEventData::InputRejected { variant: Variant::Towers, .. }));
        assert!(rejected);
    }

    #[test]
    fn test_snapshot_tracks_active_instance() {
        let mut s = session(&[Variant::Towers], 8);
        let idle = s.snapshot();
        assert!(!idle.started);
        assert_eq!(idle.position, Some(0));
        assert_eq!(idle.phase, Some(Phase::Idle));

        s.start();
        s.run_until_input();
        let live = s.snapshot();
        assert!(live.accepting_input);
        assert_eq!(live.phase, Some(Phase::AcceptingInput));
        assert_eq!(live.now_ms, 1000);

        s.force_advance();
        let done = s.snapshot();
        assert!(done.ended);
        assert_eq!(done.variant, None);
        assert_eq!(done.position, None);
    }

    #[test]
    fn test_replay_reproduces_hash() {
        let plan = [Variant::Towers, Variant::Colors];
        let mut s = session(&plan, 11);
        s.start();
        for _ in 0..4 {
            if !s.run_until_input() {
                break;
            }
            s.submit(GameInput::Choose { option: 1 });
            s.submit(GameInput::Number { value: 2 });
        }
        s.force_advance();
        s.advance_time(500);

        let mut replayed =
            replay_session(&plan, ContentBank::builtin(), SessionConfig::seeded(11), s.inputs()).unwrap();
        replayed.advance_to(s.now());

        assert_eq!(replayed.compute_hash(), s.compute_hash());
        assert_eq!(replayed.results(), s.results());
    }

    #[test]
    fn test_hash_depends_on_seed() {
        let a = session(&[Variant::Towers], 1);
        let b = session(&[Variant::Towers], 2);
        assert_ne!(a.compute_hash(), b.compute_hash());
    }
}
