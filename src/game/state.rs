//! Shared Game State
//!
//! Running totals every variant carries, and the primitives that mutate
//! them. Variants own a [`GameCore`] and never touch its counters directly.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::game::scoring::STRIKE_LIMIT;

/// Span every memory variant starts at.
pub const INITIAL_SPAN: u32 = 2;

/// Progress value at which an instance completes.
pub const MAX_PROGRESS: u32 = 100;

/// Phase of one game instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Created, not started.
    #[default]
    Idle,
    /// Waiting out the delay before a stimulus is drawn.
    Generating,
    /// Stimulus being shown; no input.
    Revealing,
    /// Input gate open.
    AcceptingInput,
    /// Round closed, tallying before completion.
    Scoring,
    /// Post-answer feedback pause.
    Settling,
    /// Completion signalled.
    Completed,
}

impl Phase {
    /// Lowercase name, for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Generating => "generating",
            Phase::Revealing => "revealing",
            Phase::AcceptingInput => "accepting_input",
            Phase::Scoring => "scoring",
            Phase::Settling => "settling",
            Phase::Completed => "completed",
        }
    }
}

/// Result of one submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// Scored correct.
    Correct,
    /// Scored incorrect.
    Incorrect,
    /// Ignored or not yet scorable.
    Neutral,
}

/// Which result fields a variant reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedFields {
    /// Percentage correct.
    pub percentage: bool,
    /// Average response time.
    pub time: bool,
    /// Span achieved.
    pub span: bool,
}

impl ReportedFields {
    /// Percentage only.
    pub const PERCENTAGE: Self = Self { percentage: true, time: false, span: false };
    /// Average time only.
    pub const TIME: Self = Self { percentage: false, time: true, span: false };
    /// Percentage and average time.
    pub const PERCENTAGE_AND_TIME: Self = Self { percentage: true, time: true, span: false };
    /// Percentage and span.
    pub const PERCENTAGE_AND_SPAN: Self = Self { percentage: true, time: false, span: true };
}

/// Normalized result of one completed instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Fraction of answered questions that were correct, in [0, 1].
    pub percentage_correct: Option<f64>,
    /// Mean response time in seconds.
    pub average_response_time: Option<f64>,
    /// Span reached above the starting span.
    pub max_span: Option<u32>,
}

impl ResultRecord {
    /// Record with only a percentage.
    pub const fn percentage(value: f64) -> Self {
        Self { percentage_correct: Some(value), average_response_time: None, max_span: None }
    }

    pub(crate) fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_option(self.percentage_correct, |h, v| h.update_f64(v));
        hasher.update_option(self.average_response_time, |h, v| h.update_f64(v));
        hasher.update_option(self.max_span, |h, v| h.update_u32(v));
    }
}

/// Running totals shared by every variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameCore {
    num_correct: u32,
    total_answered: u32,
    progress: u32,
    elapsed_times: Vec<f64>,
    span: u32,
    phase: Phase,
    completed: bool,
    struck_out: bool,
}

impl Default for GameCore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameCore {
    /// Fresh totals.
    pub fn new() -> Self {
        Self {
            num_correct: 0,
            total_answered: 0,
            progress: 0,
            elapsed_times: Vec::new(),
            span: INITIAL_SPAN,
            phase: Phase::Idle,
            completed: false,
            struck_out: false,
        }
    }

    // ===== Accessors =====

    /// Correct answers so far.
    pub fn num_correct(&self) -> u32 {
        self.num_correct
    }

    /// Answers counted so far.
    pub fn total_answered(&self) -> u32 {
        self.total_answered
    }

    /// Incorrect answers (strikes) so far.
    pub fn num_incorrect(&self) -> u32 {
        self.total_answered - self.num_correct
    }

    /// Progress in [0, 100].
    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Response-time samples in seconds.
    pub fn elapsed_times(&self) -> &[f64] {
        &self.elapsed_times
    }

    /// Current memory span.
    pub fn span(&self) -> u32 {
        self.span
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The input gate. Open only in [`Phase::AcceptingInput`].
    pub fn accepting_input(&self) -> bool {
        self.phase == Phase::AcceptingInput
    }

    /// Whether the strike limit has been reached.
    pub fn is_struck_out(&self) -> bool {
        self.struck_out
    }

    /// Whether completion has been signalled.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    // ===== Mutators =====

    /// Add progress, clamped to 100. Never decreases.
    pub fn award_points(&mut self, points: u32) {
        self.progress = self.progress.saturating_add(points).min(MAX_PROGRESS);
    }

    /// Count a correct answer.
    pub fn record_correct(&mut self) {
        self.num_correct += 1;
    }

    /// Count an answered question.
    ///
    /// With `check_strikes`, reaching the strike limit forces progress to 100.
    /// Returns true only for the answer that first reached the limit.
    pub fn record_answered(&mut self, check_strikes: bool) -> bool {
        self.total_answered += 1;

        if !check_strikes || self.num_incorrect() < STRIKE_LIMIT {
            return false;
        }
        self.progress = MAX_PROGRESS;
        !std::mem::replace(&mut self.struck_out, true)
    }

    /// Append a response-time sample (seconds).
    pub fn record_response_time(&mut self, seconds: f64) {
        self.elapsed_times.push(seconds);
    }

    /// Grow the memory span.
    pub fn grow_span(&mut self, delta: u32) {
        self.span += delta;
    }

    /// Move to a new phase, returning the old one.
    ///
    /// A completed instance stays completed.
    pub fn set_phase(&mut self, phase: Phase) -> Phase {
        let old = self.phase;
        if !self.completed {
            self.phase = phase;
        }
        old
    }

    /// Fire `on_complete` the first time progress is at 100.
    ///
    /// Returns true whenever progress is at 100, including after the first call.
    pub fn check_completion<F: FnOnce()>(&mut self, on_complete: F) -> bool {
        if self.progress < MAX_PROGRESS {
            return false;
        }

        self.progress = MAX_PROGRESS;
        if !self.completed {
            self.completed = true;
            self.phase = Phase::Completed;
            on_complete();
        }
        true
    }

    /// Fold the totals into a result record, keeping only `reported` fields.
    ///
    /// Percentage is absent when nothing was answered; average time is absent
    /// when there are no samples.
    pub fn finalize(&self, reported: ReportedFields) -> ResultRecord {
        let percentage_correct = (reported.percentage && self.total_answered > 0)
            .then(|| self.num_correct as f64 / self.total_answered as f64);

        let average_response_time = (reported.time && !self.elapsed_times.is_empty())
            .then(|| self.elapsed_times.iter().sum::<f64>() / self.elapsed_times.len() as f64);

        let max_span = reported.span.then(|| self.span - INITIAL_SPAN);

        ResultRecord {
            percentage_correct,
            average_response_time,
            max_span,
        }
    }

    pub(crate) fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.num_correct);
        hasher.update_u32(self.total_answered);
        hasher.update_u32(self.progress);
        hasher.update_u32(self.elapsed_times.len() as u32);
        for time in &self.elapsed_times {
            hasher.update_f64(*time);
        }
        hasher.update_u32(self.span);
        hasher.update_str(self.phase.as_str());
        hasher.update_bool(self.completed);
        hasher.update_bool(self.struck_out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_clamp_at_100() {
        let mut core = GameCore::new();
        for _ in 0..7 {
            core.award_points(17);
        }
        assert_eq!(core.progress(), 100);
    }

    #[test]
    fn test_third_strike_forces_completion_progress() {
        let mut core = GameCore::new();
        core.award_points(10);

        assert!(!core.record_answered(true));
        assert!(!core.record_answered(true));
        assert_eq!(core.progress(), 10);

        assert!(core.record_answered(true));
        assert_eq!(core.progress(), 100);
        assert_eq!(core.num_incorrect(), 3);
        assert!(core.is_struck_out());
    }

    #[test]
    fn test_strike_out_reported_once() {
        let mut core = GameCore::new();
        for _ in 0..3 {
            core.record_answered(true);
        }
        assert!(!core.record_answered(true));
        assert!(!core.record_answered(true));
        assert_eq!(core.num_incorrect(), 5);
        assert_eq!(core.progress(), 100);
    }

    #[test]
    fn test_unchecked_answers_never_strike() {
        let mut core = GameCore::new();
        for _ in 0..5 {
            assert!(!core.record_answered(false));
        }
        assert_eq!(core.progress(), 0);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut core = GameCore::new();
        let mut fired = 0;

        assert!(!core.check_completion(|| fired += 1));
        core.award_points(100);
        assert!(core.check_completion(|| fired += 1));
        assert!(core.check_completion(|| fired += 1));
        assert!(core.check_completion(|| fired += 1));

        assert_eq!(fired, 1);
        assert_eq!(core.phase(), Phase::Completed);
    }

    #[test]
    fn test_completed_phase_is_sticky() {
        let mut core = GameCore::new();
        core.award_points(100);
        core.check_completion(|| {});

        core.set_phase(Phase::AcceptingInput);
        assert!(!core.accepting_input());
    }

    #[test]
    fn test_finalize_zero_answered_is_absent() {
        let core = GameCore::new();
        let record = core.finalize(ReportedFields::PERCENTAGE_AND_TIME);
        assert_eq!(record.percentage_correct, None);
        assert_eq!(record.average_response_time, None);
        assert_eq!(record.max_span, None);
    }

    #[test]
    fn test_finalize_keeps_reported_fields_only() {
        let mut core = GameCore::new();
        core.record_correct();
        core.record_answered(true);
        core.record_answered(true);
        core.record_response_time(0.5);
        core.record_response_time(1.5);
        core.grow_span(4);

        let all = ReportedFields { percentage: true, time: true, span: true };
        let record = core.finalize(all);
        assert_eq!(record.percentage_correct, Some(0.5));
        assert_eq!(record.average_response_time, Some(1.0));
        assert_eq!(record.max_span, Some(4));

        let time_only = core.finalize(ReportedFields::TIME);
        assert_eq!(time_only.percentage_correct, None);
        assert_eq!(time_only.average_response_time, Some(1.0));
        assert_eq!(time_only.max_span, None);
    }
}
