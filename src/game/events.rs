//! Session Events
//!
//! Events generated while a session runs, for presentation layers and
//! replay inspection. Every event is stamped with the logical clock.

use serde::{Serialize, Deserialize};

use crate::core::schedule::Millis;
use crate::game::registry::Variant;
use crate::game::state::{AnswerOutcome, Phase, ResultRecord};

/// Named audio cue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Answer scored correct.
    Correct,
    /// Answer scored incorrect.
    Incorrect,
    /// A stimulus was revealed.
    Reveal,
    /// Neutral interaction.
    Click,
    /// A timed round ran out.
    RoundFinished,
    /// Strike limit reached.
    SessionOver,
}

/// Session event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEventData {
    /// A new instance was created.
    InstanceCreated {
        variant: Variant,
        /// Position in the shuffled plan.
        position: usize,
    },

    /// An instance began generating its first stimulus.
    InstanceStarted {
        variant: Variant,
    },

    /// An instance changed phase.
    PhaseChanged {
        variant: Variant,
        from: Phase,
        to: Phase,
    },

    /// A cue was sent to the audio port.
    CuePlayed {
        cue: Cue,
    },

    /// A submission was scored.
    AnswerScored {
        variant: Variant,
        outcome: AnswerOutcome,
        progress: u32,
    },

    /// Strike limit reached.
    StruckOut {
        variant: Variant,
        incorrect: u32,
    },

    /// A submission failed validation and was ignored.
    InputRejected {
        variant: Variant,
        reason: String,
    },

    /// The instance was abandoned by a forced advance.
    InstanceSkipped {
        variant: Variant,
    },

    /// An instance finished and its record was stored.
    InstanceCompleted {
        variant: Variant,
        record: ResultRecord,
    },

    /// Every planned variant has a record.
    SessionEnded {
        completed: usize,
    },
}

/// A session event with its timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Logical time the event occurred.
    pub at_ms: Millis,

    /// Event data.
    pub data: SessionEventData,
}

impl SessionEvent {
    /// Create a new event.
    pub fn new(at_ms: Millis, data: SessionEventData) -> Self {
        Self { at_ms, data }
    }

    /// Create instance created event.
    pub fn instance_created(at_ms: Millis, variant: Variant, position: usize) -> Self {
        Self::new(at_ms, SessionEventData::InstanceCreated { variant, position })
    }

    /// Create instance started event.
    pub fn instance_started(at_ms: Millis, variant: Variant) -> Self {
        Self::new(at_ms, SessionEventData::InstanceStarted { variant })
    }

    /// Create phase changed event.
    pub fn phase_changed(at_ms: Millis, variant: Variant, from: Phase, to: Phase) -> Self {
        Self::new(at_ms, SessionEventData::PhaseChanged { variant, from, to })
    }

    /// Create cue played event.
    pub fn cue_played(at_ms: Millis, cue: Cue) -> Self {
        Self::new(at_ms, SessionEventData::CuePlayed { cue })
    }

    /// Create answer scored event.
    pub fn answer_scored(at_ms: Millis, variant: Variant, outcome: AnswerOutcome, progress: u32) -> Self {
        Self::new(at_ms, SessionEventData::AnswerScored { variant, outcome, progress })
    }

    /// Create struck out event.
    pub fn struck_out(at_ms: Millis, variant: Variant, incorrect: u32) -> Self {
        Self::new(at_ms, SessionEventData::StruckOut { variant, incorrect })
    }

    /// Create input rejected event.
    pub fn input_rejected(at_ms: Millis, variant: Variant, reason: impl Into<String>) -> Self {
        Self::new(at_ms, SessionEventData::InputRejected { variant, reason: reason.into() })
    }

    /// Create instance skipped event.
    pub fn instance_skipped(at_ms: Millis, variant: Variant) -> Self {
        Self::new(at_ms, SessionEventData::InstanceSkipped { variant })
    }

    /// Create instance completed event.
    pub fn instance_completed(at_ms: Millis, variant: Variant, record: ResultRecord) -> Self {
        Self::new(at_ms, SessionEventData::InstanceCompleted { variant, record })
    }

    /// Create session ended event.
    pub fn session_ended(at_ms: Millis, completed: usize) -> Self {
        Self::new(at_ms, SessionEventData::SessionEnded { completed })
    }

    /// The cue carried by this event, if any.
    pub fn cue(&self) -> Option<Cue> {
        match self.data {
            SessionEventData::CuePlayed { cue } => Some(cue),
            _ => None,
        }
    }
}

// =============================================================================
// AUDIO PORT
// =============================================================================

/// Sink for audio cues. Cues have no effect on game state.
pub trait CuePort {
    /// Play a cue.
    fn play(&mut self, cue: Cue);
}

/// Drops every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentCues;

impl CuePort for SilentCues {
    fn play(&mut self, _cue: Cue) {}
}

/// Logs every cue at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingCues;

impl CuePort for TracingCues {
    fn play(&mut self, cue: Cue) {
        tracing::debug!(?cue, "cue");
    }
}
