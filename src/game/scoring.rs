//! Scoring Policy
//!
//! The shared answer-scoring rule used by every question-based variant:
//! close input, cue, award points, count the question, then settle.

use crate::game::context::{GameContext, GameTimer};
use crate::game::events::Cue;
use crate::game::state::{AnswerOutcome, GameCore, Phase};

/// Incorrect answers that end an instance.
pub const STRIKE_LIMIT: u32 = 3;

/// Progress awarded per answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Points {
    /// Points for a correct answer.
    pub correct: u32,
    /// Points for an incorrect answer.
    pub incorrect: u32,
}

impl Points {
    /// 20 for correct, 10 for incorrect.
    pub const STANDARD: Self = Self { correct: 20, incorrect: 10 };
    /// 10 either way; ten questions complete the instance.
    pub const PER_QUESTION: Self = Self { correct: 10, incorrect: 10 };
    /// 17 per solved maths line; six lines complete the grid.
    pub const MATHS_LINE: Self = Self { correct: 17, incorrect: 0 };
    /// Points per reaction tap.
    pub const REACTION: u32 = 20;
    /// Points per detection tick.
    pub const DETECTION_TICK: u32 = 1;
}

/// Score one answer and schedule the settle delay.
///
/// Input is closed before anything else, so a second submission during the
/// settle window is a no-op.
pub fn score_answer(
    core: &mut GameCore,
    ctx: &mut GameContext<'_>,
    correct: bool,
    points: Points,
) -> AnswerOutcome {
    ctx.set_phase(core, Phase::Settling);

    if correct {
        core.record_correct();
        ctx.cue(Cue::Correct);
        core.award_points(points.correct);
    } else {
        ctx.cue(Cue::Incorrect);
        core.award_points(points.incorrect);
    }

    ctx.answered(core, true);

    let outcome = if correct { AnswerOutcome::Correct } else { AnswerOutcome::Incorrect };
    ctx.scored(core, outcome);

    let settle = ctx.timing().settle_ms;
    ctx.schedule(settle, GameTimer::Settle);

    outcome
}
