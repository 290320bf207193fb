//! Game Logic Module
//!
//! The contract every mini-game implements and the ten variants built on it.
//! 100% deterministic: all time comes from the logical clock and all
//! randomness from the session RNG, both reached through [`GameContext`].
//!
//! ## Module Structure
//!
//! - `state`: Shared running totals, phases, result records
//! - `scoring`: Shared answer-scoring rule and strike limit
//! - `context`: Per-dispatch access to clock, RNG, timers, cues, events
//! - `events`: Session events and the audio cue port
//! - `input`: Player input and session commands
//! - `registry`: Static variant table
//! - `view`: Presentation snapshots
//! - `variants`: The ten mini-games

pub mod state;
pub mod scoring;
pub mod context;
pub mod events;
pub mod input;
pub mod registry;
pub mod view;
pub mod variants;

#[cfg(test)]
pub(crate) mod harness;

use crate::core::hash::StateHasher;

pub use context::{GameContext, GameTimer};
pub use events::{Cue, CuePort, SessionEvent, SessionEventData, SilentCues, TracingCues};
pub use input::{GameInput, InputError, SessionInput, TimedInput};
pub use registry::{Variant, VariantInfo, REGISTRY};
pub use state::{AnswerOutcome, GameCore, Phase, ReportedFields, ResultRecord};
pub use view::VariantView;

/// One running instance of a variant.
///
/// Instances never hold references to the session. Everything they need
/// arrives through the [`GameContext`] of the current dispatch, and they
/// signal completion through [`GameContext::check_completion`].
pub trait Game: Send {
    /// Which variant this is.
    fn variant(&self) -> Variant;

    /// Shared totals.
    fn core(&self) -> &GameCore;

    /// Begin the first generate/reveal cycle.
    fn start(&mut self, ctx: &mut GameContext<'_>);

    /// A timer scheduled by this instance fired.
    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameContext<'_>);

    /// Handle a submission. Only called while input is accepted.
    fn submit(&mut self, input: &GameInput, ctx: &mut GameContext<'_>) -> Result<AnswerOutcome, InputError>;

    /// Variant-specific visible state.
    fn view(&self) -> VariantView;

    /// Feed variant state into a determinism hash.
    fn hash_into(&self, hasher: &mut StateHasher);

    /// Fold the totals into this variant's result record.
    fn finalize(&self) -> ResultRecord {
        self.core().finalize(self.variant().info().reported)
    }
}

/// Submit through the input gate.
///
/// While input is closed every submission is neutral and never reaches the
/// variant, so nothing is validated or scored.
pub fn submit_gated(
    game: &mut dyn Game,
    input: &GameInput,
    ctx: &mut GameContext<'_>,
) -> Result<AnswerOutcome, InputError> {
    if !game.core().accepting_input() {
        return Ok(AnswerOutcome::Neutral);
    }
    game.submit(input, ctx)
}

/// Error for an input kind the variant never takes.
pub(crate) fn unsupported(variant: Variant, input: &GameInput) -> InputError {
    InputError::Unsupported {
        variant,
        input: input.kind(),
    }
}

/// Check an option index against the current option count.
pub(crate) fn check_option(index: usize, len: usize) -> Result<usize, InputError> {
    if index < len {
        Ok(index)
    } else {
        Err(InputError::OptionOutOfRange { index, len })
    }
}
