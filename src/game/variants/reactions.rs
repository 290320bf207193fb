//! Reactions
//!
//! After a random foreperiod a target appears somewhere in the play area;
//! the tap latency is the sample. No correctness is counted, so only the
//! average time is reported.

use serde::Serialize;

use crate::core::hash::StateHasher;
use crate::core::schedule::Millis;
use crate::game::context::{GameContext, GameTimer};
use crate::game::events::Cue;
use crate::game::input::{GameInput, InputError};
use crate::game::registry::Variant;
use crate::game::scoring::Points;
use crate::game::state::{AnswerOutcome, GameCore, Phase};
use crate::game::view::VariantView;
use crate::game::{unsupported, Game};

/// Target offsets are per-mille of the play area's half extent.
const TARGET_EXTENT: i32 = 1000;

/// Visible reactions state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReactionsView {
    /// Target position, if shown.
    pub target: Option<(i32, i32)>,
    /// When the target appeared.
    pub shown_at: Option<Millis>,
}

/// Reaction-time game.
#[derive(Clone, Debug, Default)]
pub struct Reactions {
    core: GameCore,
    shown_at: Option<Millis>,
    target: Option<(i32, i32)>,
}

impl Reactions {
    /// New instance.
    pub fn new() -> Self {
        Self::default()
    }

    fn wait_for_target(&mut self, ctx: &mut GameContext<'_>) {
        self.shown_at = None;
        self.target = None;
        ctx.set_phase(&mut self.core, Phase::Revealing);
        ctx.cue(Cue::Reveal);

        let (min, max) = (ctx.timing().reaction_min_ms, ctx.timing().reaction_max_ms);
        let foreperiod = ctx.rng().next_u64_range(min, max);
        ctx.schedule(foreperiod, GameTimer::ShowTarget);
    }

    fn show_target(&mut self, ctx: &mut GameContext<'_>) {
        let x = ctx.rng().next_int_range(-TARGET_EXTENT, TARGET_EXTENT);
        let y = ctx.rng().next_int_range(-TARGET_EXTENT, TARGET_EXTENT);
        self.target = Some((x, y));
        self.shown_at = Some(ctx.now());
        ctx.set_phase(&mut self.core, Phase::AcceptingInput);
    }
}

impl Game for Reactions {
    fn variant(&self) -> Variant {
        Variant::Reactions
    }

    fn core(&self) -> &GameCore {
        &self.core
    }

    fn start(&mut self, ctx: &mut GameContext<'_>) {
        self.wait_for_target(ctx);
    }

    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameContext<'_>) {
        match timer {
            GameTimer::ShowTarget => self.show_target(ctx),
            GameTimer::Settle => {
                if !ctx.check_completion(&mut self.core) {
                    self.wait_for_target(ctx);
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self, input: &GameInput, ctx: &mut GameContext<'_>) -> Result<AnswerOutcome, InputError> {
        if !matches!(input, GameInput::Tap) {
            return Err(unsupported(self.variant(), input));
        }
        let shown_at = self.shown_at.ok_or(InputError::NoActiveQuestion)?;

        ctx.set_phase(&mut self.core, Phase::Settling);
        self.target = None;

        let latency_ms = ctx.now().saturating_sub(shown_at);
        self.core.record_response_time(latency_ms as f64 / 1000.0);
        self.core.award_points(Points::REACTION);
        ctx.scored(&self.core, AnswerOutcome::Neutral);

        let settle = ctx.timing().settle_ms;
        ctx.schedule(settle, GameTimer::Settle);

        Ok(AnswerOutcome::Neutral)
    }

    fn view(&self) -> VariantView {
        VariantView::Reactions(ReactionsView {
            target: self.target,
            shown_at: self.shown_at,
        })
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        self.core.hash_into(hasher);
        hasher.update_option(self.shown_at, |h, v| h.update_u64(v));
        hasher.update_option(self.target, |h, (x, y)| {
            h.update_i64(x as i64);
            h.update_i64(y as i64);
        });
    }
}
