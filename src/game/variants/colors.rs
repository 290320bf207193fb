//! Colors (Stroop)
//!
//! A color word is printed in some ink; the player names the ink. The ink
//! usually differs from the word and never repeats the previous question's
//! ink. Response times are recorded.

use serde::Serialize;

use crate::core::hash::StateHasher;
use crate::core::sample::choose_excluding;
use crate::core::schedule::Millis;
use crate::game::context::{GameContext, GameTimer};
use crate::game::events::Cue;
use crate::game::input::{GameInput, InputError};
use crate::game::registry::Variant;
use crate::game::scoring::{score_answer, Points};
use crate::game::state::{AnswerOutcome, GameCore, Phase};
use crate::game::view::VariantView;
use crate::game::{check_option, unsupported, Game};

/// One of the four Stroop colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ink {
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Purple.
    Purple,
    /// Red.
    Red,
}

impl Ink {
    /// All inks, in option order.
    pub const ALL: [Ink; 4] = [Ink::Blue, Ink::Green, Ink::Purple, Ink::Red];

    /// The word naming this ink.
    pub fn label(self) -> &'static str {
        match self {
            Ink::Blue => "Blue",
            Ink::Green => "Green",
            Ink::Purple => "Purple",
            Ink::Red => "Red",
        }
    }
}

/// Visible colors state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColorsView {
    /// The word shown.
    pub label: Option<Ink>,
    /// The ink it is printed in.
    pub ink: Option<Ink>,
    /// Answer options.
    pub options: [Ink; 4],
}

/// Stroop color game.
#[derive(Clone, Debug, Default)]
pub struct Colors {
    core: GameCore,
    target: Option<(Ink, Ink)>,
    previous_ink: Option<Ink>,
    shown_at: Millis,
}

impl Colors {
    /// New instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current (label, ink) pair.
    pub fn target(&self) -> Option<(Ink, Ink)> {
        self.target
    }

    fn next_color(&mut self, ctx: &mut GameContext<'_>) {
        if let Some((_, ink)) = self.target.take() {
            self.previous_ink = Some(ink);
        }
        ctx.set_phase(&mut self.core, Phase::Generating);
        let delay = ctx.timing().generate_delay_ms;
        ctx.schedule(delay, GameTimer::Generate);
    }

    fn generate(&mut self, ctx: &mut GameContext<'_>) {
        self.shown_at = ctx.now();
        ctx.cue(Cue::Reveal);

        let rng = ctx.rng();
        let label = *rng.choose(&Ink::ALL).unwrap_or(&Ink::Blue);

        // Three times in four the ink may not match the word
        let exclude_label = rng.next_int(4) != 0;
        let previous = self.previous_ink;
        let ink = choose_excluding(rng, &Ink::ALL, |&ink| {
            (exclude_label && ink == label) || Some(ink) == previous
        })
        .copied()
        .unwrap_or(label);

        self.target = Some((label, ink));
        ctx.set_phase(&mut self.core, Phase::AcceptingInput);
    }
}

impl Game for Colors {
    fn variant(&self) -> Variant {
        Variant::Colors
    }

    fn core(&self) -> &GameCore {
        &self.core
    }

    fn start(&mut self, ctx: &mut GameContext<'_>) {
        self.next_color(ctx);
    }

    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameContext<'_>) {
        match timer {
            GameTimer::Generate => self.generate(ctx),
            GameTimer::Settle => {
                if !ctx.check_completion(&mut self.core) {
                    self.next_color(ctx);
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self, input: &GameInput, ctx: &mut GameContext<'_>) -> Result<AnswerOutcome, InputError> {
        let GameInput::Choose { option } = *input else {
            return Err(unsupported(self.variant(), input));
        };
        let index = check_option(option, Ink::ALL.len())?;
        let (_, ink) = self.target.ok_or(InputError::NoActiveQuestion)?;

        let elapsed_ms = ctx.now().saturating_sub(self.shown_at);
        self.core.record_response_time(elapsed_ms as f64 / 1000.0);

        let correct = Ink::ALL[index] == ink;
        Ok(score_answer(&mut self.core, ctx, correct, Points::STANDARD))
    }

    fn view(&self) -> VariantView {
        VariantView::Colors(ColorsView {
            label: self.target.map(|(label, _)| label),
            ink: self.target.map(|(_, ink)| ink),
            options: Ink::ALL,
        })
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        self.core.hash_into(hasher);
        hasher.update_option(self.target, |h, (label, ink)| {
            h.update_str(label.label());
            h.update_str(ink.label());
        });
        hasher.update_option(self.previous_ink, |h, ink| h.update_str(ink.label()));
        hasher.update_u64(self.shown_at);
    }
}
