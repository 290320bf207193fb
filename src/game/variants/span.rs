//! Span Recall (Squares, Numbers)
//!
//! A sequence of `span` symbols is revealed one at a time, then entered back
//! in order. A perfect round grows the span by two. Squares draws from the
//! 16 squares of a 4x4 grid, Numbers from the digits 0-9. Neither repeats a
//! symbol back to back.

use serde::Serialize;

use crate::core::hash::StateHasher;
use crate::core::sample::sequence_without_adjacent_repeats;
use crate::game::context::{GameContext, GameTimer};
use crate::game::events::Cue;
use crate::game::input::{GameInput, InputError};
use crate::game::registry::Variant;
use crate::game::scoring::{score_answer, Points};
use crate::game::state::{AnswerOutcome, GameCore, Phase};
use crate::game::view::VariantView;
use crate::game::{unsupported, Game};

/// Span growth per perfect round.
pub const SPAN_GROWTH: u32 = 2;

/// Which symbol set a span game uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// Squares 1..=16.
    Squares,
    /// Digits 0..=9.
    Numbers,
}

impl SpanKind {
    /// Smallest and largest symbol.
    pub fn range(self) -> (u32, u32) {
        match self {
            SpanKind::Squares => (1, 16),
            SpanKind::Numbers => (0, 9),
        }
    }

    fn alphabet(self) -> Vec<u32> {
        let (min, max) = self.range();
        (min..=max).collect()
    }
}

/// Visible span state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpanView {
    /// Symbol set.
    pub kind: SpanKind,
    /// Current span.
    pub span: u32,
    /// Symbol on display during the reveal.
    pub showing: Option<u32>,
    /// Symbols entered correctly so far this round.
    pub entered: usize,
}

/// Span recall game.
#[derive(Clone, Debug)]
pub struct SpanGame {
    kind: SpanKind,
    core: GameCore,
    sequence: Vec<u32>,
    cursor: usize,
}

impl SpanGame {
    /// New instance.
    pub fn new(kind: SpanKind) -> Self {
        Self {
            kind,
            core: GameCore::new(),
            sequence: Vec::new(),
            cursor: 0,
        }
    }

    /// Symbols of the current round.
    pub fn sequence(&self) -> &[u32] {
        &self.sequence
    }

    fn begin_round(&mut self, ctx: &mut GameContext<'_>) {
        self.sequence.clear();
        self.cursor = 0;
        ctx.set_phase(&mut self.core, Phase::Generating);
        let delay = ctx.timing().generate_delay_ms;
        ctx.schedule(delay, GameTimer::Generate);
    }

    fn generate(&mut self, ctx: &mut GameContext<'_>) {
        let alphabet = self.kind.alphabet();
        self.sequence = sequence_without_adjacent_repeats(ctx.rng(), &alphabet, self.core.span() as usize);
        self.cursor = 0;
        ctx.set_phase(&mut self.core, Phase::Revealing);
        self.reveal_current(ctx);
    }

    fn reveal_current(&mut self, ctx: &mut GameContext<'_>) {
        ctx.cue(Cue::Reveal);
        let step = ctx.timing().span_reveal_ms;
        ctx.schedule(step, GameTimer::RevealStep);
    }

    fn reveal_step(&mut self, ctx: &mut GameContext<'_>) {
        if self.cursor + 1 < self.sequence.len() {
            self.cursor += 1;
            self.reveal_current(ctx);
        } else {
            self.cursor = 0;
            ctx.set_phase(&mut self.core, Phase::AcceptingInput);
        }
    }

    fn entered_value(&self, input: &GameInput) -> Result<u32, InputError> {
        let value = match (self.kind, input) {
            (SpanKind::Squares, GameInput::Square { square }) => *square as u32,
            (SpanKind::Numbers, GameInput::Number { value }) => *value,
            _ => return Err(unsupported(self.variant(), input)),
        };

        let (min, max) = self.kind.range();
        if !(min..=max).contains(&value) {
            return Err(InputError::ValueOutOfRange { value, min, max });
        }
        Ok(value)
    }
}

impl Game for SpanGame {
    fn variant(&self) -> Variant {
        match self.kind {
            SpanKind::Squares => Variant::Squares,
            SpanKind::Numbers => Variant::Numbers,
        }
    }

    fn core(&self) -> &GameCore {
        &self.core
    }

    fn start(&mut self, ctx: &mut GameContext<'_>) {
        self.begin_round(ctx);
    }

    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameContext<'_>) {
        match timer {
            GameTimer::Generate => self.generate(ctx),
            GameTimer::RevealStep => self.reveal_step(ctx),
            GameTimer::Settle => {
                if !ctx.check_completion(&mut self.core) {
                    self.begin_round(ctx);
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self, input: &GameInput, ctx: &mut GameContext<'_>) -> Result<AnswerOutcome, InputError> {
        let value = self.entered_value(input)?;
        let expected = *self.sequence.get(self.cursor).ok_or(InputError::NoActiveQuestion)?;

        if value == expected && self.cursor + 1 < self.sequence.len() {
            self.cursor += 1;
            return Ok(AnswerOutcome::Neutral);
        }

        let correct = value == expected;
        if correct {
            self.core.grow_span(SPAN_GROWTH);
        }
        Ok(score_answer(&mut self.core, ctx, correct, Points::STANDARD))
    }

    fn view(&self) -> VariantView {
        let view = SpanView {
            kind: self.kind,
            span: self.core.span(),
            showing: (self.core.phase() == Phase::Revealing)
                .then(|| self.sequence.get(self.cursor).copied())
                .flatten(),
            entered: if self.core.accepting_input() { self.cursor } else { 0 },
        };
        match self.kind {
            SpanKind::Squares => VariantView::Squares(view),
            SpanKind::Numbers => VariantView::Numbers(view),
        }
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        self.core.hash_into(hasher);
        hasher.update_usize(self.sequence.len());
        for symbol in &self.sequence {
            hasher.update_u32(*symbol);
        }
        hasher.update_usize(self.cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::harness::Harness;
    use proptest::prelude::*;

    fn entry(kind: SpanKind, value: u32) -> GameInput {
        match kind {
            SpanKind::Squares => GameInput::Square { square: value as u8 },
            SpanKind::Numbers => GameInput::Number { value },
        }
    }

    fn play_round(h: &mut Harness<SpanGame>, correct: bool) -> AnswerOutcome {
        assert!(h.run_until_accepting());
        let kind = h.game.kind;
        let sequence = h.game.sequence().to_vec();
        let last = sequence.len() - 1;

        for (i, symbol) in sequence.iter().enumerate() {
            let value = if correct || i < last {
                *symbol
            } else {
                let (min, max) = kind.range();
                if *symbol == max { min } else { symbol + 1 }
            };
            let outcome = h.submit(entry(kind, value)).unwrap();
            if i < last {
                assert_eq!(outcome, AnswerOutcome::Neutral);
            } else {
                return outcome;
            }
        }
        unreachable!("sequence is never empty")
    }

    #[test]
    fn test_reveal_timing() {
        let mut h = Harness::new(SpanGame::new(SpanKind::Squares), 5);
        h.start();

        // 1s generate delay, then two 1s reveal steps
        h.advance(1000);
        assert_eq!(h.game.core().phase(), Phase::Revealing);
        assert_eq!(h.game.sequence().len(), 2);
        h.advance(1000);
        assert!(!h.game.core().accepting_input());
        h.advance(1000);
        assert!(h.game.core().accepting_input());
        assert_eq!(h.cues().iter().filter(|c| **c == Cue::Reveal).count(), 2);
    }

    #[test]
    fn test_perfect_round_grows_span() {
        let mut h = Harness::new(SpanGame::new(SpanKind::Numbers), 12);
        h.start();

        assert_eq!(play_round(&mut h, true), AnswerOutcome::Correct);
        assert_eq!(h.game.core().span(), 4);
        assert_eq!(h.game.core().progress(), 20);

        assert_eq!(play_round(&mut h, false), AnswerOutcome::Incorrect);
        assert_eq!(h.game.core().span(), 4);
        assert_eq!(h.game.core().progress(), 30);
    }

    #[test]
    fn test_early_mistake_ends_round() {
        let mut h = Harness::new(SpanGame::new(SpanKind::Squares), 2);
        h.start();
        h.run_until_accepting();

        let first = h.game.sequence()[0];
        let wrong = if first == 16 { 1 } else { first + 1 };
        assert_eq!(h.submit(entry(SpanKind::Squares, wrong)), Ok(AnswerOutcome::Incorrect));
        assert!(!h.game.core().accepting_input());
        assert_eq!(h.game.core().total_answered(), 1);
    }

    #[test]
    fn test_out_of_range_square_rejected() {
        let mut h = Harness::new(SpanGame::new(SpanKind::Squares), 2);
        h.start();
        h.run_until_accepting();

        let err = h.submit(GameInput::Square { square: 17 }).unwrap_err();
        assert_eq!(err, InputError::ValueOutOfRange { value: 17, min: 1, max: 16 });
        let err = h.submit(GameInput::Number { value: 3 }).unwrap_err();
        assert!(matches!(err, InputError::Unsupported { .. }));
    }

    #[test]
    fn test_three_strikes_complete_and_report_span() {
        let mut h = Harness::new(SpanGame::new(SpanKind::Numbers), 4);
        h.start();

        play_round(&mut h, true);
        for _ in 0..3 {
            play_round(&mut h, false);
        }
        h.run_all();

        assert_eq!(h.completions, 1);
        let record = h.game.finalize();
        assert_eq!(record.max_span, Some(2));
        assert_eq!(record.percentage_correct, Some(0.25));
        assert_eq!(record.average_response_time, None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_span_is_two_plus_two_k(seed in any::<u64>(), k in 0usize..4) {
            let mut h = Harness::new(SpanGame::new(SpanKind::Squares), seed);
            h.start();

            let mut last_span = h.game.core().span();
            for _ in 0..k {
                play_round(&mut h, true);
                prop_assert!(h.game.core().span() >= last_span);
                last_span = h.game.core().span();
            }

            prop_assert_eq!(h.game.core().span(), 2 + 2 * k as u32);
            for pair in h.game.sequence().windows(2) {
                prop_assert_ne!(pair[0], pair[1]);
            }
        }
    }
}
