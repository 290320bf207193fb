//! Towers
//!
//! Given a start and goal arrangement of disks on three rods, enter the
//! fewest moves that turn one into the other.

use serde::Serialize;

use crate::content::{ContentBank, ContentError, TowerConfig, TowerQuestion};
use crate::core::hash::StateHasher;
use crate::core::rng::DeterministicRng;
use crate::game::context::{GameContext, GameTimer};
use crate::game::events::Cue;
use crate::game::input::{GameInput, InputError};
use crate::game::registry::Variant;
use crate::game::scoring::{score_answer, Points};
use crate::game::state::{AnswerOutcome, GameCore, Phase};
use crate::game::view::VariantView;
use crate::game::{unsupported, Game};

/// Questions kept from the shuffled bank.
pub const QUESTIONS_PER_INSTANCE: usize = 10;

/// Visible towers state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TowersView {
    /// Starting rods, bottom to top.
    pub start: Option<TowerConfig>,
    /// Goal rods, bottom to top.
    pub end: Option<TowerConfig>,
}

/// Tower planning game.
#[derive(Clone, Debug)]
pub struct Towers {
    core: GameCore,
    questions: Vec<TowerQuestion>,
    current: Option<usize>,
}

impl Towers {
    /// Build from the towers bank: shuffled, first ten kept.
    pub fn new(content: &ContentBank, rng: &mut DeterministicRng) -> Result<Self, ContentError> {
        content.validate(Variant::Towers)?;
        let mut questions = content.towers.clone();
        rng.shuffle(&mut questions);
        questions.truncate(QUESTIONS_PER_INSTANCE);

        Ok(Self {
            core: GameCore::new(),
            questions,
            current: None,
        })
    }

    /// The question on display.
    pub fn current_question(&self) -> Option<&TowerQuestion> {
        self.questions.get(self.current?)
    }

    fn next_question(&mut self, ctx: &mut GameContext<'_>) {
        self.current = None;
        ctx.set_phase(&mut self.core, Phase::Generating);
        let delay = ctx.timing().generate_delay_ms;
        ctx.schedule(delay, GameTimer::Generate);
    }
}

impl Game for Towers {
    fn variant(&self) -> Variant {
        Variant::Towers
    }

    fn core(&self) -> &GameCore {
        &self.core
    }

    fn start(&mut self, ctx: &mut GameContext<'_>) {
        self.next_question(ctx);
    }

    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameContext<'_>) {
        match timer {
            GameTimer::Generate => {
                if self.questions.is_empty() {
                    return;
                }
                ctx.cue(Cue::Reveal);
                self.current = Some(self.core.total_answered() as usize % self.questions.len());
                ctx.set_phase(&mut self.core, Phase::AcceptingInput);
            }
            GameTimer::Settle => {
                if !ctx.check_completion(&mut self.core) {
                    self.next_question(ctx);
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self, input: &GameInput, ctx: &mut GameContext<'_>) -> Result<AnswerOutcome, InputError> {
        let GameInput::Number { value } = *input else {
            return Err(unsupported(self.variant(), input));
        };
        let question = self.current_question().ok_or(InputError::NoActiveQuestion)?;

        let correct = value == question.minimum_moves;
        Ok(score_answer(&mut self.core, ctx, correct, Points::STANDARD))
    }

    fn view(&self) -> VariantView {
        let question = self.current_question();
        VariantView::Towers(TowersView {
            start: question.map(|q| q.start_config.clone()),
            end: question.map(|q| q.end_config.clone()),
        })
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        self.core.hash_into(hasher);
        hasher.update_option(self.current, |h, index| h.update_usize(index));
        if let Some(question) = self.current_question() {
            hasher.update_u32(question.minimum_moves);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::harness::Harness;

    fn harness(seed: u64) -> Harness<Towers> {
        let content = ContentBank::builtin();
        Harness::build(seed, |rng| Towers::new(&content, rng).unwrap())
    }

    fn answer(h: &Harness<Towers>) -> u32 {
        h.game.current_question().unwrap().minimum_moves
    }

    #[test]
    fn test_correct_move_count() {
        let mut h = harness(3);
        h.start();
        assert!(h.run_until_accepting());
        assert_eq!(h.now, 1000);

        let moves = answer(&h);
        assert_eq!(h.submit(GameInput::Number { value: moves }), Ok(AnswerOutcome::Correct));
        assert_eq!(h.game.core().progress(), 20);
    }

    #[test]
    fn test_wrong_count_then_next_question() {
        let mut h = harness(4);
        h.start();
        h.run_until_accepting();
        assert_eq!(h.game.current, Some(0));

        let moves = answer(&h);
        assert_eq!(h.submit(GameInput::Number { value: moves + 1 }), Ok(AnswerOutcome::Incorrect));
        assert!(h.game.current_question().is_some());

        h.run_until_accepting();
        assert_eq!(h.game.current, Some(1));
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let a = harness(77);
        let b = harness(77);
        assert_eq!(a.game.questions, b.game.questions);
        assert_eq!(a.game.questions.len(), 10);
    }

    #[test]
    fn test_rejects_choice_input() {
        let mut h = harness(1);
        h.start();
        h.run_until_accepting();
        let err = h.submit(GameInput::Choose { option: 0 }).unwrap_err();
        assert_eq!(err.to_string(), "towers does not accept choose input");
    }
}
