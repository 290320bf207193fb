//! Definitions
//!
//! A word is shown with four definitions; pick the right one.

use serde::Serialize;

use crate::content::{ContentBank, ContentError, DefinitionEntry, DEFINITION_OPTIONS};
use crate::core::hash::StateHasher;
use crate::core::rng::DeterministicRng;
use crate::core::sample::sample_distinct;
use crate::game::context::{GameContext, GameTimer};
use crate::game::events::Cue;
use crate::game::input::{GameInput, InputError};
use crate::game::registry::Variant;
use crate::game::scoring::{score_answer, Points};
use crate::game::state::{AnswerOutcome, GameCore, Phase};
use crate::game::view::VariantView;
use crate::game::{check_option, unsupported, Game};

/// Visible definitions state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DefinitionsView {
    /// Word being defined.
    pub word: Option<String>,
    /// Candidate definitions.
    pub options: Vec<String>,
}

/// Vocabulary game.
#[derive(Clone, Debug)]
pub struct Definitions {
    core: GameCore,
    questions: Vec<DefinitionEntry>,
    current: Option<usize>,
    options: Vec<String>,
}

impl Definitions {
    /// Build from the definitions bank, shuffled.
    pub fn new(content: &ContentBank, rng: &mut DeterministicRng) -> Result<Self, ContentError> {
        content.validate(Variant::Definitions)?;
        let mut questions = content.definitions.clone();
        rng.shuffle(&mut questions);

        Ok(Self {
            core: GameCore::new(),
            questions,
            current: None,
            options: Vec::new(),
        })
    }

    /// The entry on display.
    pub fn current_entry(&self) -> Option<&DefinitionEntry> {
        self.questions.get(self.current?)
    }

    /// Candidate definitions.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    fn next_question(&mut self, ctx: &mut GameContext<'_>) {
        self.current = None;
        self.options.clear();
        ctx.set_phase(&mut self.core, Phase::Generating);
        let delay = ctx.timing().generate_delay_ms;
        ctx.schedule(delay, GameTimer::Generate);
    }

    fn generate(&mut self, ctx: &mut GameContext<'_>) {
        if self.questions.is_empty() {
            return;
        }
        let index = self.core.total_answered() as usize % self.questions.len();
        let entry = &self.questions[index];

        let others: Vec<String> = self
            .questions
            .iter()
            .filter(|other| other.word != entry.word)
            .map(|other| other.definition.clone())
            .collect();

        let mut options = vec![entry.definition.clone()];
        options.extend(sample_distinct(ctx.rng(), &others, DEFINITION_OPTIONS - 1));
        ctx.rng().shuffle(&mut options);

        ctx.cue(Cue::Reveal);
        self.current = Some(index);
        self.options = options;
        ctx.set_phase(&mut self.core, Phase::AcceptingInput);
    }
}

impl Game for Definitions {
    fn variant(&self) -> Variant {
        Variant::Definitions
    }

    fn core(&self) -> &GameCore {
        &self.core
    }

    fn start(&mut self, ctx: &mut GameContext<'_>) {
        self.next_question(ctx);
    }

    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameContext<'_>) {
        match timer {
            GameTimer::Generate => self.generate(ctx),
            GameTimer::Settle => {
                if !ctx.check_completion(&mut self.core) {
                    self.next_question(ctx);
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self, input: &GameInput, ctx: &mut GameContext<'_>) -> Result<AnswerOutcome, InputError> {
        let GameInput::Choose { option } = *input else {
            return Err(unsupported(self.variant(), input));
        };
        let index = check_option(option, self.options.len())?;
        let entry = self.current_entry().ok_or(InputError::NoActiveQuestion)?;

        let correct = self.options[index] == entry.definition;
        Ok(score_answer(&mut self.core, ctx, correct, Points::STANDARD))
    }

    fn view(&self) -> VariantView {
        VariantView::Definitions(DefinitionsView {
            word: self.current_entry().map(|entry| entry.word.clone()),
            options: self.options.clone(),
        })
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        self.core.hash_into(hasher);
        hasher.update_option(self.current, |h, index| h.update_usize(index));
        for option in &self.options {
            hasher.update_str(option);
        }
    }
}
