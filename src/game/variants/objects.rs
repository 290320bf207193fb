//! Objects
//!
//! Ten objects are shown one at a time. Each question then offers up to six
//! icons of which exactly one was in the list. Ten questions at 10 points
//! each complete the instance.

use serde::Serialize;

use crate::content::{ContentBank, ContentError, ObjectIcon, OBJECTS_PER_ROUND};
use crate::core::hash::StateHasher;
use crate::core::rng::DeterministicRng;
use crate::core::sample::choose_excluding;
use crate::game::context::{GameContext, GameTimer};
use crate::game::events::Cue;
use crate::game::input::{GameInput, InputError};
use crate::game::registry::Variant;
use crate::game::scoring::{score_answer, Points};
use crate::game::state::{AnswerOutcome, GameCore, Phase};
use crate::game::view::VariantView;
use crate::game::{check_option, unsupported, Game};

/// Distractors drawn from sets other than the answer's.
const FOREIGN_DISTRACTORS: usize = 4;

/// Visible objects state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ObjectsView {
    /// Object on display during the reveal.
    pub showing: Option<ObjectIcon>,
    /// Answer options for the current question.
    pub options: Vec<ObjectIcon>,
    /// Questions asked so far this round.
    pub asked: usize,
}

/// Short-term object memory game.
#[derive(Clone, Debug)]
pub struct Objects {
    core: GameCore,
    sets: Vec<Vec<ObjectIcon>>,
    objects: Vec<ObjectIcon>,
    options: Vec<ObjectIcon>,
    cursor: usize,
}

impl Objects {
    /// Build from the objects bank, shuffling the set order once.
    pub fn new(content: &ContentBank, rng: &mut DeterministicRng) -> Result<Self, ContentError> {
        content.validate(Variant::Objects)?;
        let mut sets = content.object_sets();
        rng.shuffle(&mut sets);

        Ok(Self {
            core: GameCore::new(),
            sets,
            objects: Vec::new(),
            options: Vec::new(),
            cursor: 0,
        })
    }

    /// Objects shown this round, in question order once the reveal ends.
    pub fn objects(&self) -> &[ObjectIcon] {
        &self.objects
    }

    /// Options of the current question.
    pub fn options(&self) -> &[ObjectIcon] {
        &self.options
    }

    fn begin_round(&mut self, ctx: &mut GameContext<'_>) {
        self.objects.clear();
        self.options.clear();
        self.cursor = 0;
        ctx.set_phase(&mut self.core, Phase::Generating);
        let delay = ctx.timing().generate_delay_ms;
        ctx.schedule(delay, GameTimer::Generate);
    }

    fn generate(&mut self, ctx: &mut GameContext<'_>) {
        let rng = ctx.rng();
        self.objects = self
            .sets
            .iter()
            .take(OBJECTS_PER_ROUND)
            .filter_map(|set| rng.choose(set).cloned())
            .collect();
        self.cursor = 0;
        ctx.set_phase(&mut self.core, Phase::Revealing);
        self.reveal_current(ctx);
    }

    fn reveal_current(&mut self, ctx: &mut GameContext<'_>) {
        ctx.cue(Cue::Reveal);
        let step = ctx.timing().object_reveal_ms;
        ctx.schedule(step, GameTimer::RevealStep);
    }

    fn reveal_step(&mut self, ctx: &mut GameContext<'_>) {
        if self.cursor + 1 < self.objects.len() {
            self.cursor += 1;
            self.reveal_current(ctx);
            return;
        }

        self.cursor = 0;
        ctx.rng().shuffle(&mut self.objects);
        self.queue_question(ctx);
    }

    fn queue_question(&mut self, ctx: &mut GameContext<'_>) {
        self.options.clear();
        ctx.set_phase(&mut self.core, Phase::Generating);
        let delay = ctx.timing().object_options_delay_ms;
        ctx.schedule(delay, GameTimer::ShowOptions);
    }

    fn show_options(&mut self, ctx: &mut GameContext<'_>) {
        let Some(answer) = self.objects.get(self.cursor).cloned() else {
            self.begin_round(ctx);
            return;
        };

        let mut options = self.build_options(ctx.rng(), &answer);
        ctx.rng().shuffle(&mut options);
        self.options = options;
        self.cursor += 1;

        ctx.cue(Cue::Reveal);
        ctx.set_phase(&mut self.core, Phase::AcceptingInput);
    }

    /// The answer, a sibling from its own set, then one unseen icon from
    /// each of the first few other sets.
    fn build_options(&self, rng: &mut DeterministicRng, answer: &ObjectIcon) -> Vec<ObjectIcon> {
        let mut options = vec![answer.clone()];

        let Some(home) = self.sets.iter().position(|set| set.contains(answer)) else {
            return options;
        };

        if let Some(sibling) = choose_excluding(rng, &self.sets[home], |icon| icon == answer) {
            options.push(sibling.clone());
        }

        let foreign: Vec<ObjectIcon> = self
            .sets
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != home)
            .filter_map(|(_, set)| choose_excluding(rng, set, |icon| self.objects.contains(icon)).cloned())
            .take(FOREIGN_DISTRACTORS)
            .collect();
        options.extend(foreign);

        options
    }
}

impl Game for Objects {
    fn variant(&self) -> Variant {
        Variant::Objects
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
            GameTimer::ShowOptions => self.show_options(ctx),
            GameTimer::Settle => {
                if ctx.check_completion(&mut self.core) {
                    return;
                }
                if self.cursor < self.objects.len() {
                    self.queue_question(ctx);
                } else {
                    self.begin_round(ctx);
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

        let correct = self.objects.contains(&self.options[index]);
        Ok(score_answer(&mut self.core, ctx, correct, Points::PER_QUESTION))
    }

    fn view(&self) -> VariantView {
        let showing = (self.core.phase() == Phase::Revealing)
            .then(|| self.objects.get(self.cursor).cloned())
            .flatten();

        VariantView::Objects(ObjectsView {
            showing,
            options: self.options.clone(),
            asked: self.cursor,
        })
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        self.core.hash_into(hasher);
        for icon in self.objects.iter().chain(&self.options) {
            hasher.update_str(&icon.name);
            hasher.update_bool(icon.flipped);
        }
        hasher.update_usize(self.cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::harness::Harness;

    fn harness(seed: u64) -> Harness<Objects> {
        let content = ContentBank::builtin();
        Harness::build(seed, |rng| Objects::new(&content, rng).unwrap())
    }

    #[test]
    fn test_reveals_ten_objects_two_seconds_each() {
        let mut h = harness(3);
        h.start();

        assert!(h.run_until_accepting());
        assert_eq!(h.game.objects().len(), 10);
        // 1s generate, 10 x 2s reveal, 0.5s before the first question
        assert_eq!(h.now, 1000 + 20_000 + 500);
        assert_eq!(h.cues().iter().filter(|c| **c == Cue::Reveal).count(), 11);
    }

    #[test]
    fn test_exactly_one_option_was_seen() {
        for seed in 0..10 {
            let mut h = harness(seed);
            h.start();
            h.run_until_accepting();

            let options = h.game.options();
            assert_eq!(options.len(), 6);
            let seen = options.iter().filter(|icon| h.game.objects().contains(icon)).count();
            assert_eq!(seen, 1, "seed {seed}");
        }
    }

    #[test]
    fn test_ten_questions_complete() {
        let mut h = harness(11);
        h.start();

        for i in 0..10 {
            assert!(h.run_until_accepting(), "question {i}");
            let wrong = h
                .game
                .options()
                .iter()
                .position(|icon| !h.game.objects().contains(icon))
                .unwrap();
            let right = h
                .game
                .options()
                .iter()
                .position(|icon| h.game.objects().contains(icon))
                .unwrap();
            let pick = if i < 2 { wrong } else { right };
            h.submit(GameInput::Choose { option: pick }).unwrap();
        }
        h.run_all();

        assert_eq!(h.completions, 1);
        assert_eq!(h.game.core().progress(), 100);
        assert_eq!(h.game.finalize().percentage_correct, Some(0.8));
    }

    #[test]
    fn test_option_out_of_range() {
        let mut h = harness(2);
        h.start();
        h.run_until_accepting();

        let err = h.submit(GameInput::Choose { option: 6 }).unwrap_err();
        assert_eq!(err, InputError::OptionOutOfRange { index: 6, len: 6 });
    }

    #[test]
    fn test_needs_ten_sets() {
        let mut content = ContentBank::builtin();
        content.objects.truncate(9);
        let mut rng = DeterministicRng::new(1);
        assert!(Objects::new(&content, &mut rng).is_err());
    }
}
