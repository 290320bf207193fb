//! Test harness driving a single game on a logical clock.

use crate::core::rng::DeterministicRng;
use crate::core::schedule::{Epoch, Millis, Scheduler};
use crate::game::context::{GameContext, GameTimer};
use crate::game::events::{Cue, SessionEvent, SessionEventData, SilentCues};
use crate::game::input::{GameInput, InputError};
use crate::game::state::AnswerOutcome;
use crate::game::{submit_gated, Game};
use crate::session::config::TimingConfig;

pub(crate) struct Harness<G: Game> {
    pub game: G,
    pub now: Millis,
    pub rng: DeterministicRng,
    pub timers: Scheduler<GameTimer>,
    pub events: Vec<SessionEvent>,
    pub timing: TimingConfig,
    pub completions: u32,
    epoch: Epoch,
    cues: SilentCues,
}

impl<G: Game> Harness<G> {
    pub fn new(game: G, seed: u64) -> Self {
        Self {
            game,
            now: 0,
            rng: DeterministicRng::new(seed),
            timers: Scheduler::new(),
            events: Vec::new(),
            timing: TimingConfig::default(),
            completions: 0,
            epoch: Epoch(1),
            cues: SilentCues,
        }
    }

    /// Build the game from the harness RNG, so content shuffles are seeded too.
    pub fn build<F>(seed: u64, make: F) -> Self
    where
        F: FnOnce(&mut DeterministicRng) -> G,
    {
        let mut rng = DeterministicRng::new(seed);
        let game = make(&mut rng);
        let mut harness = Self::new(game, seed);
        harness.rng = rng;
        harness
    }

    fn dispatch<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut G, &mut GameContext<'_>) -> R,
    {
        let variant = self.game.variant();
        let mut ctx = GameContext::new(
            self.now,
            self.epoch,
            variant,
            &self.timing,
            &mut self.rng,
            &mut self.timers,
            &mut self.events,
            &mut self.cues,
        );
        let result = f(&mut self.game, &mut ctx);
        let completed = ctx.completed();
        if completed {
            self.completions += 1;
            self.timers.cancel_epoch(self.epoch);
        }
        result
    }

    pub fn start(&mut self) {
        self.dispatch(|game, ctx| game.start(ctx));
    }

    pub fn submit(&mut self, input: GameInput) -> Result<AnswerOutcome, InputError> {
        self.dispatch(|game, ctx| submit_gated(game, &input, ctx))
    }

    pub fn advance(&mut self, ms: Millis) {
        let target = self.now + ms;
        self.advance_to(target);
    }

    pub fn advance_to(&mut self, target: Millis) {
        while let Some(timer) = self.timers.pop_due(target) {
            self.now = timer.handle.due();
            if timer.epoch != self.epoch {
                continue;
            }
            self.dispatch(|game, ctx| game.on_timer(timer.payload, ctx));
        }
        self.now = self.now.max(target);
    }

    /// Fire timers until input opens. False if the queue runs dry first.
    pub fn run_until_accepting(&mut self) -> bool {
        while !self.game.core().accepting_input() {
            match self.timers.next_due() {
                Some(due) => self.advance_to(due),
                None => return false,
            }
        }
        true
    }

    /// Fire every pending timer, including ones scheduled along the way.
    pub fn run_all(&mut self) {
        while let Some(due) = self.timers.next_due() {
            self.advance_to(due);
        }
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.events.iter().filter_map(SessionEvent::cue).collect()
    }

    pub fn scored(&self) -> Vec<AnswerOutcome> {
        self.events
            .iter()
            .filter_map(|e| match e.data {
                SessionEventData::AnswerScored { outcome, .. } => Some(outcome),
                _ => None,
            })
            .collect()
    }
}
