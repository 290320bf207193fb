//! Game Context
//!
//! The only channel from a game instance to the outside world. The session
//! builds one per dispatch (timer fire, submission or start); through it an
//! instance reads the clock, draws randomness, schedules its timed phases,
//! emits cues and events, and signals completion.

use tracing::debug;

use crate::core::rng::DeterministicRng;
use crate::core::schedule::{Epoch, Millis, Scheduler, TimerHandle};
use crate::game::events::{Cue, CuePort, SessionEvent};
use crate::game::registry::Variant;
use crate::game::state::{AnswerOutcome, GameCore, Phase};
use crate::session::config::TimingConfig;

/// Timed phase boundaries an instance can schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameTimer {
    /// Generation delay elapsed; draw the next stimulus.
    Generate,
    /// Advance the reveal sequence by one element.
    RevealStep,
    /// Reaction foreperiod elapsed.
    ShowTarget,
    /// Show the options for the next objects question.
    ShowOptions,
    /// Settle delay after a scored answer elapsed.
    Settle,
    /// Periodic detection tick.
    DetectionTick,
    /// Clear a tapped detection cell.
    ClearCell {
        /// Row.
        row: usize,
        /// Column.
        col: usize,
    },
    /// End-of-round pause for detection elapsed.
    RoundFinished,
}

/// Borrowed session resources for one dispatch.
pub struct GameContext<'a> {
    now: Millis,
    epoch: Epoch,
    variant: Variant,
    timing: &'a TimingConfig,
    rng: &'a mut DeterministicRng,
    timers: &'a mut Scheduler<GameTimer>,
    events: &'a mut Vec<SessionEvent>,
    cues: &'a mut (dyn CuePort + Send),
    completed: bool,
}

impl<'a> GameContext<'a> {
    /// Assemble a context.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        now: Millis,
        epoch: Epoch,
        variant: Variant,
        timing: &'a TimingConfig,
        rng: &'a mut DeterministicRng,
        timers: &'a mut Scheduler<GameTimer>,
        events: &'a mut Vec<SessionEvent>,
        cues: &'a mut (dyn CuePort + Send),
    ) -> Self {
        Self {
            now,
            epoch,
            variant,
            timing,
            rng,
            timers,
            events,
            cues,
            completed: false,
        }
    }

    /// Current logical time.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Timing settings.
    pub fn timing(&self) -> &TimingConfig {
        self.timing
    }

    /// The session RNG.
    pub fn rng(&mut self) -> &mut DeterministicRng {
        &mut *self.rng
    }

    /// Schedule `timer` to fire `delay` ms from now under this instance's epoch.
    pub fn schedule(&mut self, delay: Millis, timer: GameTimer) -> TimerHandle {
        self.timers.schedule(self.now + delay, self.epoch, timer)
    }

    /// Send a cue to the audio port.
    pub fn cue(&mut self, cue: Cue) {
        self.cues.play(cue);
        self.events.push(SessionEvent::cue_played(self.now, cue));
    }

    /// Move `core` to `phase`, recording the change.
    pub fn set_phase(&mut self, core: &mut GameCore, phase: Phase) {
        let from = core.set_phase(phase);
        let to = core.phase();
        if from != to {
            debug!(variant = %self.variant, from = from.as_str(), to = to.as_str(), "phase");
            self.events.push(SessionEvent::phase_changed(self.now, self.variant, from, to));
        }
    }

    /// Count an answered question, playing the session-over cue on a strike-out.
    pub fn answered(&mut self, core: &mut GameCore, check_strikes: bool) {
        if core.record_answered(check_strikes) {
            debug!(variant = %self.variant, incorrect = core.num_incorrect(), "strike limit reached");
            self.cue(Cue::SessionOver);
            self.events.push(SessionEvent::struck_out(self.now, self.variant, core.num_incorrect()));
        }
    }

    /// Record a scored submission.
    pub fn scored(&mut self, core: &GameCore, outcome: AnswerOutcome) {
        self.events.push(SessionEvent::answer_scored(self.now, self.variant, outcome, core.progress()));
    }

    /// Complete the instance if progress is at 100.
    ///
    /// The session advances after this dispatch returns.
    pub fn check_completion(&mut self, core: &mut GameCore) -> bool {
        let mut fired = false;
        let done = core.check_completion(|| fired = true);
        if fired {
            self.completed = true;
        }
        done
    }

    /// Whether this dispatch signalled completion.
    pub fn completed(&self) -> bool {
        self.completed
    }
}
