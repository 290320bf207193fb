//! Scripted Player
//!
//! Plays a session on the logical clock by reading the same snapshots a
//! presentation layer would see. Used by the demo binary, the integration
//! tests and the benchmarks.

use thiserror::Error;
use tracing::debug;

use crate::content::{minimum_moves, ContentBank, ObjectIcon};
use crate::core::rng::DeterministicRng;
use crate::core::schedule::Millis;
use crate::game::input::GameInput;
use crate::game::state::Phase;
use crate::game::variants::maths::{all_lines, LineState, MathsPuzzle, MathsView, OperatorSlot};
use crate::game::variants::span::{SpanKind, SpanView};
use crate::game::view::VariantView;
use crate::session::orchestrator::{Session, SessionSnapshot};

/// Upper bound on loop iterations for [`play_to_end`].
pub const DEFAULT_STEP_LIMIT: usize = 200_000;

/// Autoplay failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutoplayError {
    /// The session stopped making progress.
    #[error("session stalled at {now_ms} ms with no pending timers")]
    Stalled {
        /// Clock when it stalled.
        now_ms: Millis,
    },

    /// Step limit hit.
    #[error("session still running after {0} steps")]
    StepLimit(usize),
}

/// A player that answers from what is on screen.
///
/// Mistakes are injected on the answer-choice variants with probability
/// `1 / mistake_every` (never when `mistake_every` is 0).
#[derive(Debug, Clone)]
pub struct ScriptedPlayer {
    rng: DeterministicRng,
    content: ContentBank,
    mistake_every: u32,
    think_ms: (Millis, Millis),
    sequence: Vec<u32>,
    seen: Vec<ObjectIcon>,
    last_phase: Option<Phase>,
}

impl ScriptedPlayer {
    /// A player that knows `content` (for definitions).
    pub fn new(seed: u64, content: ContentBank) -> Self {
        Self {
            rng: DeterministicRng::new(seed),
            content,
            mistake_every: 8,
            think_ms: (250, 600),
            sequence: Vec::new(),
            seen: Vec::new(),
            last_phase: None,
        }
    }

    /// Set the mistake rate; 0 never errs.
    pub fn with_mistakes(mut self, mistake_every: u32) -> Self {
        self.mistake_every = mistake_every;
        self
    }

    /// Set the think time range before each answer.
    pub fn with_think_time(mut self, min_ms: Millis, max_ms: Millis) -> Self {
        self.think_ms = (min_ms, max_ms.max(min_ms));
        self
    }

    /// Remember what a reveal just showed.
    pub fn observe(&mut self, snapshot: &SessionSnapshot) {
        let revealing = snapshot.phase == Some(Phase::Revealing);
        if revealing && self.last_phase != Some(Phase::Revealing) {
            self.sequence.clear();
            self.seen.clear();
        }
        self.last_phase = snapshot.phase;

        if !revealing {
            return;
        }
        match &snapshot.view {
            Some(VariantView::Squares(view)) | Some(VariantView::Numbers(view)) => {
                if let Some(value) = view.showing {
                    if self.sequence.last() != Some(&value) {
                        self.sequence.push(value);
                    }
                }
            }
            Some(VariantView::Objects(view)) => {
                if let Some(icon) = &view.showing {
                    if self.seen.last() != Some(icon) {
                        self.seen.push(icon.clone());
                    }
                }
            }
            _ => {}
        }
    }

    /// Pick the next submission, if there is anything to do.
    pub fn decide(&mut self, snapshot: &SessionSnapshot) -> Option<GameInput> {
        if !snapshot.accepting_input {
            return None;
        }
        match snapshot.view.as_ref()? {
            VariantView::Reactions(view) => view.target.map(|_| GameInput::Tap),
            VariantView::Squares(view) | VariantView::Numbers(view) => self.recall(view),
            VariantView::Objects(view) => {
                let right = view.options.iter().position(|icon| self.seen.contains(icon))?;
                Some(self.choose(right, view.options.len()))
            }
            VariantView::Colors(view) => {
                let ink = view.ink?;
                let right = view.options.iter().position(|&option| option == ink)?;
                Some(self.choose(right, view.options.len()))
            }
            VariantView::Rotation(view) => {
                let target = view.target.as_ref()?;
                let right = view.options.iter().position(|option| option.grid == *target)?;
                Some(self.choose(right, view.options.len()))
            }
            VariantView::Detection(view) => {
                view.cells.iter().enumerate().find_map(|(row, cells)| {
                    cells.iter().enumerate().find_map(|(col, cell)| {
                        cell.as_ref()
                            .filter(|element| element.is_target() && !element.tapped)
                            .map(|_| GameInput::Cell { row, col })
                    })
                })
            }
            VariantView::Towers(view) => {
                let moves = minimum_moves(view.start.as_ref()?, view.end.as_ref()?)?;
                let value = if self.slips() { moves + 1 } else { moves };
                Some(GameInput::Number { value })
            }
            VariantView::Definitions(view) => {
                let word = view.word.as_ref()?;
                let entry = self.content.definitions.iter().find(|entry| entry.word == *word)?;
                let right = view.options.iter().position(|option| *option == entry.definition)?;
                Some(self.choose(right, view.options.len()))
            }
            VariantView::Maths(view) => solve_maths(view),
        }
    }

    /// How long to wait before answering.
    pub fn think_time(&mut self) -> Millis {
        let (min, max) = self.think_ms;
        self.rng.next_u64_range(min, max)
    }

    fn recall(&mut self, view: &SpanView) -> Option<GameInput> {
        let expected = *self.sequence.get(view.entered)?;
        let value = if self.slips() {
            let (min, max) = view.kind.range();
            if expected < max { expected + 1 } else { min }
        } else {
            expected
        };
        Some(match view.kind {
            SpanKind::Squares => GameInput::Square { square: value as u8 },
            SpanKind::Numbers => GameInput::Number { value },
        })
    }

    fn choose(&mut self, right: usize, len: usize) -> GameInput {
        let option = if len > 1 && self.slips() { (right + 1) % len } else { right };
        GameInput::Choose { option }
    }

    fn slips(&mut self) -> bool {
        self.mistake_every > 0 && self.rng.next_chance(1, self.mistake_every)
    }
}

/// Next step towards a solved grid: select a slot, or place its operator.
fn solve_maths(view: &MathsView) -> Option<GameInput> {
    let puzzle = MathsPuzzle {
        numbers: view.numbers?,
        answers: view.answers?,
    };

    for line in all_lines() {
        let axis = line.axis.index();
        if view.states[axis][line.line] == LineState::Correct {
            continue;
        }
        let solution = puzzle.solve_line(line)?;
        for (index, operator) in solution.into_iter().enumerate() {
            if view.operators[axis][line.line][index] == Some(operator) {
                continue;
            }
            let slot = OperatorSlot { axis: line.axis, line: line.line, index };
            if view.selected != Some(slot) {
                return Some(GameInput::SelectSlot { slot });
            }
            return Some(GameInput::PlaceOperator { operator });
        }
    }
    None
}

/// Start `session` if needed and play it to the end.
///
/// Between answers the clock only moves to the next due timer, or by the
/// player's think time when no timer is due sooner.
pub fn play_to_end(
    session: &mut Session,
    player: &mut ScriptedPlayer,
    step_limit: usize,
) -> Result<usize, AutoplayError> {
    session.start();

    for step in 0..step_limit {
        if session.is_ended() {
            return Ok(step);
        }

        let snapshot = session.snapshot();
        player.observe(&snapshot);

        if snapshot.accepting_input {
            let think = player.think_time();
            let quiet = session
                .next_timer_due()
                .map_or(true, |due| due > session.now() + think);
            if quiet {
                session.advance_time(think);
            }

            let snapshot = session.snapshot();
            if let Some(input) = player.decide(&snapshot) {
                debug!(variant = ?snapshot.variant, ?input, "autoplay submit");
                session.submit(input);
                continue;
            }
        }

        match session.next_timer_due() {
            Some(due) => session.advance_to(due),
            None => return Err(AutoplayError::Stalled { now_ms: session.now() }),
        }
    }

    if session.is_ended() {
        Ok(step_limit)
    } else {
        Err(AutoplayError::StepLimit(step_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::SilentCues;
    use crate::game::registry::Variant;
    use crate::session::config::SessionConfig;

    fn play(plan: &[Variant], seed: u64, mistakes: u32) -> Session {
        let content = ContentBank::builtin();
        let mut session =
            Session::new(plan, content.clone(), SessionConfig::seeded(seed), Box::new(SilentCues)).unwrap();
        let mut player = ScriptedPlayer::new(seed, content).with_mistakes(mistakes);
        play_to_end(&mut session, &mut player, DEFAULT_STEP_LIMIT).unwrap();
        session
    }

    #[test]
    fn test_perfect_player_scores_full_marks() {
        let session = play(
            &[Variant::Colors, Variant::Definitions, Variant::Towers, Variant::Rotation, Variant::Objects],
            21,
            0,
        );
        for (variant, record) in session.results().iter() {
            assert_eq!(record.percentage_correct, Some(1.0), "{variant}");
        }
    }

    #[test]
    fn test_span_grows_for_perfect_player() {
        let session = play(&[Variant::Numbers], 3, 0);
        let record = session.results().get(Variant::Numbers).unwrap();
        // Five perfect rounds of +20 reach 100
        assert_eq!(record.max_span, Some(10));
        assert_eq!(record.percentage_correct, Some(1.0));
    }

    #[test]
    fn test_maths_solver_completes_grid() {
        let session = play(&[Variant::Maths], 9, 0);
        let record = session.results().get(Variant::Maths).unwrap();
        assert_eq!(record.percentage_correct, Some(1.0));
    }

    #[test]
    fn test_reaction_times_include_think_time() {
        let session = play(&[Variant::Reactions], 5, 0);
        let time = session.results().get(Variant::Reactions).unwrap().average_response_time.unwrap();
        assert!((0.25..=0.6).contains(&time), "{time}");
    }

    #[test]
    fn test_all_variants_finish() {
        let session = play(&Variant::ALL, 1234, 8);
        assert!(session.is_ended());
        assert_eq!(session.results().len(), Variant::ALL.len());
    }
}
