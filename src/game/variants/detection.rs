//! Detection
//!
//! Icons pop into an 8x15 grid and expire after 5-10 seconds. Tapping the
//! target icon is correct, tapping any other icon is a strike, and a target
//! left to expire counts as a miss. The round runs for a fixed time budget:
//! each tick adds one progress point.

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

/// Grid rows.
pub const ROWS: usize = 8;

/// Grid columns.
pub const COLS: usize = 15;

/// The icon to tap.
pub const TARGET_ICON: &str = "figure.archery";

/// Every icon that can appear, target first.
pub const ICONS: [&str; 6] = [
    TARGET_ICON,
    "figure.boxing",
    "figure.american.football",
    "figure.softball",
    "figure.golf",
    "figure.fencing",
];

const MIN_DURATION_MS: Millis = 5000;
const MAX_DURATION_MS: Millis = 10_000;
const MAX_SPAWN: u32 = 4;
const MAX_OFFSET: i32 = 8;

/// One icon on the grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Element {
    /// Icon name.
    pub icon: &'static str,
    /// When it appeared.
    pub created_at: Millis,
    /// Lifetime.
    pub duration_ms: Millis,
    /// Jitter from the cell center, in points.
    pub offset: (i32, i32),
    /// Already tapped; waiting to be cleared.
    pub tapped: bool,
}

impl Element {
    /// Whether this is the target icon.
    pub fn is_target(&self) -> bool {
        self.icon == TARGET_ICON
    }

    fn expired(&self, now: Millis) -> bool {
        !self.tapped && self.created_at + self.duration_ms <= now
    }

    fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

/// Detection cells, row-major.
pub type Grid = Vec<Vec<Option<Element>>>;

/// Visible detection state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DetectionView {
    /// Grid cells, row-major.
    pub cells: Grid,
    /// Running score, never below zero.
    pub score: u32,
    /// Time left in the round.
    pub time_remaining_ms: Millis,
}

/// Visual search game.
#[derive(Clone, Debug, Default)]
pub struct Detection {
    core: GameCore,
    grid: Grid,
    score: u32,
    missed: u32,
    ticks: u32,
    time_remaining_ms: Millis,
}

impl Detection {
    /// New instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Running score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Targets that expired untapped.
    pub fn missed(&self) -> u32 {
        self.missed
    }

    /// Cell contents.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Element> {
        self.grid.get(row)?.get(col)?.as_ref()
    }

    fn add_to_score(&mut self, delta: i64) {
        let score = (self.score as i64 + delta).max(0);
        self.score = u32::try_from(score).unwrap_or(u32::MAX);
    }

    fn generate(&mut self, ctx: &mut GameContext<'_>) {
        ctx.cue(Cue::Reveal);
        self.grid = vec![vec![None; COLS]; ROWS];
        self.time_remaining_ms = ctx.timing().detection_budget_ms;
        ctx.set_phase(&mut self.core, Phase::AcceptingInput);
        let tick = ctx.timing().detection_tick_ms;
        ctx.schedule(tick, GameTimer::DetectionTick);
    }

    fn tick(&mut self, ctx: &mut GameContext<'_>) {
        self.ticks += 1;
        let tick = ctx.timing().detection_tick_ms;
        self.time_remaining_ms = self.time_remaining_ms.saturating_sub(tick);
        self.core.award_points(Points::DETECTION_TICK);

        self.remove_expired(ctx.now());

        if ctx.rng().next_bool_half() {
            let count = ctx.rng().next_int(MAX_SPAWN) + 1;
            for _ in 0..count {
                self.add_element(ctx);
            }
        }

        self.check_finished(ctx);

        if self.core.accepting_input() {
            ctx.schedule(tick, GameTimer::DetectionTick);
        }
    }

    fn remove_expired(&mut self, now: Millis) {
        let mut penalty = 0;
        for cell in self.grid.iter_mut().flatten() {
            if cell.as_ref().is_some_and(|element| element.expired(now)) {
                if let Some(element) = cell.take() {
                    if element.is_target() {
                        penalty += element.duration_ms / 1000;
                        self.missed += 1;
                    }
                }
            }
        }
        self.add_to_score(-(penalty as i64));
    }

    fn add_element(&mut self, ctx: &mut GameContext<'_>) {
        let empty: Vec<(usize, usize)> = self
            .grid
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.is_none())
                    .map(move |(c, _)| (r, c))
            })
            .collect();

        let rng = ctx.rng();
        let Some(&(row, col)) = rng.choose(&empty) else {
            return;
        };
        let icon = *rng.choose(&ICONS).unwrap_or(&TARGET_ICON);
        let duration_ms = rng.next_u64_range(MIN_DURATION_MS, MAX_DURATION_MS);
        let offset = (
            rng.next_int_range(-MAX_OFFSET, MAX_OFFSET),
            rng.next_int_range(-MAX_OFFSET, MAX_OFFSET),
        );

        self.grid[row][col] = Some(Element {
            icon,
            created_at: ctx.now(),
            duration_ms,
            offset,
            tapped: false,
        });
    }

    fn check_finished(&mut self, ctx: &mut GameContext<'_>) {
        if !self.core.accepting_input() || self.core.progress() < 100 {
            return;
        }

        ctx.set_phase(&mut self.core, Phase::Scoring);
        ctx.cue(Cue::RoundFinished);
        let pause = ctx.timing().detection_round_end_ms;
        ctx.schedule(pause, GameTimer::RoundFinished);
    }

    fn round_finished(&mut self, ctx: &mut GameContext<'_>) {
        for _ in 0..self.missed {
            ctx.answered(&mut self.core, false);
        }
        ctx.check_completion(&mut self.core);
    }

    fn clear_cell(&mut self, row: usize, col: usize, ctx: &mut GameContext<'_>) {
        if let Some(cell) = self.grid.get_mut(row).and_then(|r| r.get_mut(col)) {
            if cell.as_ref().is_some_and(|element| element.tapped) {
                *cell = None;
            }
        }
        self.check_finished(ctx);
    }
}

impl Game for Detection {
    fn variant(&self) -> Variant {
        Variant::Detection
    }

    fn core(&self) -> &GameCore {
        &self.core
    }

    fn start(&mut self, ctx: &mut GameContext<'_>) {
        self.grid = vec![vec![None; COLS]; ROWS];
        ctx.set_phase(&mut self.core, Phase::Generating);
        let delay = ctx.timing().generate_delay_ms;
        ctx.schedule(delay, GameTimer::Generate);
    }

    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameContext<'_>) {
        match timer {
            GameTimer::Generate => self.generate(ctx),
            GameTimer::DetectionTick => self.tick(ctx),
            GameTimer::ClearCell { row, col } => self.clear_cell(row, col, ctx),
            GameTimer::RoundFinished => self.round_finished(ctx),
            _ => {}
        }
    }

    fn submit(&mut self, input: &GameInput, ctx: &mut GameContext<'_>) -> Result<AnswerOutcome, InputError> {
        let GameInput::Cell { row, col } = *input else {
            return Err(unsupported(self.variant(), input));
        };
        if row >= ROWS || col >= COLS {
            return Err(InputError::CellOutOfRange { row, col, rows: ROWS, cols: COLS });
        }

        let now = ctx.now();
        let Some(element) = self.grid[row][col].as_mut().filter(|element| !element.tapped) else {
            return Ok(AnswerOutcome::Neutral);
        };
        element.tapped = true;
        let element = element.clone();

        let outcome = if element.is_target() {
            self.core.record_correct();
            ctx.cue(Cue::Correct);
            let latency = now.saturating_sub(element.created_at) as f64 / 1000.0;
            self.core.record_response_time(latency);
            self.add_to_score((element.duration_secs() - latency) as i64);
            AnswerOutcome::Correct
        } else {
            ctx.cue(Cue::Incorrect);
            self.add_to_score(-(element.duration_secs() as i64));
            AnswerOutcome::Incorrect
        };

        ctx.answered(&mut self.core, true);
        ctx.scored(&self.core, outcome);
        self.check_finished(ctx);

        let feedback = ctx.timing().detection_feedback_ms;
        ctx.schedule(feedback, GameTimer::ClearCell { row, col });

        Ok(outcome)
    }

    fn view(&self) -> VariantView {
        VariantView::Detection(DetectionView {
            cells: self.grid.clone(),
            score: self.score,
            time_remaining_ms: self.time_remaining_ms,
        })
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        self.core.hash_into(hasher);
        for (index, cell) in self.grid.iter().flatten().enumerate() {
            if let Some(element) = cell {
                hasher.update_usize(index);
                hasher.update_str(element.icon);
                hasher.update_u64(element.created_at);
                hasher.update_u64(element.duration_ms);
                hasher.update_bool(element.tapped);
            }
        }
        hasher.update_u32(self.score);
        hasher.update_u32(self.missed);
        hasher.update_u32(self.ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::SessionEventData;
    use crate::game::harness::Harness;

    fn place(h: &mut Harness<Detection>, row: usize, col: usize, icon: &'static str, duration_ms: Millis) {
        h.game.grid[row][col] = Some(Element {
            icon,
            created_at: h.now,
            duration_ms,
            offset: (0, 0),
            tapped: false,
        });
    }

    #[test]
    fn test_grid_opens_after_generate_delay() {
        let mut h = Harness::new(Detection::new(), 1);
        h.start();
        assert!(!h.game.core().accepting_input());
        h.advance(1000);
        assert!(h.game.core().accepting_input());
        assert_eq!(h.game.grid.len(), ROWS);
        assert!(h.game.grid.iter().all(|row| row.len() == COLS));
    }

    #[test]
    fn test_round_lasts_one_hundred_ticks() {
        let mut h = Harness::new(Detection::new(), 2);
        h.start();
        h.run_all();

        assert_eq!(h.completions, 1);
        assert_eq!(h.game.ticks, 100);
        assert_eq!(h.game.time_remaining_ms, 0);
        // 1s delay, 100 ticks of 300ms, 1s round-end pause
        assert_eq!(h.now, 1000 + 30_000 + 1000);
        assert!(h.cues().contains(&Cue::RoundFinished));
        assert_eq!(h.game.core().total_answered(), h.game.missed());
        assert_eq!(h.game.core().num_correct(), 0);
    }

    #[test]
    fn test_target_tap_scores_remaining_lifetime() {
        let mut h = Harness::new(Detection::new(), 3);
        h.start();
        h.advance(1000);
        place(&mut h, 0, 0, TARGET_ICON, 8000);
        h.advance(2000);

        assert_eq!(h.submit(GameInput::Cell { row: 0, col: 0 }), Ok(AnswerOutcome::Correct));
        assert_eq!(h.game.core().elapsed_times(), &[2.0]);
        assert_eq!(h.game.score(), 6);

        // Consumed: a second tap during feedback is neutral
        assert_eq!(h.submit(GameInput::Cell { row: 0, col: 0 }), Ok(AnswerOutcome::Neutral));
        assert_eq!(h.game.core().total_answered(), 1);

        h.advance(400);
        assert!(h.game.cell(0, 0).map_or(true, |element| !element.tapped));
    }

    #[test]
    fn test_wrong_taps_strike_out() {
        let mut h = Harness::new(Detection::new(), 4);
        h.start();
        h.advance(1000);

        for col in 0..3 {
            place(&mut h, 7, col, "figure.golf", 9000);
            assert_eq!(h.submit(GameInput::Cell { row: 7, col }), Ok(AnswerOutcome::Incorrect));
        }
        assert_eq!(h.game.score(), 0);
        assert_eq!(h.game.core().progress(), 100);
        assert_eq!(h.game.core().phase(), Phase::Scoring);

        h.advance(400);
        assert_eq!(h.game.core().phase(), Phase::Scoring);
        h.run_all();
        assert_eq!(h.completions, 1);
    }

    #[test]
    fn test_expired_target_is_missed() {
        let mut h = Harness::new(Detection::new(), 5);
        h.start();
        h.advance(1000);
        place(&mut h, 3, 3, TARGET_ICON, 5000);

        h.advance(4999);
        assert!(h.game.cell(3, 3).is_some());
        assert_eq!(h.game.score(), 0);
        h.advance(301);
        assert_eq!(h.game.missed(), 1);
        assert_eq!(h.game.score(), 0);
        assert!(h.game.cell(3, 3).map_or(true, |element| element.created_at != 1000));
    }

    #[test]
    fn test_miss_penalty_comes_off_score() {
        let mut h = Harness::new(Detection::new(), 5);
        h.start();
        h.advance(1000);
        h.game.score = 20;
        place(&mut h, 3, 3, TARGET_ICON, 7000);

        h.game.remove_expired(7999);
        assert_eq!(h.game.missed(), 0);
        h.game.remove_expired(8000);
        assert_eq!(h.game.missed(), 1);
        assert_eq!(h.game.score(), 13);

        place(&mut h, 3, 3, TARGET_ICON, 9000);
        h.game.score = 4;
        h.game.remove_expired(20_000);
        assert_eq!(h.game.score(), 0);
    }

    #[test]
    fn test_taps_after_strike_out_are_ignored() {
        let mut h = Harness::new(Detection::new(), 7);
        h.start();
        h.advance(1000);

        for col in 0..5 {
            place(&mut h, 6, col, "figure.boxing", 9000);
        }
        for col in 0..3 {
            assert_eq!(h.submit(GameInput::Cell { row: 6, col }), Ok(AnswerOutcome::Incorrect));
        }
        assert_eq!(h.game.core().phase(), Phase::Scoring);

        assert_eq!(h.submit(GameInput::Cell { row: 6, col: 3 }), Ok(AnswerOutcome::Neutral));
        assert_eq!(h.submit(GameInput::Cell { row: 6, col: 4 }), Ok(AnswerOutcome::Neutral));
        assert_eq!(h.game.core().total_answered(), 3);

        let struck = h
            .events
            .iter()
            .filter(|e| matches!(e.data, SessionEventData::StruckOut { .. }))
            .count();
        assert_eq!(struck, 1);
        assert_eq!(h.cues().iter().filter(|&&cue| cue == Cue::SessionOver).count(), 1);

        h.run_all();
        assert_eq!(h.completions, 1);
    }

    #[test]
    fn test_empty_cell_is_neutral_and_bounds_checked() {
        let mut h = Harness::new(Detection::new(), 6);
        h.start();
        h.advance(1000);
        h.game.grid[2][2] = None;

        assert_eq!(h.submit(GameInput::Cell { row: 2, col: 2 }), Ok(AnswerOutcome::Neutral));
        let err = h.submit(GameInput::Cell { row: 8, col: 0 }).unwrap_err();
        assert_eq!(err, InputError::CellOutOfRange { row: 8, col: 0, rows: 8, cols: 15 });
    }
}
