//! Maths
//!
//! A 3x3 number grid where each row and each column has two operator slots.
//! Fill the slots so every line evaluates to its answer. A line whose two
//! slots are filled is checked on every placement; once correct it locks.
//!
//! Evaluation of `a op1 b op2 c`: when `op1` is additive and `op2`
//! multiplicative, `b op2 c` binds first; otherwise strictly left to right.
//! Arithmetic is checked, so division by zero or overflow has no value.

use std::fmt;

use serde::{Serialize, Deserialize};

use crate::content::{ContentBank, ContentError};
use crate::core::hash::StateHasher;
use crate::game::context::{GameContext, GameTimer};
use crate::game::events::Cue;
use crate::game::input::{GameInput, InputError};
use crate::game::registry::Variant;
use crate::game::scoring::{score_answer, Points};
use crate::game::state::{AnswerOutcome, GameCore, Phase};
use crate::game::view::VariantView;
use crate::game::{unsupported, Game};

/// Lines per axis.
pub const LINES: usize = 3;

/// Operator slots per line.
pub const SLOTS: usize = 2;

/// An arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`, truncating toward zero.
    Divide,
}

impl Operator {
    /// All operators.
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Subtract, Operator::Multiply, Operator::Divide];

    /// `a op b`, or `None` on division by zero or overflow.
    pub fn apply(self, a: i64, b: i64) -> Option<i64> {
        match self {
            Operator::Add => a.checked_add(b),
            Operator::Subtract => a.checked_sub(b),
            Operator::Multiply => a.checked_mul(b),
            Operator::Divide => a.checked_div(b),
        }
    }

    /// Add or subtract.
    pub fn is_additive(self) -> bool {
        matches!(self, Operator::Add | Operator::Subtract)
    }

    /// Symbol, for logs.
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }
}

/// Evaluate `a op1 b op2 c`.
pub fn evaluate(a: i64, op1: Operator, b: i64, op2: Operator, c: i64) -> Option<i64> {
    if op1.is_additive() && !op2.is_additive() {
        op1.apply(a, op2.apply(b, c)?)
    } else {
        op2.apply(op1.apply(a, b)?, c)
    }
}

/// Rows or columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal lines.
    Row,
    /// Vertical lines.
    Column,
}

impl Axis {
    /// Both axes, rows first.
    pub const ALL: [Axis; 2] = [Axis::Row, Axis::Column];

    /// Position in per-axis arrays.
    pub fn index(self) -> usize {
        match self {
            Axis::Row => 0,
            Axis::Column => 1,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Row => "row",
            Axis::Column => "column",
        })
    }
}

/// One row or column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    /// Axis.
    pub axis: Axis,
    /// Index along the axis.
    pub line: usize,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.axis, self.line)
    }
}

/// One operator slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorSlot {
    /// Axis of the owning line.
    pub axis: Axis,
    /// Index of the owning line.
    pub line: usize,
    /// Slot within the line (0 or 1).
    pub index: usize,
}

impl OperatorSlot {
    /// The line this slot belongs to.
    pub fn owner(&self) -> Line {
        Line { axis: self.axis, line: self.line }
    }

    fn in_range(&self) -> bool {
        self.line < LINES && self.index < SLOTS
    }
}

impl fmt::Display for OperatorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} slot {}", self.axis, self.line, self.index)
    }
}

/// A number grid with its row and column answers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathsPuzzle {
    /// The 3x3 numbers, row-major.
    pub numbers: [[i64; 3]; 3],
    /// Row answers, then column answers.
    pub answers: [[i64; 3]; 2],
}

impl MathsPuzzle {
    /// Build a puzzle from its numbers and one operator solution per line.
    ///
    /// `None` if any line has no value.
    pub fn from_solution(
        numbers: [[i64; 3]; 3],
        rows: [[Operator; 2]; 3],
        cols: [[Operator; 2]; 3],
    ) -> Option<Self> {
        let mut puzzle = Self { numbers, answers: [[0; 3]; 2] };
        for (axis, solution) in [(Axis::Row, rows), (Axis::Column, cols)] {
            for (line, [op1, op2]) in solution.into_iter().enumerate() {
                let [a, b, c] = puzzle.line_numbers(Line { axis, line });
                puzzle.answers[axis.index()][line] = evaluate(a, op1, b, op2, c)?;
            }
        }
        Some(puzzle)
    }

    /// The three numbers of a line, in reading order.
    pub fn line_numbers(&self, line: Line) -> [i64; 3] {
        let n = &self.numbers;
        match line.axis {
            Axis::Row => n[line.line],
            Axis::Column => [n[0][line.line], n[1][line.line], n[2][line.line]],
        }
    }

    /// Expected value of a line.
    pub fn answer(&self, line: Line) -> i64 {
        self.answers[line.axis.index()][line.line]
    }

    /// Value of a line under the given operators.
    pub fn evaluate_line(&self, line: Line, [op1, op2]: [Operator; 2]) -> Option<i64> {
        let [a, b, c] = self.line_numbers(line);
        evaluate(a, op1, b, op2, c)
    }

    /// First operator pair that solves a line.
    pub fn solve_line(&self, line: Line) -> Option<[Operator; 2]> {
        let answer = self.answer(line);
        Operator::ALL
            .into_iter()
            .flat_map(|op1| Operator::ALL.into_iter().map(move |op2| [op1, op2]))
            .find(|&ops| self.evaluate_line(line, ops) == Some(answer))
    }

    /// First line no operator pair can solve.
    pub fn first_unsolvable_line(&self) -> Option<Line> {
        all_lines().find(|&line| self.solve_line(line).is_none())
    }
}

/// Every line, rows first.
pub fn all_lines() -> impl Iterator<Item = Line> {
    Axis::ALL
        .into_iter()
        .flat_map(|axis| (0..LINES).map(move |line| Line { axis, line }))
}

/// Check state of one line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineState {
    /// A slot is still empty.
    #[default]
    Pending,
    /// Evaluates to its answer; locked.
    Correct,
    /// Both slots filled, wrong value.
    Incorrect,
}

/// Placed operators, by axis, line and slot.
pub type Operators = [[[Option<Operator>; SLOTS]; LINES]; 2];

/// Visible maths state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MathsView {
    /// Number grid.
    pub numbers: Option<[[i64; 3]; 3]>,
    /// Row answers, then column answers.
    pub answers: Option<[[i64; 3]; 2]>,
    /// Placed operators, rows then columns.
    pub operators: Operators,
    /// Per-line check state, rows then columns.
    pub states: [[LineState; LINES]; 2],
    /// Selected slot.
    pub selected: Option<OperatorSlot>,
}

/// Operator grid game.
#[derive(Clone, Debug)]
pub struct Maths {
    core: GameCore,
    bank: Vec<MathsPuzzle>,
    puzzle: Option<MathsPuzzle>,
    operators: Operators,
    states: [[LineState; LINES]; 2],
    selected: Option<OperatorSlot>,
}

impl Maths {
    /// Build from the maths bank. A puzzle is picked at random on start.
    pub fn new(content: &ContentBank) -> Result<Self, ContentError> {
        content.validate(Variant::Maths)?;
        Ok(Self {
            core: GameCore::new(),
            bank: content.maths.clone(),
            puzzle: None,
            operators: [[[None; SLOTS]; LINES]; 2],
            states: [[LineState::Pending; LINES]; 2],
            selected: None,
        })
    }

    /// Puzzle in play.
    pub fn puzzle(&self) -> Option<&MathsPuzzle> {
        self.puzzle.as_ref()
    }

    /// Check state of a line.
    pub fn line_state(&self, line: Line) -> LineState {
        self.states[line.axis.index()][line.line]
    }

    /// Selected slot.
    pub fn selected(&self) -> Option<OperatorSlot> {
        self.selected
    }

    fn generate(&mut self, ctx: &mut GameContext<'_>) {
        let Some(puzzle) = ctx.rng().choose(&self.bank).cloned() else {
            return;
        };
        self.puzzle = Some(puzzle);
        self.operators = [[[None; SLOTS]; LINES]; 2];
        self.states = [[LineState::Pending; LINES]; 2];
        self.selected = Some(OperatorSlot { axis: Axis::Row, line: 0, index: 0 });

        ctx.cue(Cue::Reveal);
        ctx.set_phase(&mut self.core, Phase::AcceptingInput);
    }

    fn check_slot(&self, slot: OperatorSlot) -> Result<OperatorSlot, InputError> {
        if !slot.in_range() {
            return Err(InputError::SlotOutOfRange { slot });
        }
        if self.line_state(slot.owner()) == LineState::Correct {
            return Err(InputError::SlotLocked { slot });
        }
        Ok(slot)
    }

    fn evaluate_owner(&self, line: Line) -> LineState {
        let [op1, op2] = self.operators[line.axis.index()][line.line];
        let (Some(op1), Some(op2), Some(puzzle)) = (op1, op2, self.puzzle.as_ref()) else {
            return LineState::Pending;
        };

        if puzzle.evaluate_line(line, [op1, op2]) == Some(puzzle.answer(line)) {
            LineState::Correct
        } else {
            LineState::Incorrect
        }
    }

    fn place(&mut self, operator: Operator, ctx: &mut GameContext<'_>) -> Result<AnswerOutcome, InputError> {
        let slot = self.check_slot(self.selected.ok_or(InputError::NoSlotSelected)?)?;
        let line = slot.owner();

        self.operators[slot.axis.index()][slot.line][slot.index] = Some(operator);

        let old = self.line_state(line);
        let new = self.evaluate_owner(line);
        self.states[line.axis.index()][line.line] = new;

        let outcome = match new {
            LineState::Correct => {
                self.selected = None;
                score_answer(&mut self.core, ctx, true, Points::MATHS_LINE)
            }
            LineState::Incorrect if old != LineState::Incorrect => {
                score_answer(&mut self.core, ctx, false, Points::MATHS_LINE)
            }
            _ => AnswerOutcome::Neutral,
        };
        Ok(outcome)
    }
}

impl Game for Maths {
    fn variant(&self) -> Variant {
        Variant::Maths
    }

    fn core(&self) -> &GameCore {
        &self.core
    }

    fn start(&mut self, ctx: &mut GameContext<'_>) {
        ctx.set_phase(&mut self.core, Phase::Generating);
        let delay = ctx.timing().generate_delay_ms;
        ctx.schedule(delay, GameTimer::Generate);
    }

    fn on_timer(&mut self, timer: GameTimer, ctx: &mut GameContext<'_>) {
        match timer {
            GameTimer::Generate => self.generate(ctx),
            GameTimer::Settle => {
                if !ctx.check_completion(&mut self.core) {
                    ctx.set_phase(&mut self.core, Phase::AcceptingInput);
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self, input: &GameInput, ctx: &mut GameContext<'_>) -> Result<AnswerOutcome, InputError> {
        match *input {
            GameInput::SelectSlot { slot } => {
                self.selected = Some(self.check_slot(slot)?);
                ctx.cue(Cue::Click);
                Ok(AnswerOutcome::Neutral)
            }
            GameInput::PlaceOperator { operator } => self.place(operator, ctx),
            _ => Err(unsupported(self.variant(), input)),
        }
    }

    fn view(&self) -> VariantView {
        VariantView::Maths(MathsView {
            numbers: self.puzzle.as_ref().map(|p| p.numbers),
            answers: self.puzzle.as_ref().map(|p| p.answers),
            operators: self.operators,
            states: self.states,
            selected: self.selected,
        })
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        self.core.hash_into(hasher);
        if let Some(puzzle) = &self.puzzle {
            for value in puzzle.numbers.iter().flatten().chain(puzzle.answers.iter().flatten()) {
                hasher.update_i64(*value);
            }
        }
        for operator in self.operators.iter().flatten().flatten() {
            hasher.update_option(*operator, |h, op| h.update_u8(op.symbol() as u8));
        }
        for state in self.states.iter().flatten() {
            hasher.update_u8(*state as u8);
        }
        hasher.update_option(self.selected, |h, slot| {
            h.update_u8(slot.axis.index() as u8);
            h.update_usize(slot.line);
            h.update_usize(slot.index);
        });
    }
}
