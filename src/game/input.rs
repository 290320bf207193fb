//! Player Input
//!
//! Inputs a presentation layer can submit to the active instance, and the
//! session-level commands that drive a replay.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::schedule::Millis;
use crate::game::registry::Variant;
use crate::game::variants::maths::{Operator, OperatorSlot};

/// One submission to the active game instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameInput {
    /// Tap the reaction target.
    Tap,
    /// Pick an answer option by index.
    Choose {
        /// Option index.
        option: usize,
    },
    /// Enter a number (a digit, or a move count).
    Number {
        /// The value entered.
        value: u32,
    },
    /// Tap a square of the 4x4 span grid (1..=16).
    Square {
        /// Square number.
        square: u8,
    },
    /// Tap a cell of the detection grid.
    Cell {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },
    /// Select an operator slot in the maths grid.
    SelectSlot {
        /// The slot.
        slot: OperatorSlot,
    },
    /// Place an operator in the selected slot.
    PlaceOperator {
        /// The operator.
        operator: Operator,
    },
}

impl GameInput {
    /// Short name, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            GameInput::Tap => "tap",
            GameInput::Choose { .. } => "choose",
            GameInput::Number { .. } => "number",
            GameInput::Square { .. } => "square",
            GameInput::Cell { .. } => "cell",
            GameInput::SelectSlot { .. } => "select_slot",
            GameInput::PlaceOperator { .. } => "place_operator",
        }
    }
}

/// Session-level command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionInput {
    /// Mark the session as running.
    Start,
    /// Submit to the active instance.
    Submit {
        /// The submission.
        input: GameInput,
    },
    /// Abandon the active instance and move on.
    ForceAdvance,
}

/// A command recorded at a logical time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedInput {
    /// When the command was applied.
    pub at_ms: Millis,
    /// The command.
    pub input: SessionInput,
}

impl TimedInput {
    /// Record a command at a time.
    pub fn new(at_ms: Millis, input: SessionInput) -> Self {
        Self { at_ms, input }
    }

    /// Record a submission at a time.
    pub fn submit(at_ms: Millis, input: GameInput) -> Self {
        Self::new(at_ms, SessionInput::Submit { input })
    }
}

/// A submission the active instance cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The variant does not take this kind of input.
    #[error("{variant} does not accept {input} input")]
    Unsupported {
        /// Active variant.
        variant: Variant,
        /// Input kind.
        input: &'static str,
    },

    /// Option index past the end of the current options.
    #[error("option {index} out of range (have {len})")]
    OptionOutOfRange {
        /// Requested index.
        index: usize,
        /// Option count.
        len: usize,
    },

    /// Grid cell outside the grid.
    #[error("cell ({row}, {col}) outside {rows}x{cols} grid")]
    CellOutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },

    /// Value outside the accepted range.
    #[error("value {value} outside {min}..={max}")]
    ValueOutOfRange {
        /// Value entered.
        value: u32,
        /// Smallest accepted value.
        min: u32,
        /// Largest accepted value.
        max: u32,
    },

    /// Operator slot coordinates out of range.
    #[error("no operator slot at {slot}")]
    SlotOutOfRange {
        /// Requested slot.
        slot: OperatorSlot,
    },

    /// Slot belongs to a line already solved.
    #[error("operator slot {slot} is locked")]
    SlotLocked {
        /// Requested slot.
        slot: OperatorSlot,
    },

    /// An operator was placed with nothing selected.
    #[error("no operator slot selected")]
    NoSlotSelected,

    /// Input arrived while no question is on screen.
    #[error("no active question")]
    NoActiveQuestion,
}
