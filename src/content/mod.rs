//! Content Banks
//!
//! Static puzzle data consumed by the content-driven variants:
//! word definitions, maths grids, rotation grids, tower configurations and
//! object icon sets. Banks are plain JSON documents; [`ContentBank::builtin`]
//! bundles a small bank so the engine runs without external files.
//!
//! ```json
//! {
//!   "definitions": [{ "word": "Laconic", "definition": "Using very few words" }],
//!   "maths": [{ "numbers": [[4,3,2],[1,5,6],[8,2,4]], "answers": [[10,31,12],[13,13,26]] }],
//!   "rotation": [[[1,0,2,0],[0,3,0,4],[2,0,1,0],[0,4,0,3]]],
//!   "towers": [{ "startConfig": [[3,2,1],[],[]], "endConfig": [[],[],[3,2,1]], "minimumMoves": 7 }],
//!   "objects": [["car", "bus.flip"]]
//! }
//! ```

pub mod builtin;
pub mod towers;

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::registry::Variant;
use crate::game::variants::maths::MathsPuzzle;

pub use towers::{minimum_moves, TowerConfig};

/// Largest color index a rotation grid cell may hold.
pub const ROTATION_MAX_COLOR: u8 = 4;

/// Number of icon sets drawn per objects round.
pub const OBJECTS_PER_ROUND: usize = 10;

/// Options shown per definitions question.
pub const DEFINITION_OPTIONS: usize = 4;

/// Suffix marking an object icon that also appears mirrored.
const FLIP_SUFFIX: &str = ".flip";

/// Errors loading or validating a content bank.
#[derive(Debug, Error)]
pub enum ContentError {
    /// A bank has fewer entries than its variant needs.
    #[error("{bank} bank has {found} entries, {needed} required")]
    Missing {
        /// Bank name.
        bank: &'static str,
        /// Minimum entry count.
        needed: usize,
        /// Entries present.
        found: usize,
    },

    /// An entry is structurally invalid.
    #[error("malformed {bank} entry #{index}: {reason}")]
    Malformed {
        /// Bank name.
        bank: &'static str,
        /// Entry index within the bank.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Reading the bank from disk failed.
    #[error("failed to read content bank: {0}")]
    Io(#[from] std::io::Error),

    /// The bank is not valid JSON for this schema.
    #[error("failed to parse content bank: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ContentError {
    fn malformed(bank: &'static str, index: usize, reason: impl Into<String>) -> Self {
        ContentError::Malformed {
            bank,
            index,
            reason: reason.into(),
        }
    }
}

/// A word and its definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEntry {
    /// The word being defined.
    pub word: String,
    /// Its definition.
    pub definition: String,
}

/// A square grid of color indices (0 is filler, 1..=4 are colors).
pub type RotationGrid = Vec<Vec<u8>>;

/// A tower question with its precomputed answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerQuestion {
    /// Starting rods, each listed bottom to top.
    pub start_config: TowerConfig,
    /// Goal rods, each listed bottom to top.
    pub end_config: TowerConfig,
    /// Fewest moves from start to goal.
    pub minimum_moves: u32,
}

impl TowerQuestion {
    /// Build a question, solving for the minimum move count.
    pub fn solved(start_config: TowerConfig, end_config: TowerConfig) -> Option<Self> {
        let minimum_moves = minimum_moves(&start_config, &end_config)?;
        Some(Self {
            start_config,
            end_config,
            minimum_moves,
        })
    }
}

/// One object icon, optionally mirrored.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectIcon {
    /// Icon name.
    pub name: String,
    /// Drawn mirrored.
    pub flipped: bool,
}

/// All static content, keyed by bank.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentBank {
    /// Word/definition pairs.
    pub definitions: Vec<DefinitionEntry>,
    /// Maths grids with their row and column answers.
    pub maths: Vec<MathsPuzzle>,
    /// Target grids for rotation questions.
    pub rotation: Vec<RotationGrid>,
    /// Tower questions.
    pub towers: Vec<TowerQuestion>,
    /// Object icon sets; names ending in `.flip` also appear mirrored.
    pub objects: Vec<Vec<String>>,
}

impl ContentBank {
    /// Parse a bank from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a bank from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Object sets with `.flip` entries expanded into plain and mirrored icons.
    pub fn object_sets(&self) -> Vec<Vec<ObjectIcon>> {
        self.objects
            .iter()
            .map(|set| {
                set.iter()
                    .flat_map(|icon| match icon.strip_suffix(FLIP_SUFFIX) {
                        Some(name) => vec![
                            ObjectIcon { name: name.to_string(), flipped: false },
                            ObjectIcon { name: name.to_string(), flipped: true },
                        ],
                        None => vec![ObjectIcon { name: icon.clone(), flipped: false }],
                    })
                    .collect()
            })
            .collect()
    }

    /// Check the bank a variant draws from.
    ///
    /// Variants that generate their own stimuli always validate.
    pub fn validate(&self, variant: Variant) -> Result<(), ContentError> {
        match variant {
            Variant::Definitions => self.validate_definitions(),
            Variant::Maths => self.validate_maths(),
            Variant::Rotation => self.validate_rotation(),
            Variant::Towers => self.validate_towers(),
            Variant::Objects => self.validate_objects(),
            Variant::Reactions
            | Variant::Squares
            | Variant::Numbers
            | Variant::Colors
            | Variant::Detection => Ok(()),
        }
    }

    fn validate_definitions(&self) -> Result<(), ContentError> {
        require("definitions", DEFINITION_OPTIONS, self.definitions.len())?;
        for (index, entry) in self.definitions.iter().enumerate() {
            if entry.word.trim().is_empty() || entry.definition.trim().is_empty() {
                return Err(ContentError::malformed("definitions", index, "empty word or definition"));
            }
            let duplicate = self.definitions[..index]
                .iter()
                .any(|earlier| earlier.word == entry.word || earlier.definition == entry.definition);
            if duplicate {
                return Err(ContentError::malformed("definitions", index, "duplicate word or definition"));
            }
        }
        Ok(())
    }

    fn validate_maths(&self) -> Result<(), ContentError> {
        require("maths", 1, self.maths.len())?;
        for (index, puzzle) in self.maths.iter().enumerate() {
            if let Some(line) = puzzle.first_unsolvable_line() {
                return Err(ContentError::malformed(
                    "maths",
                    index,
                    format!("no operators reach the answer for {line}"),
                ));
            }
        }
        Ok(())
    }

    fn validate_rotation(&self) -> Result<(), ContentError> {
        require("rotation", 1, self.rotation.len())?;
        for (index, grid) in self.rotation.iter().enumerate() {
            let side = grid.len();
            if side < 2 {
                return Err(ContentError::malformed("rotation", index, "grid side must be at least 2"));
            }
            if grid.iter().any(|row| row.len() != side) {
                return Err(ContentError::malformed("rotation", index, "grid is not square"));
            }
            if grid.iter().flatten().any(|&cell| cell > ROTATION_MAX_COLOR) {
                return Err(ContentError::malformed(
                    "rotation",
                    index,
                    format!("cell values must be 0..={ROTATION_MAX_COLOR}"),
                ));
            }
        }
        Ok(())
    }

    fn validate_towers(&self) -> Result<(), ContentError> {
        require("towers", 1, self.towers.len())?;
        for (index, question) in self.towers.iter().enumerate() {
            match minimum_moves(&question.start_config, &question.end_config) {
                Some(moves) if moves == question.minimum_moves => {}
                Some(moves) => {
                    return Err(ContentError::malformed(
                        "towers",
                        index,
                        format!("stored minimum {} but solver found {}", question.minimum_moves, moves),
                    ));
                }
                None => {
                    return Err(ContentError::malformed("towers", index, "configurations are illegal or unreachable"));
                }
            }
        }
        Ok(())
    }

    fn validate_objects(&self) -> Result<(), ContentError> {
        require("objects", OBJECTS_PER_ROUND, self.objects.len())?;
        for (index, set) in self.objects.iter().enumerate() {
            if set.is_empty() {
                return Err(ContentError::malformed("objects", index, "empty icon set"));
            }
        }
        Ok(())
    }
}

fn require(bank: &'static str, needed: usize, found: usize) -> Result<(), ContentError> {
    if found < needed {
        Err(ContentError::Missing { bank, needed, found })
    } else {
        Ok(())
    }
}
