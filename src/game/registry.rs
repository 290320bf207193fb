//! Variant Registry
//!
//! A fixed table mapping each variant to its descriptive metadata, the
//! result fields it reports, its population averages and a factory that
//! builds a fresh instance. Dispatch is by lookup on [`Variant`].

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::content::{ContentBank, ContentError};
use crate::core::rng::DeterministicRng;
use crate::game::state::{ReportedFields, ResultRecord};
use crate::game::variants::{
    colors::Colors, definitions::Definitions, detection::Detection, maths::Maths,
    objects::Objects, reactions::Reactions, rotation::Rotation, span::{SpanGame, SpanKind},
    towers::Towers,
};
use crate::game::Game;

/// The ten mini-game variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Reaction time.
    Reactions,
    /// Spatial working memory.
    Squares,
    /// Short-term memory for objects.
    Objects,
    /// Verbal working memory.
    Numbers,
    /// Conflict resolution.
    Colors,
    /// Mental rotation.
    Rotation,
    /// Attention.
    Detection,
    /// Planning.
    Towers,
    /// Verbal comprehension.
    Definitions,
    /// Visual planning.
    Maths,
}

impl Variant {
    /// Every variant, in registry order.
    pub const ALL: [Variant; 10] = [
        Variant::Reactions,
        Variant::Squares,
        Variant::Objects,
        Variant::Numbers,
        Variant::Colors,
        Variant::Rotation,
        Variant::Detection,
        Variant::Towers,
        Variant::Definitions,
        Variant::Maths,
    ];

    /// Lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Reactions => "reactions",
            Variant::Squares => "squares",
            Variant::Objects => "objects",
            Variant::Numbers => "numbers",
            Variant::Colors => "colors",
            Variant::Rotation => "rotation",
            Variant::Detection => "detection",
            Variant::Towers => "towers",
            Variant::Definitions => "definitions",
            Variant::Maths => "maths",
        }
    }

    /// Registry entry.
    pub fn info(self) -> &'static VariantInfo {
        &REGISTRY[self as usize]
    }

    /// Build a fresh instance.
    pub fn create(self, content: &ContentBank, rng: &mut DeterministicRng) -> Result<Box<dyn Game>, ContentError> {
        (self.info().factory)(content, rng)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown variant name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant: {0}")]
pub struct ParseVariantError(pub String);

impl FromStr for Variant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str() == lower)
            .ok_or_else(|| ParseVariantError(s.to_string()))
    }
}

/// Builds a fresh instance from the content bank.
pub type GameFactory = fn(&ContentBank, &mut DeterministicRng) -> Result<Box<dyn Game>, ContentError>;

/// Static description of one variant.
pub struct VariantInfo {
    /// The variant.
    pub variant: Variant,
    /// Display name.
    pub name: &'static str,
    /// Skill measured.
    pub category: &'static str,
    /// One-paragraph description.
    pub description: &'static str,
    /// Theme color, `#RRGGBB`.
    pub color: &'static str,
    /// Fields kept in the result record.
    pub reported: ReportedFields,
    /// Population-average results.
    pub average: ResultRecord,
    /// Instance factory.
    pub factory: GameFactory,
}

impl fmt::Debug for VariantInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantInfo")
            .field("variant", &self.variant)
            .field("name", &self.name)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

const fn average(percentage: Option<f64>, time: Option<f64>, span: Option<u32>) -> ResultRecord {
    ResultRecord {
        percentage_correct: percentage,
        average_response_time: time,
        max_span: span,
    }
}

/// The registry, indexed by `Variant as usize`.
pub static REGISTRY: [VariantInfo; 10] = [
    VariantInfo {
        variant: Variant::Reactions,
        name: "Targeted Reactions",
        category: "Reaction Time",
        description: "A target appears after a random delay somewhere in the play area. Tap it as quickly as possible.",
        color: "#FF3B30",
        reported: ReportedFields::TIME,
        average: average(None, Some(0.473), None),
        factory: |_, _| Ok(Box::new(Reactions::new())),
    },
    VariantInfo {
        variant: Variant::Squares,
        name: "Order. Orderrrr!",
        category: "Spatial Working Memory",
        description: "Squares of a grid light up one after another. Repeat the sequence in order; it grows by two after every perfect round.",
        color: "#32ADE6",
        reported: ReportedFields::PERCENTAGE_AND_SPAN,
        average: average(Some(0.63), None, Some(6)),
        factory: |_, _| Ok(Box::new(SpanGame::new(SpanKind::Squares))),
    },
    VariantInfo {
        variant: Variant::Objects,
        name: "Did You See What I Saw?",
        category: "Short-Term Memory Objects",
        description: "Ten objects are shown one at a time. Each question then shows several objects of which exactly one was in the list.",
        color: "#00C7BE",
        reported: ReportedFields::PERCENTAGE,
        average: average(Some(0.64), None, None),
        factory: |content, rng| Ok(Box::new(Objects::new(content, rng)?)),
    },
    VariantInfo {
        variant: Variant::Numbers,
        name: "How High Can You Go?",
        category: "Verbal Working Memory",
        description: "Digits are shown one after another. Enter the sequence in order; it grows by two after every perfect round.",
        color: "#007AFF",
        reported: ReportedFields::PERCENTAGE_AND_SPAN,
        average: average(Some(0.72), None, Some(7)),
        factory: |_, _| Ok(Box::new(SpanGame::new(SpanKind::Numbers))),
    },
    VariantInfo {
        variant: Variant::Colors,
        name: "Stroop Wafels",
        category: "Conflict Resolution",
        description: "A color word is printed in an ink that usually disagrees with it. Pick the ink, not the word.",
        color: "#FF9500",
        reported: ReportedFields::PERCENTAGE_AND_TIME,
        average: average(Some(0.89), Some(1.803), None),
        factory: |_, _| Ok(Box::new(Colors::new())),
    },
    VariantInfo {
        variant: Variant::Rotation,
        name: "You Spin Me Round",
        category: "Mental Rotation",
        description: "Four rotated grids are shown. Pick the one that is the target grid turned, not altered.",
        color: "#E0AC00",
        reported: ReportedFields::PERCENTAGE,
        average: average(Some(0.91), None, None),
        factory: |content, rng| Ok(Box::new(Rotation::new(content, rng)?)),
    },
    VariantInfo {
        variant: Variant::Detection,
        name: "An Imposter Among Us",
        category: "Attention",
        description: "Figures appear and fade on a busy grid for thirty seconds. Tap only the archers, and tap them fast.",
        color: "#30B0C7",
        reported: ReportedFields::PERCENTAGE_AND_TIME,
        average: average(Some(0.92), Some(2.33), None),
        factory: |_, _| Ok(Box::new(Detection::new())),
    },
    VariantInfo {
        variant: Variant::Towers,
        name: "London, Hanoi",
        category: "Planning",
        description: "Two arrangements of disks on three rods are shown. Work out the minimum number of moves from one to the other; no disk may sit on a smaller one.",
        color: "#FF2D55",
        reported: ReportedFields::PERCENTAGE,
        average: average(Some(0.83), None, None),
        factory: |content, rng| Ok(Box::new(Towers::new(content, rng)?)),
    },
    VariantInfo {
        variant: Variant::Definitions,
        name: "I Know What That Means",
        category: "Verbal Comprehension",
        description: "A word is shown with four definitions. Pick the one that fits.",
        color: "#AF52DE",
        reported: ReportedFields::PERCENTAGE,
        average: average(Some(0.67), None, None),
        factory: |content, rng| Ok(Box::new(Definitions::new(content, rng)?)),
    },
    VariantInfo {
        variant: Variant::Maths,
        name: "Operating Table",
        category: "Visual Planning",
        description: "Fill the operator slots of a number grid so every row and column reaches its answer.",
        color: "#5856D6",
        reported: ReportedFields::PERCENTAGE,
        average: average(Some(0.84), None, None),
        factory: |content, _| Ok(Box::new(Maths::new(content)?)),
    },
];
