//! Presentation Snapshots
//!
//! Variant-specific visible state, pulled by the presentation layer after
//! each mutation. Views are plain data and carry no game logic.

use serde::Serialize;

use crate::game::variants::{
    colors::ColorsView, definitions::DefinitionsView, detection::DetectionView, maths::MathsView,
    objects::ObjectsView, reactions::ReactionsView, rotation::RotationView, span::SpanView,
    towers::TowersView,
};

/// Visible state of the active instance.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum VariantView {
    /// Reaction target.
    Reactions(ReactionsView),
    /// Square sequence.
    Squares(SpanView),
    /// Object list and options.
    Objects(ObjectsView),
    /// Digit sequence.
    Numbers(SpanView),
    /// Color word and ink.
    Colors(ColorsView),
    /// Target grid and rotated options.
    Rotation(RotationView),
    /// Detection grid.
    Detection(DetectionView),
    /// Tower configurations.
    Towers(TowersView),
    /// Word and definition options.
    Definitions(DefinitionsView),
    /// Number grid and operator slots.
    Maths(MathsView),
}
