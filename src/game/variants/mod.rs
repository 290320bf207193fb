//! The ten mini-game variants.
//!
//! Squares and Numbers share one implementation in `span`.

pub mod reactions;
pub mod span;
pub mod objects;
pub mod colors;
pub mod rotation;
pub mod detection;
pub mod towers;
pub mod definitions;
pub mod maths;
