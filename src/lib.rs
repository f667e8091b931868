//! # symbios-canvas
//!
//! A planar turtle-graphics crate for [Symbios](https://crates.io/crates/symbios) that turns
//! L-System grammars into engine-agnostic line drawings.
//!
//! The pipeline runs in four stages: the [`GrammarExpander`] rewrites an axiom for a number
//! of generations, the [`TurtleInterpreter`] walks the result and emits [`LineSegment`]s,
//! the [`Normalizer`] fits them into a padded [`Viewport`], and the [`SegmentMerger`] fuses
//! collinear runs. [`Pipeline`] wires them together. Rendering, pan and zoom are left to
//! the caller.

pub mod error;
pub mod grammar;
pub mod interpreter;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod segment;
pub mod turtle;

pub use error::*;
pub use grammar::*;
pub use interpreter::*;
pub use merge::*;
pub use normalize::*;
pub use pipeline::*;
pub use segment::*;
pub use turtle::*;
