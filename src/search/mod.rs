//! Beam search over a grid, driven by a pluggable [`Selector`](crate::selection::Selector).
//!
//! Each step expands the frontier one row down, filters the candidates and
//! hands them to the selector, which decides what survives. The search ends
//! as soon as a surviving model reaches the last row.

pub mod driver;
pub mod grid;

pub use driver::{BeamSearch, SearchOutcome, SearchStatus, SolutionSummary, StepOutcome};
pub use grid::{Grid, WallRect};
