//! beam-select: pluggable beam-pruning strategies and a grid sandbox to
//! compare them.
//!
//! The core of the crate is the [`selection::Selector`] trait: given the
//! candidate frontier of a beam search, a heuristic and a beam width `k`,
//! reduce the frontier to at most `k` representatives. Around it sit a
//! potential-field heuristic, a step-wise search driver, a comparison
//! harness and a CLI.

pub mod benchmark;
pub mod cli;
pub mod config;
pub mod error;
pub mod field;
pub mod metrics;
pub mod model;
pub mod search;
pub mod selection;

pub use benchmark::{compare, CompareOptions, ComparisonReport, RunStatistics, SelectorSummary};
pub use config::SandboxConfig;
pub use error::{BenchmarkError, ConfigError, RegistryError};
pub use field::{PotentialField, Target};
pub use model::{Model, ModelArena, ModelId};
pub use search::{BeamSearch, SearchOutcome, SearchStatus, StepOutcome};
pub use selection::{Heuristic, Selector, SelectorKind, SelectorSpec};
