//! Beam-pruning strategies.
//!
//! A beam search expands its frontier every step, and the number of
//! candidates grows without bound. A [`Selector`] reduces the candidate list
//! back down to at most `k` representatives before the next expansion.
//! Strategies trade search completeness against bounded work in different
//! ways:
//!
//! - **Hash buckets** ([`BucketSelector`], [`BucketSelector2`]) partition by a
//!   coordinate digest and keep the best model per partition
//! - **Random buckets** ([`RandomBucketSelector`], [`BucketSelector3`],
//!   [`RandomSelector`]) partition a shuffled candidate list
//! - **Locality buckets** ([`LocalitySensitiveBucketSelector`]) partition by
//!   horizontal position inside a window that widens every call
//! - **Ranking** ([`TopKSelector`], [`DiverseTopKSelector`]) sorts by the
//!   heuristic, optionally enforcing a minimum spacing
//! - **Clustering** ([`KMedianSelector`]) picks the best model of each
//!   k-medoids cluster
//! - **Erosion** ([`ScoreErosionSelector`]) repels later picks from earlier
//!   ones through a multiplicative penalty
//! - **Composition** ([`CombinedSelector`], [`CombinedSequentialSelector`])
//!   splits or rotates work between other selectors
//!
//! # Usage
//!
//! ```rust,ignore
//! use beam_select::selection::{Selector, TopKSelector};
//!
//! let mut selector = TopKSelector::new();
//! let frontier = selector.select(&candidates, &|m| field.heuristic(m), 30);
//! ```
//!
//! Every strategy returns an empty result for an empty candidate list or
//! `k == 0`, and only ever returns models taken from its input.

pub mod bucket;
pub mod combined;
pub mod erosion;
pub mod geometry;
pub mod kmedoids;
pub mod locality;
pub mod randomized;
pub mod ranking;
pub mod registry;
pub mod rng;

use ordered_float::OrderedFloat;

use crate::model::Model;

pub use bucket::{coordinate_hash, BucketSelector, BucketSelector2};
pub use combined::{CombinedSelector, CombinedSequentialSelector};
pub use erosion::{ErosionOutcome, ScoreErosionSelector};
pub use geometry::{distance, pairwise_distances};
pub use kmedoids::KMedianSelector;
pub use locality::{LocalitySensitiveBucketSelector, LocalityWindow};
pub use randomized::{BucketSelector3, RandomBucketSelector, RandomSelector};
pub use ranking::{DiverseTopKSelector, TopKSelector};
pub use registry::{PlanStep, SelectorKind, SelectorSpec};
pub use rng::{create_rng, shuffle};

/// Lower-is-better cost estimate for a model.
///
/// Must be pure for the duration of one `select` call.
pub type Heuristic<'a> = &'a dyn Fn(&Model) -> f64;

/// A beam-pruning strategy.
///
/// Implementations receive the candidate frontier, the heuristic and the
/// beam width, and return the models to keep. `&mut self` lets a strategy
/// carry its own RNG or call counter between calls; the candidate slice is
/// never modified.
pub trait Selector: Send {
    /// Stable name used in logs and metrics.
    fn name(&self) -> &str;

    /// Reduces `models` to at most `k` representatives.
    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model>;
}

impl<S: Selector + ?Sized> Selector for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        (**self).select(models, h, k)
    }
}

/// Evaluates the heuristic once per model.
pub(crate) fn score_all(models: &[Model], h: Heuristic<'_>) -> Vec<f64> {
    models.iter().map(h).collect()
}

/// Indices of `scores` in ascending order; ties keep input order.
pub(crate) fn ascending_order(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by_key(|&i| OrderedFloat(scores[i]));
    order
}

/// Logs a finished selection call.
pub(crate) fn trace_selection(name: &str, candidates: usize, k: usize, selected: usize) {
    tracing::debug!(
        selector = name,
        candidates = candidates,
        k = k,
        selected = selected,
        "Selection finished"
    );
}
