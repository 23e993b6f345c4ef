//! Heuristic ranking strategies.

use std::collections::HashSet;

use crate::model::Model;

use super::geometry::distance;
use super::{ascending_order, score_all, trace_selection, Heuristic, Selector};

/// Minimum spacing enforced by [`DiverseTopKSelector`]'s first pass.
const DEFAULT_MIN_DISTANCE: f64 = 3.0;

/// Greedy best-first truncation: the `k` lowest-heuristic models, ascending.
#[derive(Debug, Clone, Default)]
pub struct TopKSelector;

impl TopKSelector {
    pub fn new() -> Self {
        Self
    }
}

impl Selector for TopKSelector {
    fn name(&self) -> &str {
        "top-k"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        if models.is_empty() || k == 0 {
            return Vec::new();
        }

        let scores = score_all(models, h);
        let result: Vec<Model> = ascending_order(&scores)
            .into_iter()
            .take(k)
            .map(|i| models[i])
            .collect();

        trace_selection(self.name(), models.len(), k, result.len());
        result
    }
}

/// Best-first selection with a minimum spacing between picks.
///
/// Walks the candidates in heuristic order and admits a model only if it is
/// at least `min_distance` away from everything admitted so far. When the
/// spacing rule leaves the beam short, a second pass tops it up with the
/// best remaining models regardless of spacing. The result never exceeds
/// `k`.
#[derive(Debug, Clone)]
pub struct DiverseTopKSelector {
    min_distance: f64,
}

impl Default for DiverseTopKSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl DiverseTopKSelector {
    pub fn new() -> Self {
        Self {
            min_distance: DEFAULT_MIN_DISTANCE,
        }
    }

    /// Sets the minimum spacing for the first pass.
    pub fn with_min_distance(mut self, min_distance: f64) -> Self {
        self.min_distance = min_distance.max(0.0);
        self
    }

    /// Returns the minimum spacing for the first pass.
    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }
}

impl Selector for DiverseTopKSelector {
    fn name(&self) -> &str {
        "diverse-top-k"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        if models.is_empty() || k == 0 {
            return Vec::new();
        }

        if models.len() <= k {
            return models.to_vec();
        }

        let scores = score_all(models, h);
        let sorted = ascending_order(&scores);
        let mut selected: Vec<usize> = Vec::with_capacity(k);

        for &candidate in &sorted {
            let spaced = selected
                .iter()
                .all(|&s| distance(&models[candidate], &models[s]) >= self.min_distance);
            if spaced {
                selected.push(candidate);
                if selected.len() == k {
                    break;
                }
            }
        }

        let spaced_count = selected.len();
        if selected.len() < k {
            let taken: HashSet<usize> = selected.iter().copied().collect();
            let needed = k - selected.len();
            selected.extend(
                sorted
                    .iter()
                    .copied()
                    .filter(|i| !taken.contains(i))
                    .take(needed),
            );

            tracing::trace!(
                spaced = spaced_count,
                relaxed = selected.len() - spaced_count,
                "Relaxed spacing to fill beam"
            );
        }

        let result: Vec<Model> = selected.into_iter().map(|i| models[i]).collect();
        trace_selection(self.name(), models.len(), k, result.len());
        result
    }
}
