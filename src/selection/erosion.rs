//! Score-erosion diversity selection.
//!
//! Each pick pushes the scores of its neighbours up: every unselected model
//! has its erosion multiplied by `1 / (1 - exp(-d / beta))`, where `d` is its
//! distance to the model just selected. Close neighbours become much less
//! attractive while distant models are barely affected, so later picks
//! spread out over the field.

use serde::Serialize;

use crate::model::Model;

use super::geometry::distance;
use super::{score_all, trace_selection, Heuristic, Selector};

const DEFAULT_BETA: f64 = 1.0;

/// Selection plus the per-candidate annotations the erosion produced.
#[derive(Debug, Clone, Serialize)]
pub struct ErosionOutcome {
    /// Selected models, in pick order.
    pub selected: Vec<Model>,

    /// Final erosion multiplier of each input candidate (index-aligned).
    pub erosion: Vec<f64>,

    /// Whether each input candidate was picked (index-aligned).
    pub picked: Vec<bool>,
}

/// Greedy selection under a repulsive erosion field.
#[derive(Debug, Clone)]
pub struct ScoreErosionSelector {
    beta: f64,
}

impl Default for ScoreErosionSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreErosionSelector {
    pub fn new() -> Self {
        Self { beta: DEFAULT_BETA }
    }

    /// Sets the repulsion length scale. Non-positive values fall back to 1.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = if beta > 0.0 { beta } else { DEFAULT_BETA };
        self
    }

    /// Returns the repulsion length scale.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Runs the erosion selection and returns the annotations with it.
    ///
    /// The input slice is left untouched; erosion and selection flags live in
    /// the returned [`ErosionOutcome`].
    pub fn select_annotated(&self, models: &[Model], h: Heuristic<'_>, k: usize) -> ErosionOutcome {
        let n = models.len();
        let mut erosion = vec![1.0; n];
        let mut picked = vec![false; n];
        let mut selected = Vec::with_capacity(k.min(n));

        if n == 0 || k == 0 {
            return ErosionOutcome {
                selected,
                erosion,
                picked,
            };
        }

        let scores = score_all(models, h);
        let mut best = lowest(n, |i| Some(scores[i]));

        while let Some(current) = best {
            picked[current] = true;
            selected.push(models[current]);
            if selected.len() == k {
                break;
            }

            for i in 0..n {
                if picked[i] {
                    continue;
                }
                let d = distance(&models[i], &models[current]);
                erosion[i] /= 1.0 - (-d / self.beta).exp();
            }

            // Picked models score +inf, so they are skipped outright
            best = lowest(n, |i| (!picked[i]).then(|| scores[i] * erosion[i]));
        }

        ErosionOutcome {
            selected,
            erosion,
            picked,
        }
    }
}

/// Index with the lowest score, first on ties; `None` entries are skipped.
///
/// An all-infinite (or NaN) candidate set still yields its first entry.
fn lowest(n: usize, score: impl Fn(usize) -> Option<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in 0..n {
        let Some(value) = score(i) else {
            continue;
        };
        match best {
            Some((_, best_value)) if value.total_cmp(&best_value).is_ge() => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

impl Selector for ScoreErosionSelector {
    fn name(&self) -> &str {
        "score-erosion"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        let outcome = self.select_annotated(models, h, k);
        trace_selection(self.name(), models.len(), k, outcome.selected.len());
        outcome.selected
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::selection::test_support::{by_x, drawn_from, from_origin, line, models_at};

    #[test]
    fn test_first_pick_is_global_minimum() {
        let models = models_at(&[(5, 5), (1, 0), (9, 9), (0, 3)]);
        let result = ScoreErosionSelector::new().select(&models, &from_origin, 3);
        assert_eq!(result[0].position(), (1, 0));
    }

    #[test]
    fn test_no_duplicates_and_bounded() {
        let models = line(12);
        for k in [1, 4, 12, 40] {
            let result = ScoreErosionSelector::new().select(&models, &by_x, k);
            let ids: HashSet<_> = result.iter().map(|m| m.id).collect();

            assert_eq!(result.len(), k.min(models.len()));
            assert_eq!(ids.len(), result.len());
            assert!(drawn_from(&result, &models));
        }
    }

    #[test]
    fn test_erosion_spreads_picks() {
        // Pure top-k would take x = 0, 1; erosion pushes the second pick away
        let models = line(20);
        let h = |m: &Model| 1.0 + 0.01 * f64::from(m.x);
        let result = ScoreErosionSelector::new().select(&models, &h, 2);

        assert_eq!(result[0].x, 0);
        assert!(result[1].x > 1, "second pick {}", result[1].x);
    }

    #[test]
    fn test_annotations_reflect_picks() {
        let models = line(6);
        let outcome = ScoreErosionSelector::new().select_annotated(&models, &by_x, 2);

        assert_eq!(outcome.picked.iter().filter(|&&p| p).count(), 2);
        assert_eq!(outcome.erosion.len(), 6);
        // Neighbours of picks were eroded, the first pick was never eroded
        assert_eq!(outcome.erosion[0], 1.0);
        assert!(outcome.erosion[5] > 1.0);
    }

    #[test]
    fn test_duplicate_cells_still_selectable() {
        // Same cell gives infinite erosion; the duplicate is still picked last
        let models = models_at(&[(0, 0), (0, 0)]);
        let result = ScoreErosionSelector::new().select(&models, &by_x, 2);
        assert_eq!(result.len(), 2);
        assert_ne!(result[0].id, result[1].id);
    }

    #[test]
    fn test_guards_and_beta() {
        let mut selector = ScoreErosionSelector::new();
        assert!(selector.select(&[], &by_x, 3).is_empty());
        assert!(selector.select(&line(3), &by_x, 0).is_empty());
        assert_eq!(ScoreErosionSelector::new().with_beta(-2.0).beta(), 1.0);
        assert_eq!(ScoreErosionSelector::new().with_beta(2.5).beta(), 2.5);
    }

    #[test]
    fn test_lowest_prefers_first_on_ties() {
        assert_eq!(lowest(3, |_| Some(1.0)), Some(0));
        assert_eq!(lowest(3, |_| Some(f64::INFINITY)), Some(0));
        assert_eq!(lowest(3, |i| (i > 0).then_some(2.0)), Some(1));
        assert_eq!(lowest(0, |_| Some(1.0)), None);
    }
}
