//! Selectors built from other selectors.

use crate::model::Model;

use super::{trace_selection, Heuristic, Selector};

/// Splits the beam between several selectors and concatenates their picks.
///
/// The beam width is divided as evenly as integers allow: every selector
/// gets `k / n`, and the first `k % n` selectors get one more, so the shares
/// always add up to `k`. Each selector sees the full candidate list, so a
/// model can be picked more than once.
pub struct CombinedSelector {
    selectors: Vec<Box<dyn Selector>>,
}

impl CombinedSelector {
    pub fn new(selectors: Vec<Box<dyn Selector>>) -> Self {
        Self { selectors }
    }

    /// Number of wrapped selectors.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Returns true if no selector is wrapped.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Beam share of each wrapped selector for a total of `k`.
    pub fn shares(&self, k: usize) -> Vec<usize> {
        let n = self.selectors.len();
        if n == 0 {
            return Vec::new();
        }
        let base = k / n;
        let extra = k % n;
        (0..n).map(|i| base + usize::from(i < extra)).collect()
    }
}

impl std::fmt::Debug for CombinedSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.selectors.iter().map(|s| s.name()).collect();
        f.debug_struct("CombinedSelector")
            .field("selectors", &names)
            .finish()
    }
}

impl Selector for CombinedSelector {
    fn name(&self) -> &str {
        "combined"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        if models.is_empty() || k == 0 {
            return Vec::new();
        }

        let shares = self.shares(k);
        let mut result = Vec::new();
        for (selector, share) in self.selectors.iter_mut().zip(shares) {
            if share == 0 {
                continue;
            }
            result.extend(selector.select(models, h, share));
        }

        trace_selection(self.name(), models.len(), k, result.len());
        result
    }
}

/// Rotates through selectors on a weighted round-robin schedule.
///
/// The plan gives each selector a number of consecutive turns; every call
/// delegates entirely to the selector whose turn it is, with the full beam
/// width, and then moves on to the next slot.
pub struct CombinedSequentialSelector {
    selectors: Vec<Box<dyn Selector>>,
    schedule: Vec<usize>,
    index: usize,
}

impl CombinedSequentialSelector {
    /// Builds a schedule from `(selector, repeat)` pairs.
    ///
    /// Pairs with `repeat == 0` never get a turn.
    pub fn new(plan: Vec<(Box<dyn Selector>, usize)>) -> Self {
        let mut selectors = Vec::with_capacity(plan.len());
        let mut schedule = Vec::new();

        for (selector, repeat) in plan {
            if repeat == 0 {
                continue;
            }
            schedule.extend(std::iter::repeat_n(selectors.len(), repeat));
            selectors.push(selector);
        }

        Self {
            selectors,
            schedule,
            index: 0,
        }
    }

    /// Length of one full rotation.
    pub fn schedule_len(&self) -> usize {
        self.schedule.len()
    }

    /// Name of the selector that will handle the next call.
    pub fn current(&self) -> Option<&str> {
        self.schedule
            .get(self.index)
            .map(|&slot| self.selectors[slot].name())
    }
}

impl std::fmt::Debug for CombinedSequentialSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.selectors.iter().map(|s| s.name()).collect();
        f.debug_struct("CombinedSequentialSelector")
            .field("selectors", &names)
            .field("schedule", &self.schedule)
            .field("index", &self.index)
            .finish()
    }
}

impl Selector for CombinedSequentialSelector {
    fn name(&self) -> &str {
        "combined-sequential"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        let Some(&slot) = self.schedule.get(self.index) else {
            return Vec::new();
        };
        self.index = (self.index + 1) % self.schedule.len();

        let selector = &mut self.selectors[slot];
        tracing::trace!(delegate = selector.name(), "Sequential selector turn");
        selector.select(models, h, k)
    }
}
