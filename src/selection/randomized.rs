//! Shuffle-based strategies.
//!
//! These selectors shuffle a private copy of the candidate list and either
//! deal it round-robin into `k` buckets or simply truncate it. They own a
//! [`ChaCha8Rng`] so a fixed seed reproduces a run exactly.

use rand_chacha::ChaCha8Rng;

use crate::model::Model;

use super::rng::{create_rng, shuffled_indices};
use super::{score_all, trace_selection, Heuristic, Selector};

/// Deals shuffled candidates into `k` buckets and keeps the best of each.
///
/// Every model has the same chance of landing in any bucket. Returns the
/// non-empty buckets in index order, without backfill.
#[derive(Debug, Clone)]
pub struct RandomBucketSelector {
    rng: ChaCha8Rng,
}

impl Default for RandomBucketSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomBucketSelector {
    pub fn new() -> Self {
        Self {
            rng: create_rng(None),
        }
    }

    /// Seeds the shuffle for reproducible selections.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = create_rng(Some(seed));
        self
    }
}

impl Selector for RandomBucketSelector {
    fn name(&self) -> &str {
        "random-bucket"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        if models.is_empty() || k == 0 {
            return Vec::new();
        }

        let scores = score_all(models, h);
        // Position `i` lands in bucket `i % k`, so at most `n` buckets are ever hit.
        let slots = k.min(models.len());
        let mut buckets: Vec<Option<usize>> = vec![None; slots];

        for (position, index) in shuffled_indices(models.len(), &mut self.rng)
            .into_iter()
            .enumerate()
        {
            let slot = position % slots;
            let improves = match buckets[slot] {
                Some(current) => scores[index] < scores[current],
                None => true,
            };
            if improves {
                buckets[slot] = Some(index);
            }
        }

        let result: Vec<Model> = buckets.into_iter().flatten().map(|i| models[i]).collect();
        trace_selection(self.name(), models.len(), k, result.len());
        result
    }
}

/// Random buckets with a global coordinate check.
///
/// Like [`RandomBucketSelector`], but a model is never placed while any
/// bucket (its own included) already holds a model on the same cell. This
/// keeps duplicate coordinates out of the result at the price of sometimes
/// leaving buckets empty.
#[derive(Debug, Clone)]
pub struct BucketSelector3 {
    rng: ChaCha8Rng,
}

impl Default for BucketSelector3 {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketSelector3 {
    pub fn new() -> Self {
        Self {
            rng: create_rng(None),
        }
    }

    /// Seeds the shuffle for reproducible selections.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = create_rng(Some(seed));
        self
    }
}

impl Selector for BucketSelector3 {
    fn name(&self) -> &str {
        "random-uniform-bucket"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        if models.is_empty() || k == 0 {
            return Vec::new();
        }

        let scores = score_all(models, h);
        let slots = k.min(models.len());
        let mut buckets: Vec<Option<usize>> = vec![None; slots];

        for (position, index) in shuffled_indices(models.len(), &mut self.rng)
            .into_iter()
            .enumerate()
        {
            let slot = position % slots;
            let improves = match buckets[slot] {
                Some(current) => scores[index] < scores[current],
                None => true,
            };
            if !improves {
                continue;
            }

            let occupied = buckets
                .iter()
                .flatten()
                .any(|&held| models[held].same_position(&models[index]));
            if !occupied {
                buckets[slot] = Some(index);
            }
        }

        let result: Vec<Model> = buckets.into_iter().flatten().map(|i| models[i]).collect();
        trace_selection(self.name(), models.len(), k, result.len());
        result
    }
}

/// Keeps a uniformly random subset of `min(k, n)` candidates.
///
/// Ignores the heuristic entirely; useful as a baseline.
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: ChaCha8Rng,
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSelector {
    pub fn new() -> Self {
        Self {
            rng: create_rng(None),
        }
    }

    /// Seeds the shuffle for reproducible selections.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = create_rng(Some(seed));
        self
    }
}

impl Selector for RandomSelector {
    fn name(&self) -> &str {
        "random"
    }

    fn select(&mut self, models: &[Model], _h: Heuristic<'_>, k: usize) -> Vec<Model> {
        if models.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut indices = shuffled_indices(models.len(), &mut self.rng);
        indices.truncate(k);

        let result: Vec<Model> = indices.into_iter().map(|i| models[i]).collect();
        trace_selection(self.name(), models.len(), k, result.len());
        result
    }
}
