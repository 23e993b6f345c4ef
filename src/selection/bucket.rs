//! Deterministic hash-bucket strategies.
//!
//! Both selectors map every model to a bucket through a digest of its
//! coordinates, so the same cell always lands in the same bucket regardless
//! of the candidate order. Each bucket keeps the best model (lowest
//! heuristic) mapped to it.

use std::collections::{BTreeMap, VecDeque};

use sha2::{Digest, Sha256};

use crate::model::Model;

use super::{score_all, trace_selection, Heuristic, Selector};

/// Default bucket multiplier for [`BucketSelector2`].
const DEFAULT_MERGE_FACTOR: usize = 2;

/// Hashes a coordinate pair into a non-negative bucket key.
///
/// The SHA-256 digest of `"{x}:{y}"` is hex-encoded and folded with the
/// 32-bit signed string hash (`h = 31 * h + c`, wrapping). The absolute
/// value of that fold is returned.
pub fn coordinate_hash(x: i32, y: i32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(x.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(y.to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());

    let folded = digest
        .chars()
        .fold(0i32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as i32));
    i64::from(folded).unsigned_abs()
}

/// Bucket index of a model for `buckets` buckets. `buckets` must be non-zero.
fn bucket_of(model: &Model, buckets: usize) -> usize {
    (coordinate_hash(model.x, model.y) % buckets as u64) as usize
}

/// Keeps the best model of each of `k` coordinate-hash buckets.
///
/// Returns the non-empty buckets in index order. Colliding coordinates
/// share a bucket, so the result may be shorter than `k`; there is no
/// backfill.
#[derive(Debug, Clone, Default)]
pub struct BucketSelector;

impl BucketSelector {
    pub fn new() -> Self {
        Self
    }
}

impl Selector for BucketSelector {
    fn name(&self) -> &str {
        "simple-hash-bucket"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        if models.is_empty() || k == 0 {
            return Vec::new();
        }

        let scores = score_all(models, h);
        let mut buckets: BTreeMap<usize, usize> = BTreeMap::new();

        for (i, model) in models.iter().enumerate() {
            let slot = buckets.entry(bucket_of(model, k)).or_insert(i);
            if scores[i] < scores[*slot] {
                *slot = i;
            }
        }

        let result: Vec<Model> = buckets.values().map(|&i| models[i]).collect();
        trace_selection(self.name(), models.len(), k, result.len());
        result
    }
}

/// A bucket tracked by [`BucketSelector2`] during merging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeBucket {
    /// Index into the candidate list of the bucket's representative.
    pub representative: usize,

    /// Number of models that were mapped into this bucket, including merged ones.
    pub count: usize,
}

/// Hierarchical hash-bucket selector.
///
/// Hashes into `factor * k` buckets, then repeatedly merges the two buckets
/// with the lowest hit counts until only `k` remain. The merged bucket keeps
/// the better representative and the summed count, so representatives of
/// frequently hit regions survive longer.
#[derive(Debug, Clone)]
pub struct BucketSelector2 {
    factor: usize,
}

impl Default for BucketSelector2 {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketSelector2 {
    /// Creates a selector with twice as many initial buckets as `k`.
    pub fn new() -> Self {
        Self {
            factor: DEFAULT_MERGE_FACTOR,
        }
    }

    /// Sets the initial bucket multiplier (clamped to at least 1).
    pub fn with_factor(mut self, factor: usize) -> Self {
        self.factor = factor.max(1);
        self
    }

    /// Returns the initial bucket multiplier.
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Hashes the candidates into `factor * k` buckets.
    ///
    /// Returns the populated buckets in index order.
    pub fn initial_buckets(&self, models: &[Model], scores: &[f64], k: usize) -> Vec<MergeBucket> {
        let slots = k.saturating_mul(self.factor);
        if slots == 0 {
            return Vec::new();
        }

        let mut buckets: BTreeMap<usize, MergeBucket> = BTreeMap::new();
        for (i, model) in models.iter().enumerate() {
            buckets
                .entry(bucket_of(model, slots))
                .and_modify(|bucket| {
                    bucket.count += 1;
                    if scores[i] < scores[bucket.representative] {
                        bucket.representative = i;
                    }
                })
                .or_insert(MergeBucket {
                    representative: i,
                    count: 1,
                });
        }

        buckets.into_values().collect()
    }

    /// Merges the two lowest-count buckets until at most `k` remain.
    pub fn merge_buckets(buckets: Vec<MergeBucket>, scores: &[f64], k: usize) -> Vec<MergeBucket> {
        let mut buckets: VecDeque<MergeBucket> = buckets.into();

        while buckets.len() > k && buckets.len() >= 2 {
            buckets.make_contiguous().sort_by_key(|bucket| bucket.count);

            let (Some(first), Some(second)) = (buckets.pop_front(), buckets.pop_front()) else {
                break;
            };

            let representative = if scores[second.representative] < scores[first.representative] {
                second.representative
            } else {
                first.representative
            };

            buckets.push_front(MergeBucket {
                representative,
                count: first.count + second.count,
            });
        }

        buckets.into()
    }
}

impl Selector for BucketSelector2 {
    fn name(&self) -> &str {
        "hash-multibucket"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        if models.is_empty() || k == 0 {
            return Vec::new();
        }

        let scores = score_all(models, h);
        let initial = self.initial_buckets(models, &scores, k);
        let populated = initial.len();
        let merged = Self::merge_buckets(initial, &scores, k);

        tracing::trace!(
            populated = populated,
            remaining = merged.len(),
            "Merged hash buckets"
        );

        let result: Vec<Model> = merged.iter().map(|b| models[b.representative]).collect();
        trace_selection(self.name(), models.len(), k, result.len());
        result
    }
}
