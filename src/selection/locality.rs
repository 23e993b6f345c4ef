//! Position-window bucket selector with a widening horizon.
//!
//! Buckets are slices of the horizontal axis inside a window centered on the
//! grid's middle column. The window starts narrow and grows by one column on
//! each side per call, modelling a beam that is first kept near the center
//! and allowed to spread out as the search progresses.

use serde::Serialize;

use crate::model::Model;

use super::{ascending_order, score_all, trace_selection, Heuristic, Selector};

const DEFAULT_CENTER: i64 = 50;
const DEFAULT_MAX_SPAN: i64 = 100;

/// The horizontal window used for one call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocalityWindow {
    /// Leftmost column of the window.
    pub min_range: i64,

    /// Rightmost column of the window.
    pub max_range: i64,

    /// Bucket width in columns; below 1 the raw `x` is the bucket.
    pub step: f64,
}

impl LocalityWindow {
    /// Bucket index for column `x`, or `None` when `x` lies left of the window.
    pub fn bucket(&self, x: i32) -> Option<usize> {
        let index = if self.step < 1.0 {
            i64::from(x)
        } else {
            ((i64::from(x) - self.min_range) as f64 / self.step).floor() as i64
        };
        usize::try_from(index).ok()
    }
}

/// Bucket selector whose window depends on how often it has been called.
///
/// Call `n` (starting at the configured epoch, 1 by default) uses the window
/// `[max(0, center - n), min(2 * center, center + n)]`. When the buckets
/// yield fewer than `k` models the result is topped up with the globally
/// best candidates: `min(found, k - found) + 1` of them, which may repeat
/// bucket winners and may push the result past `k`.
#[derive(Debug, Clone)]
pub struct LocalitySensitiveBucketSelector {
    epoch: u64,
    center: i64,
    max_span: i64,
}

impl Default for LocalitySensitiveBucketSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalitySensitiveBucketSelector {
    pub fn new() -> Self {
        Self {
            epoch: 1,
            center: DEFAULT_CENTER,
            max_span: DEFAULT_MAX_SPAN,
        }
    }

    /// Starts counting from `epoch` instead of 1.
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    /// Moves the window center and its maximal span.
    pub fn with_center(mut self, center: i64, max_span: i64) -> Self {
        self.center = center;
        self.max_span = max_span.max(1);
        self
    }

    /// Epoch the next call will use.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Resets the call counter to 1.
    pub fn reset(&mut self) {
        self.epoch = 1;
    }

    /// Window for the current epoch and beam width `k`.
    pub fn window(&self, k: usize) -> LocalityWindow {
        let epoch = i64::try_from(self.epoch).unwrap_or(i64::MAX);
        let min_range = self.center.saturating_sub(epoch).max(0);
        let max_range = self.center.saturating_add(epoch).min(2 * self.center);
        let span = (max_range - min_range + 1).min(self.max_span);

        LocalityWindow {
            min_range,
            max_range,
            step: span as f64 / k.max(1) as f64,
        }
    }
}

impl Selector for LocalitySensitiveBucketSelector {
    fn name(&self) -> &str {
        "locality-sensitive-bucket"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        let window = self.window(k);
        self.epoch = self.epoch.saturating_add(1);

        if models.is_empty() || k == 0 {
            return Vec::new();
        }

        let scores = score_all(models, h);
        let mut buckets: std::collections::BTreeMap<usize, usize> = Default::default();
        for (i, model) in models.iter().enumerate() {
            let Some(bucket) = window.bucket(model.x) else {
                continue;
            };
            let slot = buckets.entry(bucket).or_insert(i);
            if scores[i] < scores[*slot] {
                *slot = i;
            }
        }

        let mut result: Vec<Model> = buckets.values().map(|&i| models[i]).collect();

        if result.len() < k {
            let found = result.len();
            let backfill = found.min(k - found) + 1;
            result.extend(
                ascending_order(&scores)
                    .into_iter()
                    .take(backfill)
                    .map(|i| models[i]),
            );
            tracing::trace!(
                found = found,
                backfill = backfill,
                "Backfilled locality buckets"
            );
        }

        tracing::debug!(
            epoch = self.epoch - 1,
            min_range = window.min_range,
            max_range = window.max_range,
            step = window.step,
            "Locality window"
        );
        trace_selection(self.name(), models.len(), k, result.len());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::test_support::{by_x, line, models_at};

    #[test]
    fn test_epoch_advances_per_call() {
        let mut selector = LocalitySensitiveBucketSelector::new();
        let models = line(10);

        assert_eq!(selector.epoch(), 1);
        selector.select(&models, &by_x, 3);
        selector.select(&models, &by_x, 3);
        assert_eq!(selector.epoch(), 3);
    }

    #[test]
    fn test_window_widens_between_calls() {
        let mut selector = LocalitySensitiveBucketSelector::new();
        let first = selector.window(10);
        selector.select(&line(5), &by_x, 10);
        let second = selector.window(10);

        assert_eq!((first.min_range, first.max_range), (49, 51));
        assert_eq!((second.min_range, second.max_range), (48, 52));
        assert!(second.min_range < first.min_range);
        assert!(second.max_range > first.max_range);
    }

    #[test]
    fn test_window_clamped_to_grid() {
        let selector = LocalitySensitiveBucketSelector::new().with_epoch(500);
        let window = selector.window(10);
        assert_eq!((window.min_range, window.max_range), (0, 100));
        assert!((window.step - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_narrow_window_buckets_by_raw_x() {
        let selector = LocalitySensitiveBucketSelector::new();
        let window = selector.window(30);
        assert!(window.step < 1.0);
        assert_eq!(window.bucket(47), Some(47));
        assert_eq!(window.bucket(-1), None);
    }

    #[test]
    fn test_wide_window_bucket_arithmetic() {
        let selector = LocalitySensitiveBucketSelector::new().with_epoch(50);
        let window = selector.window(10);
        // span 100 over 10 buckets
        assert_eq!(window.bucket(0), Some(0));
        assert_eq!(window.bucket(9), Some(0));
        assert_eq!(window.bucket(10), Some(1));
        assert_eq!(window.bucket(99), Some(9));
    }

    #[test]
    fn test_left_of_window_not_bucketed() {
        let selector = LocalitySensitiveBucketSelector::new().with_epoch(10);
        let window = selector.window(2);
        assert_eq!(window.bucket(39), None);
        assert_eq!(window.bucket(40), Some(0));
    }

    #[test]
    fn test_full_buckets_no_backfill() {
        // step < 1: each distinct x is its own bucket
        let models = models_at(&[(48, 5), (49, 5), (50, 5), (51, 5)]);
        let mut selector = LocalitySensitiveBucketSelector::new();
        let result = selector.select(&models, &by_x, 4);

        let xs: Vec<i32> = result.iter().map(|m| m.x).collect();
        assert_eq!(xs, vec![48, 49, 50, 51]);
    }

    #[test]
    fn test_backfill_appends_best_models() {
        let models = models_at(&[(50, 1), (50, 2), (50, 3)]);
        let mut selector = LocalitySensitiveBucketSelector::new();
        let by_y = |m: &Model| f64::from(m.y);
        let result = selector.select(&models, &by_y, 5);

        // One bucket found, then min(1, 4) + 1 = 2 best models appended
        let ys: Vec<i32> = result.iter().map(|m| m.y).collect();
        assert_eq!(ys, vec![1, 1, 2]);
    }

    #[test]
    fn test_backfill_may_exceed_k() {
        let models = models_at(&[(50, 0), (51, 0), (52, 0), (53, 0)]);
        let mut selector = LocalitySensitiveBucketSelector::new().with_epoch(1);
        // window [49, 51], step 3/4 < 1 -> raw x buckets: 50, 51, 52, 53 all present
        let result = selector.select(&models, &by_x, 5);
        assert_eq!(result.len(), 4 + 1 + 1);
    }

    #[test]
    fn test_zero_k_and_empty() {
        let mut selector = LocalitySensitiveBucketSelector::new();
        assert!(selector.select(&line(4), &by_x, 0).is_empty());
        assert!(selector.select(&[], &by_x, 4).is_empty());
        // degenerate calls still advance the epoch
        assert_eq!(selector.epoch(), 3);
    }

    #[test]
    fn test_reset() {
        let mut selector = LocalitySensitiveBucketSelector::new().with_epoch(17);
        selector.reset();
        assert_eq!(selector.epoch(), 1);
    }
}
