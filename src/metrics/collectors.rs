//! High-level recording interface for selection and search metrics.
//!
//! `MetricsCollector` wraps the raw Prometheus collectors with consistent
//! labels. Every method is a no-op until `init_metrics()` has run, so library
//! users who never export metrics pay only for the `OnceLock` lookups.

use std::time::Duration;

use super::prometheus::metrics;

/// Metrics collector for beam-select operations.
///
/// # Example
///
/// ```ignore
/// use beam_select::metrics::{init_metrics, MetricsCollector};
///
/// init_metrics().expect("Failed to init metrics");
/// let collector = MetricsCollector::new();
/// collector.record_selection("top-k", 87, 30, elapsed);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    /// Create a new MetricsCollector instance.
    pub fn new() -> Self {
        Self
    }

    /// Record one `select` call.
    pub fn record_selection(
        &self,
        selector: &str,
        candidates: usize,
        selected: usize,
        elapsed: Duration,
    ) {
        let Some(metrics) = metrics() else {
            return;
        };

        metrics.selections_total.with_label_values(&[selector]).inc();
        metrics
            .selection_duration
            .with_label_values(&[selector])
            .observe(elapsed.as_secs_f64());
        metrics.candidates.observe(candidates as f64);
        metrics.selected.observe(selected as f64);
    }

    /// Record a finished search.
    ///
    /// # Arguments
    ///
    /// * `selector` - Description of the selector tree
    /// * `status` - Final status label ("solved", "exhausted", "step-limit")
    /// * `steps` - Number of steps taken
    pub fn record_search(&self, selector: &str, status: &str, steps: usize) {
        if let Some(metrics) = metrics() {
            metrics
                .searches_total
                .with_label_values(&[selector, status])
                .inc();
            metrics
                .search_steps
                .with_label_values(&[selector])
                .observe(steps as f64);
        }

        tracing::trace!(
            selector = selector,
            status = status,
            steps = steps,
            "Recorded search metric"
        );
    }

    /// Increment the running-search gauge.
    pub fn search_started(&self) {
        if let Some(metrics) = metrics() {
            metrics.active_searches.inc();
        }
    }

    /// Decrement the running-search gauge.
    pub fn search_finished(&self) {
        if let Some(metrics) = metrics() {
            metrics.active_searches.dec();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{export_metrics, init_metrics, metrics};

    #[test]
    fn test_metrics_collector_new() {
        let collector = MetricsCollector::new();
        assert!(std::mem::size_of_val(&collector) == 0);
    }

    #[test]
    fn test_record_selection() {
        init_metrics().expect("metrics init");
        let collector = MetricsCollector::new();

        collector.record_selection("collector-test", 90, 30, Duration::from_micros(40));
        collector.record_selection("collector-test", 0, 0, Duration::ZERO);

        let count = metrics()
            .expect("registered")
            .selections_total
            .with_label_values(&["collector-test"])
            .get();
        assert!(count >= 2.0);
    }

    #[test]
    fn test_record_search() {
        init_metrics().expect("metrics init");
        let collector = MetricsCollector::new();

        collector.search_started();
        collector.record_search("collector-search", "solved", 99);
        collector.search_finished();

        assert!(export_metrics().contains("collector-search"));
    }
}
