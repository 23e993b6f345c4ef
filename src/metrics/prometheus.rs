//! Prometheus metrics registration and export.
//!
//! All beam-select metrics live in one process-global registry. The registry
//! and its collectors are stored together in a `OnceLock` so that selectors
//! running on different threads record into the same series.

use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// The registry together with every collector registered in it.
///
/// Kept behind a single `OnceLock` so that a recorded series is always one
/// the exported registry knows about.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub registry: Registry,
    /// Total `select` calls, labeled by selector.
    pub selections_total: CounterVec,
    /// Wall time of one `select` call in seconds, labeled by selector.
    pub selection_duration: HistogramVec,
    /// Number of candidates handed to a selector.
    pub candidates: Histogram,
    /// Number of models a selector kept.
    pub selected: Histogram,
    /// Finished searches, labeled by selector and final status.
    pub searches_total: CounterVec,
    /// Steps taken per finished search, labeled by selector.
    pub search_steps: HistogramVec,
    /// Searches currently running.
    pub active_searches: Gauge,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

const SIZE_BUCKETS: [f64; 9] = [1.0, 5.0, 10.0, 20.0, 30.0, 50.0, 100.0, 200.0, 500.0];

/// Returns the global metrics, or `None` before [`init_metrics`] has run.
pub fn metrics() -> Option<&'static Metrics> {
    METRICS.get()
}

/// Initialize all metrics and register them with the registry.
///
/// Safe to call more than once and from several threads; the first complete
/// set stored wins and later calls are no-ops.
///
/// # Errors
///
/// Returns a `prometheus::Error` if metric registration fails, typically due to
/// duplicate metric names or invalid metric configurations.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = build_metrics()?;
    if METRICS.set(metrics).is_ok() {
        tracing::debug!("Prometheus metrics initialized");
    }

    Ok(())
}

fn build_metrics() -> Result<Metrics, prometheus::Error> {
    let registry = Registry::new();

    // Selection metrics
    let selections_total = CounterVec::new(
        Opts::new("beam_select_selections_total", "Total selector invocations"),
        &["selector"],
    )?;

    let selection_duration = HistogramVec::new(
        HistogramOpts::new(
            "beam_select_selection_duration_seconds",
            "Time spent in one select call in seconds",
        )
        .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["selector"],
    )?;

    let candidates = Histogram::with_opts(
        HistogramOpts::new(
            "beam_select_candidates",
            "Number of candidates passed to a selector",
        )
        .buckets(SIZE_BUCKETS.to_vec()),
    )?;

    let selected = Histogram::with_opts(
        HistogramOpts::new("beam_select_selected", "Number of models kept by a selector")
            .buckets(SIZE_BUCKETS.to_vec()),
    )?;

    // Search metrics
    let searches_total = CounterVec::new(
        Opts::new("beam_select_searches_total", "Total finished searches"),
        &["selector", "status"],
    )?;

    let search_steps = HistogramVec::new(
        HistogramOpts::new("beam_select_search_steps", "Steps taken per search")
            .buckets(vec![10.0, 25.0, 50.0, 100.0, 150.0, 250.0, 500.0, 1000.0]),
        &["selector"],
    )?;

    let active_searches = Gauge::new("beam_select_active_searches", "Searches currently running")?;

    registry.register(Box::new(selections_total.clone()))?;
    registry.register(Box::new(selection_duration.clone()))?;
    registry.register(Box::new(candidates.clone()))?;
    registry.register(Box::new(selected.clone()))?;
    registry.register(Box::new(searches_total.clone()))?;
    registry.register(Box::new(search_steps.clone()))?;
    registry.register(Box::new(active_searches.clone()))?;

    Ok(Metrics {
        registry,
        selections_total,
        selection_duration,
        candidates,
        selected,
        searches_total,
        search_steps,
        active_searches,
    })
}

/// Export all registered metrics in Prometheus text format.
///
/// Returns a comment line instead of metrics if the registry has not been
/// initialized or encoding fails.
pub fn export_metrics() -> String {
    let Some(Metrics { registry, .. }) = METRICS.get() else {
        return "# Metrics not initialized. Call init_metrics() first.\n".to_string();
    };

    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# Error encoding metrics: {}\n", e);
    }

    String::from_utf8(buffer)
        .unwrap_or_else(|e| format!("# Error converting metrics to UTF-8: {}\n", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics_idempotent() {
        assert!(init_metrics().is_ok());
        assert!(init_metrics().is_ok());
        assert!(metrics().is_some());
    }

    #[test]
    fn test_export_after_recording() {
        init_metrics().expect("metrics init");
        metrics()
            .expect("registered")
            .selections_total
            .with_label_values(&["export-test"])
            .inc();

        let text = export_metrics();
        assert!(!text.starts_with("# Error"));
        assert!(text.contains("beam_select_selections_total"));
        assert!(text.contains("export-test"));
    }

    #[test]
    fn test_concurrent_init_exports_recorded_series() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    init_metrics().expect("metrics init");
                    let label = format!("concurrent-init-{}", i);
                    metrics()
                        .expect("registered")
                        .selections_total
                        .with_label_values(&[label.as_str()])
                        .inc();
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread finished");
        }

        let text = export_metrics();
        for i in 0..8 {
            assert!(text.contains(&format!("concurrent-init-{}", i)));
        }
    }
}
