//! Aggregated comparison results.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BenchmarkError;
use crate::search::SearchOutcome;

use super::RunStatistics;

/// Aggregates over all repetitions of one selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorSummary {
    pub selector: String,
    pub runs: usize,
    pub solved: usize,
    pub solved_ratio: f64,
    pub steps: RunStatistics,
    /// Over solved runs only.
    pub path_length: RunStatistics,
    /// Activation at the solution cell, over solved runs only.
    pub final_activation: RunStatistics,
    pub selection_ms: RunStatistics,
    pub candidates: RunStatistics,
}

impl SelectorSummary {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            runs: 0,
            solved: 0,
            solved_ratio: 0.0,
            steps: RunStatistics::new("steps"),
            path_length: RunStatistics::new("path_length"),
            final_activation: RunStatistics::new("final_activation"),
            selection_ms: RunStatistics::new("selection_ms"),
            candidates: RunStatistics::new("candidates"),
        }
    }

    /// Folds one search outcome into the summary.
    pub fn record(&mut self, outcome: &SearchOutcome) {
        self.runs += 1;
        self.steps.collect(outcome.steps as f64);
        self.selection_ms.collect(outcome.selection_ms());
        self.candidates.collect(outcome.candidates_considered as f64);

        if let Some(solution) = outcome.solution.as_ref().filter(|_| outcome.is_solved()) {
            self.solved += 1;
            self.path_length.collect(solution.length);
            self.final_activation.collect(solution.activation);
        }

        self.solved_ratio = self.solved as f64 / self.runs as f64;
    }
}

/// Result of comparing several selectors on the same sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub beam_width: usize,
    pub repetitions: usize,
    pub selectors: Vec<SelectorSummary>,
}

impl ComparisonReport {
    pub fn new(beam_width: usize, repetitions: usize, selectors: Vec<SelectorSummary>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            beam_width,
            repetitions,
            selectors,
        }
    }

    /// Summary for a selector description, if present.
    pub fn summary(&self, selector: &str) -> Option<&SelectorSummary> {
        self.selectors.iter().find(|s| s.selector == selector)
    }

    pub fn to_json(&self) -> Result<String, BenchmarkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), BenchmarkError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::model::ModelId;
    use crate::search::{SearchStatus, SolutionSummary};

    fn outcome(status: SearchStatus, steps: usize, length: f64) -> SearchOutcome {
        SearchOutcome {
            status,
            steps,
            solution: (status == SearchStatus::Solved).then(|| SolutionSummary {
                id: ModelId(1),
                path: vec![(0, 0), (0, 1)],
                length,
                activation: 0.5,
            }),
            frontier_sizes: vec![1; steps],
            candidates_considered: steps * 3,
            selection_time: Duration::from_millis(2),
        }
    }

    #[test]
    fn test_summary_counts_only_solved_paths() {
        let mut summary = SelectorSummary::new("top-k");
        summary.record(&outcome(SearchStatus::Solved, 99, 100.0));
        summary.record(&outcome(SearchStatus::Exhausted, 40, 0.0));

        assert_eq!(summary.runs, 2);
        assert_eq!(summary.solved, 1);
        assert!((summary.solved_ratio - 0.5).abs() < 1e-12);
        assert_eq!(summary.path_length.count, 1);
        assert_eq!(summary.steps.count, 2);
        assert!((summary.steps.mean - 69.5).abs() < 1e-12);
        assert!((summary.selection_ms.mean - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_json_file() {
        let mut summary = SelectorSummary::new("random");
        summary.record(&outcome(SearchStatus::Solved, 9, 10.0));
        let report = ComparisonReport::new(30, 1, vec![summary]);

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("report.json");
        report.write_json(&path).expect("written");

        let text = std::fs::read_to_string(&path).expect("readable");
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["beam_width"], 30);
        assert_eq!(value["selectors"][0]["selector"], "random");
        assert_eq!(value["run_id"], report.run_id.to_string());
        assert!(report.summary("random").is_some());
    }
}
