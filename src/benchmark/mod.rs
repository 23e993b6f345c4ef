//! Side-by-side comparison of selector strategies.
//!
//! Every `(selector, repetition)` pair is an independent search on its own
//! freshly built selector, run on tokio's blocking pool. Repetition `r` uses
//! seed `base_seed + r` for every selector, so randomized strategies are
//! compared on the same random streams.

pub mod report;
pub mod statistics;

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::SandboxConfig;
use crate::error::BenchmarkError;
use crate::search::{BeamSearch, SearchOutcome};
use crate::selection::SelectorSpec;

pub use report::{ComparisonReport, SelectorSummary};
pub use statistics::RunStatistics;

/// Seed used when the configuration does not fix one.
pub const DEFAULT_BASE_SEED: u64 = 0;

/// Parameters of a comparison run.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub selectors: Vec<SelectorSpec>,
    pub repetitions: usize,
    pub concurrency: usize,
}

impl CompareOptions {
    pub fn new(selectors: Vec<SelectorSpec>) -> Self {
        Self {
            selectors,
            repetitions: 10,
            concurrency: default_concurrency(),
        }
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    fn validate(&self) -> Result<(), BenchmarkError> {
        if self.selectors.is_empty() {
            return Err(BenchmarkError::InvalidSetup(
                "no selectors to compare".to_string(),
            ));
        }
        if self.repetitions == 0 {
            return Err(BenchmarkError::InvalidSetup(
                "repetitions must be greater than 0".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(BenchmarkError::InvalidSetup(
                "concurrency must be greater than 0".to_string(),
            ));
        }
        for spec in &self.selectors {
            spec.validate()?;
        }
        Ok(())
    }
}

/// Number of available CPUs, or 1 if unknown.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1)
}

/// Runs every selector `repetitions` times on the sandbox and aggregates the
/// outcomes.
///
/// The `selector` field of `config` is ignored; each entry of
/// `options.selectors` replaces it in turn.
///
/// # Errors
///
/// Returns `BenchmarkError` if the setup is invalid or a search task panics.
pub async fn compare(
    config: &SandboxConfig,
    options: &CompareOptions,
) -> Result<ComparisonReport, BenchmarkError> {
    config.validate()?;
    options.validate()?;

    let base_seed = config.seed.unwrap_or(DEFAULT_BASE_SEED);
    let semaphore = Arc::new(Semaphore::new(options.concurrency));
    let mut handles = Vec::with_capacity(options.selectors.len() * options.repetitions);

    tracing::info!(
        selectors = options.selectors.len(),
        repetitions = options.repetitions,
        concurrency = options.concurrency,
        beam_width = config.beam_width,
        "Starting selector comparison"
    );

    for (index, spec) in options.selectors.iter().enumerate() {
        for repetition in 0..options.repetitions {
            let run_config = config
                .clone()
                .with_selector(spec.clone())
                .with_seed(base_seed.wrapping_add(repetition as u64));
            let sem = semaphore.clone();

            handles.push(tokio::spawn(async move {
                let permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|e| BenchmarkError::TaskFailed(e.to_string()))?;
                let outcome = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    run_search(&run_config)
                })
                .await
                .map_err(|e| BenchmarkError::TaskFailed(e.to_string()))??;
                Ok::<_, BenchmarkError>((index, outcome))
            }));
        }
    }

    let mut summaries: Vec<SelectorSummary> = options
        .selectors
        .iter()
        .map(|spec| SelectorSummary::new(spec.describe()))
        .collect();

    for handle in handles {
        let (index, outcome) = handle
            .await
            .map_err(|e| BenchmarkError::TaskFailed(e.to_string()))??;
        summaries[index].record(&outcome);
    }

    for summary in &summaries {
        tracing::info!(
            selector = %summary.selector,
            solved = summary.solved,
            runs = summary.runs,
            mean_steps = summary.steps.mean,
            mean_path_length = summary.path_length.mean,
            "Selector summary"
        );
    }

    Ok(ComparisonReport::new(
        config.beam_width,
        options.repetitions,
        summaries,
    ))
}

fn run_search(config: &SandboxConfig) -> Result<SearchOutcome, BenchmarkError> {
    let mut search = BeamSearch::from_config(config)?;
    Ok(search.run())
}
