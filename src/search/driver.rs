//! The step-by-step beam search loop.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::SandboxConfig;
use crate::error::ConfigError;
use crate::field::PotentialField;
use crate::metrics::MetricsCollector;
use crate::model::{Model, ModelArena, ModelId};
use crate::selection::Selector;

use super::Grid;

const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;

/// Moves from a cell: straight down, then down-left, then down-right.
const MOVES: [(i32, f64); 3] = [(0, 1.0), (-1, DIAGONAL_COST), (1, DIAGONAL_COST)];

/// Result of a single [`BeamSearch::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The frontier moved one row down.
    Continue,
    /// A frontier model reached the last row.
    Solved(ModelId),
    /// No candidate survived expansion and selection.
    Exhausted,
}

/// How a finished search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStatus {
    Solved,
    Exhausted,
    StepLimit,
}

impl SearchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStatus::Solved => "solved",
            SearchStatus::Exhausted => "exhausted",
            SearchStatus::StepLimit => "step-limit",
        }
    }
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model that reached the goal row, with its reconstructed path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionSummary {
    pub id: ModelId,
    /// Cells from the start to the solution, root first.
    pub path: Vec<(i32, i32)>,
    /// Accumulated path cost.
    pub length: f64,
    /// Field activation at the solution cell.
    pub activation: f64,
}

/// Summary of a complete search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub steps: usize,
    pub solution: Option<SolutionSummary>,
    /// Frontier size after every step.
    pub frontier_sizes: Vec<usize>,
    /// Candidates handed to the selector over the whole run.
    pub candidates_considered: usize,
    /// Time spent inside the selector.
    pub selection_time: Duration,
}

impl SearchOutcome {
    pub fn is_solved(&self) -> bool {
        self.status == SearchStatus::Solved
    }

    /// Selection time in milliseconds.
    pub fn selection_ms(&self) -> f64 {
        self.selection_time.as_secs_f64() * 1000.0
    }
}

/// A beam search from a start cell towards the last row of a grid.
///
/// The search owns every model it creates. The selector decides which
/// candidates survive each step, so the same driver compares every
/// strategy under identical conditions.
pub struct BeamSearch {
    grid: Grid,
    field: PotentialField,
    selector: Box<dyn Selector>,
    label: String,
    beam_width: usize,
    deduplicate: bool,
    max_steps: usize,

    arena: ModelArena,
    frontier: Vec<Model>,
    visited: HashSet<(i32, i32)>,
    solution: Option<ModelId>,

    steps: usize,
    frontier_sizes: Vec<usize>,
    candidates_considered: usize,
    selection_time: Duration,
    metrics: MetricsCollector,
}

impl BeamSearch {
    /// Creates a search with an explicit selector.
    ///
    /// The configuration is taken as given; use [`BeamSearch::from_config`]
    /// to validate it and build the configured selector tree.
    pub fn new(config: &SandboxConfig, selector: Box<dyn Selector>) -> Self {
        let label = selector.name().to_string();
        let grid = config.grid();
        let mut arena = ModelArena::new();
        let start = arena.spawn(config.start_x, config.start_y, None, 0.0);
        let solution = grid.is_last_row(start.y).then_some(start.id);

        Self {
            grid,
            field: config.field(),
            selector,
            label,
            beam_width: config.beam_width,
            deduplicate: config.deduplicate,
            max_steps: config.max_steps,

            arena,
            frontier: vec![start],
            visited: HashSet::new(),
            solution,

            steps: 0,
            frontier_sizes: Vec::new(),
            candidates_considered: 0,
            selection_time: Duration::ZERO,
            metrics: MetricsCollector::new(),
        }
    }

    /// Validates the configuration and builds its selector tree for the
    /// configured grid width.
    pub fn from_config(config: &SandboxConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let selector = config.selector.build_for_grid(config.seed, config.width)?;
        Ok(Self::new(config, selector).with_label(config.selector.describe()))
    }

    /// Overrides the selector label used in logs and metrics.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn frontier(&self) -> &[Model] {
        &self.frontier
    }

    pub fn arena(&self) -> &ModelArena {
        &self.arena
    }

    pub fn field(&self) -> &PotentialField {
        &self.field
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn solution(&self) -> Option<ModelId> {
        self.solution
    }

    /// Expands the frontier into the next row's candidates.
    fn expand(&mut self) -> Vec<Model> {
        let mut candidates = Vec::with_capacity(self.frontier.len() * MOVES.len());
        let mut seen = HashSet::new();

        for parent in &self.frontier {
            self.visited.insert(parent.position());
        }

        for parent in &self.frontier {
            let y = parent.y + 1;
            for (dx, cost) in MOVES {
                let x = parent.x + dx;
                if !self.grid.is_open(x, y) || self.visited.contains(&(x, y)) {
                    continue;
                }
                if self.deduplicate && !seen.insert((x, y)) {
                    continue;
                }
                candidates.push(self.arena.spawn(x, y, Some(parent.id), parent.length + cost));
            }
        }

        candidates
    }

    /// Advances the search by one row.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(id) = self.solution {
            return StepOutcome::Solved(id);
        }

        let candidates = self.expand();
        self.steps += 1;

        if candidates.is_empty() {
            self.frontier.clear();
            self.frontier_sizes.push(0);
            tracing::debug!(step = self.steps, "No candidates left");
            return StepOutcome::Exhausted;
        }

        let field = &self.field;
        let heuristic = |model: &Model| field.heuristic(model);

        let started = Instant::now();
        let selected = self
            .selector
            .select(&candidates, &heuristic, self.beam_width);
        let elapsed = started.elapsed();

        self.selection_time += elapsed;
        self.candidates_considered += candidates.len();
        self.metrics
            .record_selection(self.selector.name(), candidates.len(), selected.len(), elapsed);

        tracing::debug!(
            step = self.steps,
            candidates = candidates.len(),
            selected = selected.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "Search step"
        );

        self.frontier = selected;
        self.frontier_sizes.push(self.frontier.len());

        if self.frontier.is_empty() {
            return StepOutcome::Exhausted;
        }

        match self.frontier.iter().find(|m| self.grid.is_last_row(m.y)) {
            Some(model) => {
                self.solution = Some(model.id);
                StepOutcome::Solved(model.id)
            }
            None => StepOutcome::Continue,
        }
    }

    /// Steps until the search is solved, exhausted or out of steps.
    pub fn run(&mut self) -> SearchOutcome {
        self.metrics.search_started();

        let status = loop {
            if self.solution.is_some() {
                break SearchStatus::Solved;
            }
            if self.steps >= self.max_steps {
                break SearchStatus::StepLimit;
            }
            match self.step() {
                StepOutcome::Continue => {}
                StepOutcome::Solved(_) => break SearchStatus::Solved,
                StepOutcome::Exhausted => break SearchStatus::Exhausted,
            }
        };

        self.metrics.search_finished();
        self.metrics
            .record_search(&self.label, status.as_str(), self.steps);

        let outcome = self.outcome(status);
        tracing::info!(
            selector = %self.label,
            status = %status,
            steps = outcome.steps,
            candidates = outcome.candidates_considered,
            selection_ms = outcome.selection_ms(),
            path_length = outcome.solution.as_ref().map(|s| s.length),
            "Search finished"
        );
        outcome
    }

    /// Snapshot of the search so far under the given status.
    pub fn outcome(&self, status: SearchStatus) -> SearchOutcome {
        SearchOutcome {
            status,
            steps: self.steps,
            solution: self.solution.and_then(|id| self.summarize(id)),
            frontier_sizes: self.frontier_sizes.clone(),
            candidates_considered: self.candidates_considered,
            selection_time: self.selection_time,
        }
    }

    fn summarize(&self, id: ModelId) -> Option<SolutionSummary> {
        let model = self.arena.get(id)?;
        Some(SolutionSummary {
            id,
            path: self.arena.path(id),
            length: model.length,
            activation: self.field.activation(model.x, model.y),
        })
    }
}

impl std::fmt::Debug for BeamSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeamSearch")
            .field("selector", &self.label)
            .field("beam_width", &self.beam_width)
            .field("steps", &self.steps)
            .field("frontier", &self.frontier.len())
            .field("solution", &self.solution)
            .finish()
    }
}
