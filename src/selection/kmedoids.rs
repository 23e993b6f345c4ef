//! K-medoids clustering selector.
//!
//! Clustering decides *where* to sample, the heuristic decides *which*
//! model represents each region: the candidates are grouped into `k`
//! clusters with Lloyd-style medoid iteration, and the lowest-heuristic
//! member of every cluster is kept.

use ndarray::Array2;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};

use crate::model::Model;

use super::geometry::pairwise_distances;
use super::rng::{create_rng, shuffled_indices};
use super::{score_all, trace_selection, Heuristic, Selector};

/// Total medoid movement below which the clustering has converged.
const CONVERGENCE_THRESHOLD: f64 = 0.01;

/// Iteration cap for the assignment/update loop.
const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Distances between the distinct cells of a candidate set.
///
/// Candidates on the same cell share a row, so the matrix grows with the
/// number of distinct positions instead of the number of candidates.
#[derive(Debug, Clone)]
struct CellDistances {
    cell_of: Vec<usize>,
    matrix: Array2<f64>,
}

impl CellDistances {
    fn new(models: &[Model]) -> Self {
        let mut index: HashMap<(i32, i32), usize> = HashMap::new();
        let mut cells: Vec<Model> = Vec::new();
        let cell_of: Vec<usize> = models
            .iter()
            .map(|model| {
                *index.entry(model.position()).or_insert_with(|| {
                    cells.push(*model);
                    cells.len() - 1
                })
            })
            .collect();

        Self {
            cell_of,
            matrix: pairwise_distances(&cells),
        }
    }

    /// Number of distinct cells.
    fn cells(&self) -> usize {
        self.matrix.nrows()
    }

    /// Cell index of candidate `model`.
    fn cell(&self, model: usize) -> usize {
        self.cell_of[model]
    }

    /// Distance between candidates `a` and `b`.
    fn between(&self, a: usize, b: usize) -> f64 {
        self.matrix[[self.cell_of[a], self.cell_of[b]]]
    }
}

/// Result of one clustering run, expressed as indices into the candidates.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Final medoid of each cluster.
    pub medoids: Vec<usize>,

    /// Members of each cluster, in (shuffled) visiting order.
    pub clusters: Vec<Vec<usize>>,

    /// Number of assignment/update rounds performed.
    pub iterations: usize,

    /// Whether the movement dropped below the threshold before the cap.
    pub converged: bool,
}

/// Selects the best model from each of `k` medoid clusters.
#[derive(Debug, Clone)]
pub struct KMedianSelector {
    rng: ChaCha8Rng,
    max_iterations: usize,
}

impl Default for KMedianSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl KMedianSelector {
    pub fn new() -> Self {
        Self {
            rng: create_rng(None),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Seeds the initial medoid draw.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = create_rng(Some(seed));
        self
    }

    /// Caps the number of assignment/update rounds (at least 1).
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Returns the iteration cap.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Clusters `models` around at most `k` medoids.
    ///
    /// Initial medoids are the first `k` distinct cells of a random
    /// permutation. Every model, duplicates included, is then assigned to
    /// its nearest medoid and each medoid is replaced by the member with the
    /// smallest summed distance to its cluster, until the summed medoid
    /// movement drops below 0.01 or the iteration cap is reached.
    pub fn cluster(&mut self, models: &[Model], k: usize) -> Clustering {
        if models.is_empty() || k == 0 {
            return Clustering {
                medoids: Vec::new(),
                clusters: Vec::new(),
                iterations: 0,
                converged: true,
            };
        }

        let order = shuffled_indices(models.len(), &mut self.rng);
        let distances = CellDistances::new(models);

        let mut seen: HashSet<usize> = HashSet::new();
        let mut medoids: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&i| seen.insert(distances.cell(i)))
            .take(k)
            .collect();

        let mut clusters = Vec::new();
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;
            clusters = assign(&order, &medoids, &distances);

            let updated: Vec<usize> = clusters
                .iter()
                .zip(&medoids)
                .map(|(members, &medoid)| select_medoid(members, &distances).unwrap_or(medoid))
                .collect();

            let movement: f64 = medoids
                .iter()
                .zip(&updated)
                .map(|(&old, &new)| distances.between(old, new))
                .sum();

            medoids = updated;
            tracing::trace!(iteration = iterations, movement = movement, "K-medoids round");

            if movement < CONVERGENCE_THRESHOLD {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                max_iterations = self.max_iterations,
                candidates = models.len(),
                cells = distances.cells(),
                k = k,
                "K-medoids did not converge, using last assignment"
            );
        }

        Clustering {
            medoids,
            clusters,
            iterations,
            converged,
        }
    }
}

/// Assigns every index in `order` to its nearest medoid.
///
/// A medoid only wins when strictly closer, so ties go to the earlier medoid.
fn assign(order: &[usize], medoids: &[usize], distances: &CellDistances) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); medoids.len()];

    for &point in order {
        let mut best_cluster = 0;
        let mut best_dist = f64::INFINITY;

        for (cluster, &medoid) in medoids.iter().enumerate() {
            let dist = distances.between(point, medoid);
            if dist < best_dist {
                best_dist = dist;
                best_cluster = cluster;
            }
        }

        if let Some(members) = clusters.get_mut(best_cluster) {
            members.push(point);
        }
    }

    clusters
}

/// Exact medoid: the member with the smallest summed distance to all others.
///
/// Members sharing a cell are evaluated once and weighted by their count.
/// Ties go to the member that comes first. Returns `None` for an empty
/// cluster.
fn select_medoid(members: &[usize], distances: &CellDistances) -> Option<usize> {
    // (first member on the cell, members on the cell)
    let mut groups: Vec<(usize, usize)> = Vec::new();
    let mut slot_of: HashMap<usize, usize> = HashMap::new();
    for &member in members {
        let slot = *slot_of.entry(distances.cell(member)).or_insert_with(|| {
            groups.push((member, 0));
            groups.len() - 1
        });
        groups[slot].1 += 1;
    }

    let mut best: Option<(usize, f64)> = None;
    for &(candidate, _) in &groups {
        let total: f64 = groups
            .iter()
            .map(|&(member, count)| count as f64 * distances.between(candidate, member))
            .sum();
        if best.is_none_or(|(_, best_total)| total < best_total) {
            best = Some((candidate, total));
        }
    }

    best.map(|(index, _)| index)
}

impl Selector for KMedianSelector {
    fn name(&self) -> &str {
        "k-medoid"
    }

    fn select(&mut self, models: &[Model], h: Heuristic<'_>, k: usize) -> Vec<Model> {
        if models.is_empty() || k == 0 {
            return Vec::new();
        }

        let clustering = self.cluster(models, k);
        let scores = score_all(models, h);

        let result: Vec<Model> = clustering
            .clusters
            .iter()
            .filter_map(|members| {
                let mut best: Option<usize> = None;
                for &member in members {
                    if best.is_none_or(|b| scores[member] < scores[b]) {
                        best = Some(member);
                    }
                }
                best
            })
            .map(|i| models[i])
            .collect();

        tracing::debug!(
            iterations = clustering.iterations,
            converged = clustering.converged,
            clusters = clustering.clusters.len(),
            "K-medoids clustering finished"
        );
        trace_selection(self.name(), models.len(), k, result.len());
        result
    }
}
