//! Configuration keys for the available selectors.
//!
//! [`SelectorKind`] names every built-in strategy (these are the values the
//! CLI accepts), and [`SelectorSpec`] describes a possibly nested selector
//! tree as it appears in a configuration file:
//!
//! ```yaml
//! selector:
//!   type: sequential
//!   steps:
//!     - selector: { type: strategy, kind: diverse-top-k }
//!       repeat: 5
//!     - selector: { type: strategy, kind: random-uniform-bucket }
//!       repeat: 5
//! ```

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

use super::{
    BucketSelector, BucketSelector2, BucketSelector3, CombinedSelector, CombinedSequentialSelector,
    DiverseTopKSelector, KMedianSelector, LocalitySensitiveBucketSelector, RandomBucketSelector,
    RandomSelector, ScoreErosionSelector, Selector, TopKSelector,
};

/// Grid width assumed by [`SelectorKind::build`].
pub const DEFAULT_GRID_WIDTH: i32 = 100;

/// Turns per selector in the diverse/uniform-bucket preset.
const PRESET_ROTATION_REPEAT: usize = 5;

/// Built-in selection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectorKind {
    /// Best model per coordinate-hash bucket.
    SimpleHashBucket,
    /// Best model per bucket of a shuffled round-robin deal.
    RandomBucket,
    /// Hash buckets merged down from twice the beam width.
    HashMultibucket,
    /// Random buckets that never hold the same cell twice.
    RandomUniformBucket,
    /// Lowest heuristic first.
    TopK,
    /// Lowest heuristic first with minimum spacing.
    DiverseTopK,
    /// Greedy picks under a repulsive erosion field.
    ScoreErosion,
    /// Uniform random subset.
    Random,
    /// Best model per k-medoids cluster.
    KMedoid,
    /// Horizontal window buckets widening every call, centered on the
    /// middle column of the grid it is built for.
    LocalitySensitiveBucket,
    /// Alternates five diverse top-k turns with five uniform-bucket turns.
    DiverseTopKThenUniformBucket,
}

impl SelectorKind {
    /// Every built-in kind, in menu order.
    pub const ALL: [SelectorKind; 11] = [
        SelectorKind::SimpleHashBucket,
        SelectorKind::RandomBucket,
        SelectorKind::HashMultibucket,
        SelectorKind::RandomUniformBucket,
        SelectorKind::TopK,
        SelectorKind::DiverseTopK,
        SelectorKind::ScoreErosion,
        SelectorKind::Random,
        SelectorKind::KMedoid,
        SelectorKind::LocalitySensitiveBucket,
        SelectorKind::DiverseTopKThenUniformBucket,
    ];

    /// Configuration key, e.g. `"hash-multibucket"`.
    pub fn key(&self) -> &'static str {
        match self {
            SelectorKind::SimpleHashBucket => "simple-hash-bucket",
            SelectorKind::RandomBucket => "random-bucket",
            SelectorKind::HashMultibucket => "hash-multibucket",
            SelectorKind::RandomUniformBucket => "random-uniform-bucket",
            SelectorKind::TopK => "top-k",
            SelectorKind::DiverseTopK => "diverse-top-k",
            SelectorKind::ScoreErosion => "score-erosion",
            SelectorKind::Random => "random",
            SelectorKind::KMedoid => "k-medoid",
            SelectorKind::LocalitySensitiveBucket => "locality-sensitive-bucket",
            SelectorKind::DiverseTopKThenUniformBucket => "diverse-top-k-then-uniform-bucket",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SelectorKind::SimpleHashBucket => "Simple Hash Bucket",
            SelectorKind::RandomBucket => "Random Bucket",
            SelectorKind::HashMultibucket => "Hash Multibucket",
            SelectorKind::RandomUniformBucket => "Random Uniform Size Bucket",
            SelectorKind::TopK => "Top-k",
            SelectorKind::DiverseTopK => "Top-k Diverse",
            SelectorKind::ScoreErosion => "Score Erosion",
            SelectorKind::Random => "Random",
            SelectorKind::KMedoid => "K-Medoid",
            SelectorKind::LocalitySensitiveBucket => "Locality Sensitive Bucket Selector",
            SelectorKind::DiverseTopKThenUniformBucket => {
                "Diverse Top-k + Random Uniform Size Bucket"
            }
        }
    }

    /// Whether the strategy draws random numbers.
    pub fn is_randomized(&self) -> bool {
        matches!(
            self,
            SelectorKind::RandomBucket
                | SelectorKind::RandomUniformBucket
                | SelectorKind::Random
                | SelectorKind::KMedoid
                | SelectorKind::DiverseTopKThenUniformBucket
        )
    }

    /// Instantiates the strategy for the default 100-column grid.
    ///
    /// Randomized strategies use `seed` when given.
    pub fn build(&self, seed: Option<u64>) -> Box<dyn Selector> {
        self.build_for_grid(seed, DEFAULT_GRID_WIDTH)
    }

    /// Instantiates the strategy for a grid `width` columns wide.
    ///
    /// Only the locality selector depends on the width: its window is
    /// centered on the middle column and spans at most the whole grid.
    pub fn build_for_grid(&self, seed: Option<u64>, width: i32) -> Box<dyn Selector> {
        match self {
            SelectorKind::SimpleHashBucket => Box::new(BucketSelector::new()),
            SelectorKind::RandomBucket => {
                let selector = seeded(RandomBucketSelector::new(), seed, |s, v| s.with_seed(v));
                Box::new(selector)
            }
            SelectorKind::HashMultibucket => Box::new(BucketSelector2::new()),
            SelectorKind::RandomUniformBucket => Box::new(uniform_bucket(seed)),
            SelectorKind::TopK => Box::new(TopKSelector::new()),
            SelectorKind::DiverseTopK => Box::new(DiverseTopKSelector::new()),
            SelectorKind::ScoreErosion => Box::new(ScoreErosionSelector::new()),
            SelectorKind::Random => {
                let selector = seeded(RandomSelector::new(), seed, |s, v| s.with_seed(v));
                Box::new(selector)
            }
            SelectorKind::KMedoid => {
                let selector = seeded(KMedianSelector::new(), seed, |s, v| s.with_seed(v));
                Box::new(selector)
            }
            SelectorKind::LocalitySensitiveBucket => {
                let width = i64::from(width.max(1));
                Box::new(LocalitySensitiveBucketSelector::new().with_center(width / 2, width))
            }
            SelectorKind::DiverseTopKThenUniformBucket => {
                let diverse: Box<dyn Selector> = Box::new(DiverseTopKSelector::new());
                let uniform: Box<dyn Selector> = Box::new(uniform_bucket(seed));
                Box::new(CombinedSequentialSelector::new(vec![
                    (diverse, PRESET_ROTATION_REPEAT),
                    (uniform, PRESET_ROTATION_REPEAT),
                ]))
            }
        }
    }
}

fn uniform_bucket(seed: Option<u64>) -> BucketSelector3 {
    seeded(BucketSelector3::new(), seed, |s, v| s.with_seed(v))
}

/// Applies `with_seed` only when a seed is configured.
fn seeded<S>(selector: S, seed: Option<u64>, apply: impl FnOnce(S, u64) -> S) -> S {
    match seed {
        Some(seed) => apply(selector, seed),
        None => selector,
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SelectorKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SelectorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.key() == wanted || kind.label().to_lowercase() == wanted)
            .ok_or_else(|| RegistryError::UnknownSelector(s.to_string()))
    }
}

/// One entry of a sequential plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Selector taking these turns.
    pub selector: SelectorSpec,

    /// Number of consecutive turns.
    #[serde(default = "default_repeat")]
    pub repeat: usize,
}

fn default_repeat() -> usize {
    1
}

/// A selector tree as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SelectorSpec {
    /// A single built-in strategy.
    Strategy { kind: SelectorKind },

    /// Split the beam between several selectors.
    Combined { selectors: Vec<SelectorSpec> },

    /// Rotate between selectors call by call.
    Sequential { steps: Vec<PlanStep> },
}

impl Default for SelectorSpec {
    fn default() -> Self {
        SelectorSpec::Strategy {
            kind: SelectorKind::SimpleHashBucket,
        }
    }
}

impl From<SelectorKind> for SelectorSpec {
    fn from(kind: SelectorKind) -> Self {
        SelectorSpec::Strategy { kind }
    }
}

impl SelectorSpec {
    /// Short description for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            SelectorSpec::Strategy { kind } => kind.key().to_string(),
            SelectorSpec::Combined { selectors } => {
                let parts: Vec<String> = selectors.iter().map(SelectorSpec::describe).collect();
                format!("combined({})", parts.join(", "))
            }
            SelectorSpec::Sequential { steps } => {
                let parts: Vec<String> = steps
                    .iter()
                    .map(|step| format!("{}x{}", step.selector.describe(), step.repeat))
                    .collect();
                format!("sequential({})", parts.join(", "))
            }
        }
    }

    /// Checks that no composite is empty.
    pub fn validate(&self) -> Result<(), RegistryError> {
        match self {
            SelectorSpec::Strategy { .. } => Ok(()),
            SelectorSpec::Combined { selectors } => {
                if selectors.is_empty() {
                    return Err(RegistryError::EmptyPlan("combined".to_string()));
                }
                selectors.iter().try_for_each(SelectorSpec::validate)
            }
            SelectorSpec::Sequential { steps } => {
                if steps.iter().all(|step| step.repeat == 0) {
                    return Err(RegistryError::EmptyPlan("sequential".to_string()));
                }
                steps.iter().try_for_each(|step| step.selector.validate())
            }
        }
    }

    /// Builds the selector tree.
    ///
    /// Child `i` of a composite is seeded with `seed + i + 1`, so siblings
    /// never share a random stream.
    pub fn build(&self, seed: Option<u64>) -> Result<Box<dyn Selector>, RegistryError> {
        self.build_for_grid(seed, DEFAULT_GRID_WIDTH)
    }

    /// Builds the selector tree for a grid `width` columns wide.
    pub fn build_for_grid(
        &self,
        seed: Option<u64>,
        width: i32,
    ) -> Result<Box<dyn Selector>, RegistryError> {
        self.validate()?;
        Ok(self.build_unchecked(seed, width))
    }

    fn build_unchecked(&self, seed: Option<u64>, width: i32) -> Box<dyn Selector> {
        let child_seed = |index: usize| seed.map(|s| s.wrapping_add(index as u64 + 1));

        match self {
            SelectorSpec::Strategy { kind } => kind.build_for_grid(seed, width),
            SelectorSpec::Combined { selectors } => Box::new(CombinedSelector::new(
                selectors
                    .iter()
                    .enumerate()
                    .map(|(i, spec)| spec.build_unchecked(child_seed(i), width))
                    .collect(),
            )),
            SelectorSpec::Sequential { steps } => Box::new(CombinedSequentialSelector::new(
                steps
                    .iter()
                    .enumerate()
                    .map(|(i, step)| {
                        let child = step.selector.build_unchecked(child_seed(i), width);
                        (child, step.repeat)
                    })
                    .collect(),
            )),
        }
    }
}
