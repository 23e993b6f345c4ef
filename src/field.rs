//! The activation field that drives the search heuristic.
//!
//! Activation is a sum of Gaussian bumps, one per target. The heuristic is
//! its reciprocal, so strongly activated cells are cheap and the search is
//! pulled towards them.

use serde::{Deserialize, Serialize};

use crate::model::Model;

/// Overall scale divisor applied to the summed activation.
const ACTIVATION_SCALE: f64 = 5.0;

/// One Gaussian attractor in the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f64,
    pub y: f64,
    /// Standard deviation of the bump, in cells.
    pub size: f64,
    /// Peak height of the bump.
    pub strength: f64,
}

impl Target {
    pub fn new(x: f64, y: f64, size: f64, strength: f64) -> Self {
        Self {
            x,
            y,
            size,
            strength,
        }
    }

    /// Contribution of this target at `(x, y)`.
    pub fn contribution(&self, x: f64, y: f64) -> f64 {
        let d2 = (x - self.x).powi(2) + (y - self.y).powi(2);
        self.strength * (-d2 / (2.0 * self.size.powi(2))).exp()
    }
}

/// Default targets for a grid of the given height: four attractors in the
/// interior and four goals on the last row.
pub fn default_targets(height: i32) -> Vec<Target> {
    let last_row = f64::from(height - 1);
    vec![
        Target::new(80.0, 80.0, 10.0, 3.5),
        Target::new(45.0, 60.0, 12.0, 2.0),
        Target::new(60.0, 30.0, 10.0, 1.5),
        Target::new(20.0, 50.0, 10.0, 2.0),
        Target::new(10.0, last_row, 15.0, 1.0),
        Target::new(30.0, last_row, 7.0, 3.0),
        Target::new(60.0, last_row, 10.0, 1.0),
        Target::new(80.0, last_row, 5.0, 0.5),
    ]
}

/// Weighted sum of radial basis functions over a fixed set of targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialField {
    targets: Vec<Target>,
}

impl PotentialField {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Field value at a cell.
    pub fn activation(&self, x: i32, y: i32) -> f64 {
        let (x, y) = (f64::from(x), f64::from(y));
        let sum: f64 = self.targets.iter().map(|t| t.contribution(x, y)).sum();
        sum / ACTIVATION_SCALE
    }

    /// Search cost of a model: `1 / activation`, `+inf` where the field vanishes.
    pub fn heuristic(&self, model: &Model) -> f64 {
        let activation = self.activation(model.x, model.y);
        if activation > 0.0 {
            1.0 / activation
        } else {
            f64::INFINITY
        }
    }

    /// Largest activation over a `width x height` grid.
    pub fn max_activation(&self, width: i32, height: i32) -> f64 {
        (0..width)
            .flat_map(|x| (0..height).map(move |y| (x, y)))
            .map(|(x, y)| self.activation(x, y))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelArena;

    #[test]
    fn test_single_target_peak() {
        let field = PotentialField::new(vec![Target::new(10.0, 10.0, 2.0, 5.0)]);
        assert!((field.activation(10, 10) - 1.0).abs() < 1e-12);
        assert!(field.activation(12, 10) < field.activation(11, 10));
    }

    #[test]
    fn test_contribution_one_sigma() {
        let target = Target::new(0.0, 0.0, 1.0, 1.0);
        let expected = (-0.5f64).exp();
        assert!((target.contribution(1.0, 0.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_heuristic_reciprocal() {
        let field = PotentialField::new(default_targets(100));
        let mut arena = ModelArena::new();
        let model = arena.spawn(30, 99, None, 0.0);

        let h = field.heuristic(&model);
        assert!((h * field.activation(30, 99) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_heuristic_infinite_without_targets() {
        let field = PotentialField::new(Vec::new());
        let mut arena = ModelArena::new();
        let model = arena.spawn(1, 1, None, 0.0);
        assert_eq!(field.heuristic(&model), f64::INFINITY);
    }

    #[test]
    fn test_default_targets_on_last_row() {
        let targets = default_targets(100);
        assert_eq!(targets.len(), 8);
        assert_eq!(targets.iter().filter(|t| t.y == 99.0).count(), 4);
    }

    #[test]
    fn test_max_activation_near_strongest_target() {
        let field = PotentialField::new(default_targets(100));
        let max = field.max_activation(100, 100);
        assert!(max >= field.activation(80, 80));
        assert!(max > 0.0);
    }
}
