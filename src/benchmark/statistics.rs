//! Running summary statistics over repeated measurements.

use serde::{Deserialize, Serialize};

/// Min, max, mean and population standard deviation of a sample stream.
///
/// Values are folded in one at a time with Welford's update, so no sample
/// is kept around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub name: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    #[serde(skip)]
    m2: f64,
}

impl RunStatistics {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            std: 0.0,
            m2: 0.0,
        }
    }

    /// Adds one sample. Non-finite values are ignored.
    pub fn collect(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }

        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.std = (self.m2 / self.count as f64).sqrt();
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl std::fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "{}: n/a", self.name);
        }
        write!(
            f,
            "{}: mean {:.3} ± {:.3} [{:.3}, {:.3}] (n={})",
            self.name, self.mean, self.std, self.min, self.max, self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sample() {
        let mut stats = RunStatistics::new("steps");
        for value in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.collect(value);
        }

        assert_eq!(stats.count, 8);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_value() {
        let mut stats = RunStatistics::new("one");
        stats.collect(-3.5);
        assert_eq!(stats.min, -3.5);
        assert_eq!(stats.max, -3.5);
        assert_eq!(stats.std, 0.0);
    }

    #[test]
    fn test_non_finite_ignored() {
        let mut stats = RunStatistics::new("h");
        stats.collect(f64::INFINITY);
        stats.collect(f64::NAN);
        assert!(stats.is_empty());
        assert_eq!(stats.to_string(), "h: n/a");
    }
}
