//! Sandbox configuration.
//!
//! Settings come from four layers, later layers winning: built-in defaults,
//! an optional YAML file, `BEAM_SELECT_*` environment variables and finally
//! CLI flags (applied by the caller through the builder methods).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::field::{default_targets, PotentialField, Target};
use crate::search::{Grid, WallRect};
use crate::selection::SelectorSpec;

const DEFAULT_WIDTH: i32 = 100;
const DEFAULT_HEIGHT: i32 = 100;
const DEFAULT_BEAM_WIDTH: usize = 30;
const DEFAULT_MAX_STEPS: usize = 1000;

/// Everything needed to set up one beam search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    // Grid settings
    /// Number of columns.
    pub width: i32,
    /// Number of rows; the last row is the goal row.
    pub height: i32,
    /// Start column.
    pub start_x: i32,
    /// Start row.
    pub start_y: i32,
    /// Blocked rectangles.
    pub walls: Vec<WallRect>,

    // Search settings
    /// Beam width `k` handed to the selector.
    pub beam_width: usize,
    /// Keep only the first candidate per cell before selecting.
    pub deduplicate: bool,
    /// Step limit for one search.
    pub max_steps: usize,
    /// Seed for randomized selectors (None = non-deterministic).
    pub seed: Option<u64>,

    // Field and selector
    /// Field attractors; empty means the default layout.
    pub targets: Vec<Target>,
    /// Selector tree.
    pub selector: SelectorSpec,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            start_x: DEFAULT_WIDTH / 2,
            start_y: 0,
            walls: Vec::new(),

            beam_width: DEFAULT_BEAM_WIDTH,
            deduplicate: true,
            max_steps: DEFAULT_MAX_STEPS,
            seed: None,

            targets: Vec::new(),
            selector: SelectorSpec::default(),
        }
    }
}

impl SandboxConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a YAML configuration file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed or validated.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `BEAM_SELECT_*` environment overrides.
    ///
    /// # Environment Variables
    ///
    /// - `BEAM_SELECT_WIDTH`, `BEAM_SELECT_HEIGHT`: grid size
    /// - `BEAM_SELECT_START_X`, `BEAM_SELECT_START_Y`: start cell
    /// - `BEAM_SELECT_K`: beam width
    /// - `BEAM_SELECT_DEDUP`: deduplicate candidates (true/false)
    /// - `BEAM_SELECT_MAX_STEPS`: step limit
    /// - `BEAM_SELECT_SEED`: RNG seed
    /// - `BEAM_SELECT_SELECTOR`: selector key (replaces the selector tree)
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable source.
    pub fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(val) = var("BEAM_SELECT_WIDTH") {
            self.width = parse_env_value(&val, "BEAM_SELECT_WIDTH")?;
        }

        if let Some(val) = var("BEAM_SELECT_HEIGHT") {
            self.height = parse_env_value(&val, "BEAM_SELECT_HEIGHT")?;
        }

        if let Some(val) = var("BEAM_SELECT_START_X") {
            self.start_x = parse_env_value(&val, "BEAM_SELECT_START_X")?;
        }

        if let Some(val) = var("BEAM_SELECT_START_Y") {
            self.start_y = parse_env_value(&val, "BEAM_SELECT_START_Y")?;
        }

        if let Some(val) = var("BEAM_SELECT_K") {
            self.beam_width = parse_env_value(&val, "BEAM_SELECT_K")?;
        }

        if let Some(val) = var("BEAM_SELECT_DEDUP") {
            self.deduplicate = parse_env_bool(&val, "BEAM_SELECT_DEDUP")?;
        }

        if let Some(val) = var("BEAM_SELECT_MAX_STEPS") {
            self.max_steps = parse_env_value(&val, "BEAM_SELECT_MAX_STEPS")?;
        }

        if let Some(val) = var("BEAM_SELECT_SEED") {
            self.seed = Some(parse_env_value(&val, "BEAM_SELECT_SEED")?);
        }

        if let Some(val) = var("BEAM_SELECT_SELECTOR") {
            let kind = val.parse().map_err(|e| ConfigError::InvalidValue {
                key: "BEAM_SELECT_SELECTOR".to_string(),
                message: format!("{}", e),
            })?;
            self.selector = SelectorSpec::Strategy { kind };
        }

        Ok(self)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::ValidationFailed(
                "width and height must be greater than 0".to_string(),
            ));
        }

        if !(0..self.width).contains(&self.start_x) || !(0..self.height).contains(&self.start_y) {
            return Err(ConfigError::ValidationFailed(format!(
                "start ({}, {}) lies outside the {}x{} grid",
                self.start_x, self.start_y, self.width, self.height
            )));
        }

        if self.grid().is_wall(self.start_x, self.start_y) {
            return Err(ConfigError::ValidationFailed(
                "start cell is inside a wall".to_string(),
            ));
        }

        if self.beam_width == 0 {
            return Err(ConfigError::ValidationFailed(
                "beam_width must be greater than 0".to_string(),
            ));
        }

        if self.max_steps == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_steps must be greater than 0".to_string(),
            ));
        }

        if let Some(target) = self.targets.iter().find(|t| t.size <= 0.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "target at ({}, {}) must have a positive size",
                target.x, target.y
            )));
        }

        self.selector.validate()?;
        Ok(())
    }

    /// The grid described by this configuration.
    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height).with_walls(self.walls.clone())
    }

    /// The potential field, falling back to the default targets.
    pub fn field(&self) -> PotentialField {
        if self.targets.is_empty() {
            PotentialField::new(default_targets(self.height))
        } else {
            PotentialField::new(self.targets.clone())
        }
    }

    /// Builder method to set the beam width.
    pub fn with_beam_width(mut self, beam_width: usize) -> Self {
        self.beam_width = beam_width;
        self
    }

    /// Builder method to set the selector tree.
    pub fn with_selector(mut self, selector: impl Into<SelectorSpec>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Builder method to set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method to enable or disable candidate deduplication.
    pub fn with_deduplication(mut self, enabled: bool) -> Self {
        self.deduplicate = enabled;
        self
    }

    /// Builder method to set the step limit.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Builder method to set the grid size, recentering the start column.
    pub fn with_grid_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self.start_x = width / 2;
        self
    }

    /// Builder method to add a wall.
    pub fn with_wall(mut self, wall: WallRect) -> Self {
        self.walls.push(wall);
        self
    }

    /// Builder method to set the field targets.
    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }
}

/// Parses an environment variable value into the specified type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Parses a boolean environment variable value.
fn parse_env_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected boolean, got '{}'", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;
    use crate::selection::SelectorKind;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = SandboxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.start_x, 50);
        assert_eq!(config.beam_width, 30);
        assert!(config.deduplicate);
    }

    #[test]
    fn test_zero_beam_width_rejected() {
        let config = SandboxConfig::default().with_beam_width(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_start_outside_grid_rejected() {
        let mut config = SandboxConfig::default();
        config.start_x = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_start_in_wall_rejected() {
        let config = SandboxConfig::default().with_wall(WallRect::new(45, 0, 10, 2));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_target_rejected() {
        let config = SandboxConfig::default().with_targets(vec![Target::new(1.0, 1.0, 0.0, 1.0)]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = SandboxConfig::default()
            .apply_vars(vars(&[
                ("BEAM_SELECT_K", "12"),
                ("BEAM_SELECT_DEDUP", "off"),
                ("BEAM_SELECT_SEED", "99"),
                ("BEAM_SELECT_SELECTOR", "k-medoid"),
            ]))
            .expect("valid overrides");

        assert_eq!(config.beam_width, 12);
        assert!(!config.deduplicate);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.selector, SelectorKind::KMedoid.into());
    }

    #[test]
    fn test_env_invalid_value() {
        let err = SandboxConfig::default()
            .apply_vars(vars(&[("BEAM_SELECT_K", "wide")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "BEAM_SELECT_K"));

        let err = SandboxConfig::default()
            .apply_vars(vars(&[("BEAM_SELECT_SELECTOR", "nope")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_yaml_file_partial() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "beam_width: 8\nseed: 4\nselector:\n  type: strategy\n  kind: top-k\nwalls:\n  - {{ x: 10, y: 10, width: 5, height: 1 }}"
        )
        .expect("write config");

        let config = SandboxConfig::from_yaml_file(file.path()).expect("loads");
        assert_eq!(config.beam_width, 8);
        assert_eq!(config.seed, Some(4));
        assert_eq!(config.width, 100);
        assert_eq!(config.walls.len(), 1);
        assert_eq!(config.selector, SelectorKind::TopK.into());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = SandboxConfig::default()
            .with_selector(SelectorKind::ScoreErosion)
            .with_seed(5)
            .with_targets(default_targets(100));
        let yaml = serde_yaml::to_string(&config).expect("serializes");
        let parsed: SandboxConfig = serde_yaml::from_str(&yaml).expect("parses");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_file() {
        let err = SandboxConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_field_defaults_when_no_targets() {
        let config = SandboxConfig::default();
        assert_eq!(config.field().targets().len(), 8);
    }
}
