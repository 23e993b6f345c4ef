//! Error types for beam-select operations.
//!
//! Selectors themselves never fail; degenerate inputs only shrink their
//! output. Errors come from the surfaces around them:
//! - Configuration loading and validation
//! - Selector registry lookups and composite plans
//! - The comparison harness

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// The selector section is invalid.
    #[error("Selector configuration error: {0}")]
    Selector(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors that can occur when resolving selectors by name.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown selector '{0}'")]
    UnknownSelector(String),

    #[error("Empty {0} selector plan")]
    EmptyPlan(String),
}

/// Errors that can occur while running a selector comparison.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("Invalid comparison setup: {0}")]
    InvalidSetup(String),

    #[error("Search task failed: {0}")]
    TaskFailed(String),

    #[error("Selector error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
