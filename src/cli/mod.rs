//! Command-line interface for beam-select.
//!
//! Provides commands for single searches, selector comparisons and the
//! selector listing.

mod commands;

pub use commands::{
    load_config, parse_cli, run, run_with_cli, Cli, Commands, CompareArgs, RunArgs, SearchArgs,
};
