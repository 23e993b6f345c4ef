//! CLI command definitions for beam-select.
//!
//! `run` executes one search and prints its outcome, `compare` benchmarks
//! several selectors against each other, and `selectors` lists what is
//! available.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::benchmark::{compare, default_concurrency, CompareOptions, ComparisonReport};
use crate::config::SandboxConfig;
use crate::metrics::{export_metrics, init_metrics};
use crate::search::{BeamSearch, SearchOutcome};
use crate::selection::{SelectorKind, SelectorSpec};

/// Beam search sandbox for comparing selection strategies.
#[derive(Parser, Debug)]
#[command(name = "beam-select")]
#[command(about = "Compare beam-search selection strategies on a grid sandbox")]
#[command(version)]
#[command(
    long_about = "beam-select runs a beam search from the top of a grid towards its last row, \
guided by a field of Gaussian attractors, and lets you swap the strategy that prunes \
the beam each step.\n\nExample usage:\n  beam-select run --selector k-medoid --seed 3\n  \
beam-select compare --selectors top-k,diverse-top-k -n 20 --output report.json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run a single search and print the outcome.
    Run(RunArgs),

    /// Run every selector several times and report aggregate statistics.
    #[command(alias = "bench")]
    Compare(CompareArgs),

    /// List the available selectors.
    #[command(alias = "ls")]
    Selectors,
}

/// Search settings shared by `run` and `compare`.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct SearchArgs {
    /// YAML sandbox configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Beam width (models kept per step).
    #[arg(short = 'k', long)]
    pub beam_width: Option<usize>,

    /// Seed for randomized selectors.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep duplicate candidates on the same cell.
    #[arg(long)]
    pub no_dedup: bool,

    /// Maximum number of search steps.
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Print machine-readable JSON instead of text.
    #[arg(short, long)]
    pub json: bool,
}

/// Arguments for `beam-select run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Selector to use (overrides the configured selector tree).
    #[arg(short, long, value_enum)]
    pub selector: Option<SelectorKind>,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Arguments for `beam-select compare`.
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Comma-separated selectors to compare (default: all).
    #[arg(long, value_enum, value_delimiter = ',')]
    pub selectors: Vec<SelectorKind>,

    /// Searches per selector.
    #[arg(short = 'n', long, default_value = "10")]
    pub repetitions: usize,

    /// Maximum searches running at once (default: number of CPUs).
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Write the JSON report to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print Prometheus metrics after the comparison.
    #[arg(long)]
    pub metrics: bool,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_search_command(args).await,
        Commands::Compare(args) => run_compare_command(args).await,
        Commands::Selectors => {
            print_selectors();
            Ok(())
        }
    }
}

/// Resolves the sandbox configuration: file, then environment, then flags.
pub fn load_config(args: &SearchArgs) -> anyhow::Result<SandboxConfig> {
    let config = match &args.config {
        Some(path) => SandboxConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SandboxConfig::default(),
    };

    let config = config
        .apply_env()
        .context("Invalid BEAM_SELECT_* environment override")?;

    let config = apply_search_args(config, args);
    config.validate().context("Invalid sandbox configuration")?;
    Ok(config)
}

fn apply_search_args(mut config: SandboxConfig, args: &SearchArgs) -> SandboxConfig {
    if let Some(k) = args.beam_width {
        config = config.with_beam_width(k);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.no_dedup {
        config = config.with_deduplication(false);
    }
    if let Some(max_steps) = args.max_steps {
        config = config.with_max_steps(max_steps);
    }
    config
}

// ============================================================================
// Run Command
// ============================================================================

async fn run_search_command(args: RunArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.search)?;
    if let Some(kind) = args.selector {
        config = config.with_selector(kind);
    }

    info!(
        selector = %config.selector.describe(),
        beam_width = config.beam_width,
        seed = ?config.seed,
        "Running search"
    );

    let mut search = BeamSearch::from_config(&config).context("Failed to set up search")?;
    let outcome = tokio::task::spawn_blocking(move || search.run())
        .await
        .context("Search task failed")?;

    if args.search.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&config.selector.describe(), &outcome);
    }
    Ok(())
}

fn print_outcome(selector: &str, outcome: &SearchOutcome) {
    println!("Selector:    {}", selector);
    println!("Status:      {}", outcome.status);
    println!("Steps:       {}", outcome.steps);
    println!("Candidates:  {}", outcome.candidates_considered);
    println!("Selection:   {:.3} ms", outcome.selection_ms());

    match &outcome.solution {
        Some(solution) => {
            println!("Path length: {:.3}", solution.length);
            println!("Activation:  {:.4}", solution.activation);
            if let (Some(first), Some(last)) = (solution.path.first(), solution.path.last()) {
                println!(
                    "Path:        ({}, {}) -> ({}, {}) in {} cells",
                    first.0,
                    first.1,
                    last.0,
                    last.1,
                    solution.path.len()
                );
            }
        }
        None => println!("No solution found"),
    }
}

// ============================================================================
// Compare Command
// ============================================================================

async fn run_compare_command(args: CompareArgs) -> anyhow::Result<()> {
    let config = load_config(&args.search)?;

    if args.metrics {
        init_metrics().context("Failed to initialize metrics")?;
    }

    let kinds = if args.selectors.is_empty() {
        SelectorKind::ALL.to_vec()
    } else {
        args.selectors.clone()
    };
    let options = CompareOptions::new(kinds.into_iter().map(SelectorSpec::from).collect())
        .with_repetitions(args.repetitions)
        .with_concurrency(args.concurrency.unwrap_or_else(default_concurrency));

    let report = compare(&config, &options)
        .await
        .context("Selector comparison failed")?;

    if let Some(path) = &args.output {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), run_id = %report.run_id, "Report written");
    }

    if args.search.json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }

    if args.metrics {
        print!("{}", export_metrics());
    }
    Ok(())
}

fn print_report(report: &ComparisonReport) {
    println!(
        "Run {} | k = {} | {} repetitions",
        report.run_id, report.beam_width, report.repetitions
    );
    println!(
        "{:<36} {:>7} {:>9} {:>12} {:>11} {:>13}",
        "selector", "solved", "steps", "path length", "activation", "select ms"
    );
    for summary in &report.selectors {
        println!(
            "{:<36} {:>6.0}% {:>9.1} {:>12.2} {:>11.4} {:>13.3}",
            summary.selector,
            summary.solved_ratio * 100.0,
            summary.steps.mean,
            summary.path_length.mean,
            summary.final_activation.mean,
            summary.selection_ms.mean
        );
    }
}

fn print_selectors() {
    println!("{:<36} {:<44} randomized", "key", "label");
    for kind in SelectorKind::ALL {
        println!(
            "{:<36} {:<44} {}",
            kind.key(),
            kind.label(),
            if kind.is_randomized() { "yes" } else { "no" }
        );
    }
}
