//! CLI argument parsing for Benchgate

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "benchgate")]
#[command(version)]
#[command(about = "Statistical regression detection for benchmark history", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate raw benchmark output (JSON lines) into per-benchmark summaries
    Summarize {
        /// Benchmark output file ("-" reads stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Run ID to stamp on every summary
        #[arg(long = "run-id", value_name = "ID", default_value = "0")]
        run_id: i64,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Compare candidate runs against their history
    Analyze {
        /// History file: JSON array of {category, name, history, candidate}
        #[arg(value_name = "HISTORY")]
        history: PathBuf,

        /// TOML detection config (CLI flags override it)
        #[arg(short = 'c', long = "config", value_name = "TOML")]
        config: Option<PathBuf>,

        /// Minimum number of valid historical runs
        #[arg(long = "min-points", value_name = "N")]
        min_points: Option<usize>,

        /// Most recent runs to exclude from the baseline
        #[arg(long = "baseline-offset", value_name = "N")]
        baseline_offset: Option<usize>,

        /// One-sided significance level
        #[arg(long = "alpha", value_name = "ALPHA")]
        alpha: Option<f64>,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },
}
