use anyhow::{Context, Result};
use benchgate::cli::{Cli, Command, OutputFormat};
use benchgate::ingest::{parse_benchmark_output, BenchmarkSamples};
use benchgate::regression::{
    analyze_suite, mean_ci95, BenchmarkKey, DetectionConfig, MeanInterval, SuiteReport,
};
use benchgate::summary::{RunId, RunSummary, SampleDistribution};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// One benchmark in an `analyze` history file
#[derive(Debug, Deserialize)]
struct HistoryEntry {
    category: String,
    name: String,
    /// Newest first
    history: Vec<RunSummary>,
    candidate: RunSummary,
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    category: &'a str,
    name: &'a str,
    summary: RunSummary,
    distribution: SampleDistribution,
    /// 95% interval around the mean of per-sample averages
    mean_ci: MeanInterval,
}

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn read_benchmark_output(input: &Path) -> Result<Vec<BenchmarkSamples>> {
    let groups = if input == Path::new("-") {
        parse_benchmark_output(io::stdin().lock())
    } else {
        let file = File::open(input)
            .with_context(|| format!("Failed to open benchmark output: {}", input.display()))?;
        parse_benchmark_output(BufReader::new(file))
    };
    groups.with_context(|| format!("Failed to ingest {}", input.display()))
}

fn summarize(input: &Path, run_id: RunId, format: OutputFormat) -> Result<()> {
    let groups = read_benchmark_output(input)?;

    let mut rows = Vec::with_capacity(groups.len());
    for group in &groups {
        let distribution = group.describe()?;
        let mean_ci = mean_ci95(
            distribution.mean_ns,
            distribution.std_dev_ns,
            distribution.sample_count,
        );
        rows.push(SummaryRow {
            category: &group.key.category,
            name: &group.key.name,
            summary: distribution.to_summary(run_id),
            distribution,
            mean_ci,
        });
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            println!(
                "{:<48} {:>12} {:>10} {:>12} {:>12} {:>8}  {}",
                "Benchmark", "p50 (ns)", "stddev", "p95 (ns)", "p99 (ns)", "samples", "mean 95% CI"
            );
            for row in &rows {
                println!(
                    "{:<48} {:>12} {:>10} {:>12} {:>12} {:>8}  [{}, {}]",
                    format!("{}/{}", row.category, row.name),
                    row.distribution.p50_ns,
                    row.distribution.std_dev_ns,
                    row.distribution.p95_ns,
                    row.distribution.p99_ns,
                    row.distribution.sample_count,
                    row.mean_ci.lower_ns,
                    row.mean_ci.upper_ns
                );
            }
        }
    }
    Ok(())
}

fn load_config(
    path: Option<&Path>,
    min_points: Option<usize>,
    baseline_offset: Option<usize>,
    alpha: Option<f64>,
) -> Result<DetectionConfig> {
    let mut config = match path {
        Some(path) => DetectionConfig::from_toml_file(path)?,
        None => DetectionConfig::default(),
    };
    if let Some(min_points) = min_points {
        config.min_points = min_points;
    }
    if let Some(baseline_offset) = baseline_offset {
        config.baseline_offset = baseline_offset;
    }
    if let Some(alpha) = alpha {
        config.alpha = alpha;
    }
    config.validate()?;
    Ok(config)
}

fn analyze(history: &Path, config: &DetectionConfig, format: OutputFormat) -> Result<SuiteReport> {
    let file = File::open(history)
        .with_context(|| format!("Failed to open history file: {}", history.display()))?;
    let entries: Vec<HistoryEntry> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse history file: {}", history.display()))?;

    let report = analyze_suite(
        entries.into_iter().map(|e| {
            (
                BenchmarkKey::new(e.category, e.name),
                e.history,
                e.candidate,
            )
        }),
        config,
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", report.to_report_string()),
    }
    Ok(report)
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    match args.command {
        Command::Summarize {
            input,
            run_id,
            format,
        } => summarize(&input, RunId(run_id), format),
        Command::Analyze {
            history,
            config,
            min_points,
            baseline_offset,
            alpha,
            format,
        } => {
            let config = load_config(config.as_deref(), min_points, baseline_offset, alpha)?;
            let report = analyze(&history, &config, format)?;
            if report.has_regressions() {
                io::stdout().flush()?;
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
