//! Benchmark output ingestion
//!
//! Parses the JSON-lines output of an external benchmark binary. Each JSON line
//! reports one category:
//!
//! ```json
//! {"benchmark": "render", "results": [{"name": "diff", "min_ns": 90, "avg_ns": 100,
//!   "max_ns": 130, "total_ns": 1000, "iterations": 10}]}
//! ```
//!
//! Repeated invocations append more lines; results with the same
//! (category, name) become samples of one benchmark.

use crate::error::{AnalysisError, Result};
use crate::regression::BenchmarkKey;
use crate::summary::{describe, RunId, RunSummary, Sample, SampleDistribution};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;

#[derive(Debug, Deserialize)]
struct BenchmarkLine {
    benchmark: String,
    #[serde(default)]
    results: Vec<ResultLine>,
}

#[derive(Debug, Deserialize)]
struct ResultLine {
    name: String,
    #[serde(flatten)]
    sample: Sample,
}

/// All samples collected for one benchmark within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSamples {
    pub key: BenchmarkKey,
    pub samples: Vec<Sample>,
}

impl BenchmarkSamples {
    /// Full distribution of the collected samples
    pub fn describe(&self) -> Result<SampleDistribution> {
        describe(&self.samples)
    }

    /// Aggregate into the summary the regression engine consumes
    pub fn summarize(&self, run_id: RunId) -> Result<RunSummary> {
        Ok(self.describe()?.to_summary(run_id))
    }
}

/// Parse benchmark output, grouping samples by (category, name)
///
/// Blank lines and lines that do not start with `{` (banners such as
/// "Memory stats enabled") are skipped. Groups come back in first-seen order.
///
/// # Errors
/// [`AnalysisError::Parse`] with the 1-based line number of a malformed JSON
/// line; [`AnalysisError::Io`] if reading fails.
///
/// # Example
/// ```
/// use benchgate::ingest::parse_benchmark_output;
///
/// let output = r#"Memory stats enabled
/// {"benchmark": "text", "results": [{"name": "wrap", "min_ns": 9, "avg_ns": 10, "max_ns": 12}]}
/// {"benchmark": "text", "results": [{"name": "wrap", "min_ns": 10, "avg_ns": 11, "max_ns": 14}]}
/// "#;
///
/// let groups = parse_benchmark_output(output.as_bytes()).unwrap();
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].samples.len(), 2);
/// ```
pub fn parse_benchmark_output<R: BufRead>(reader: R) -> Result<Vec<BenchmarkSamples>> {
    let mut groups: Vec<BenchmarkSamples> = Vec::new();
    let mut index: HashMap<BenchmarkKey, usize> = HashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.starts_with('{') {
            continue;
        }

        let parsed: BenchmarkLine = serde_json::from_str(trimmed)
            .map_err(|source| AnalysisError::Parse { line: i + 1, source })?;

        for result in parsed.results {
            let key = BenchmarkKey::new(parsed.benchmark.clone(), result.name);
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push(BenchmarkSamples {
                    key,
                    samples: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].samples.push(result.sample);
        }
    }

    tracing::debug!(benchmarks = groups.len(), "parsed benchmark output");
    Ok(groups)
}
