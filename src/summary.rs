//! Per-run benchmark summaries
//!
//! Reduces the repeated samples collected for one benchmark within one run into
//! a [`RunSummary`], the point estimate consumed by the regression engine.
//!
//! The median of per-sample averages is the primary estimate: a single GC pause
//! or scheduler hiccup inflates one sample's average but barely moves the median.
//! Spread uses Bessel's correction (n-1) since the regression test treats it as
//! an unbiased variance estimate.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a recorded run, assigned monotonically by the history store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub i64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Named memory counter reported alongside a sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemStat {
    pub name: String,
    pub bytes: i64,
}

/// One repeated measurement of a benchmark within a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub min_ns: u64,
    pub avg_ns: u64,
    pub max_ns: u64,
    #[serde(default)]
    pub total_ns: u64,
    #[serde(default)]
    pub iterations: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mem_stats: Vec<MemStat>,
}

impl Sample {
    /// Sample with identical min/avg/max, handy for synthetic histories
    pub fn from_avg(avg_ns: u64) -> Self {
        Self {
            min_ns: avg_ns,
            avg_ns,
            max_ns: avg_ns,
            total_ns: avg_ns,
            iterations: 1,
            mem_stats: Vec::new(),
        }
    }
}

/// Robust summary of one benchmark in one run
///
/// Stored fields are integer nanoseconds; the standard error is derived so
/// that `sem == std_dev / sqrt(sample_count)` always holds. It is written out
/// as `sem_ns` and recomputed (never trusted) on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RunSummaryRecord", into = "RunSummaryRecord")]
pub struct RunSummary {
    pub run_id: RunId,
    pub median_ns: u64,
    pub std_dev_ns: u64,
    pub sample_count: u64,
}

#[derive(Serialize, Deserialize)]
struct RunSummaryRecord {
    run_id: RunId,
    median_ns: u64,
    #[serde(default)]
    std_dev_ns: u64,
    #[serde(default)]
    sample_count: u64,
    #[serde(default)]
    sem_ns: f64,
}

impl From<RunSummary> for RunSummaryRecord {
    fn from(summary: RunSummary) -> Self {
        Self {
            run_id: summary.run_id,
            median_ns: summary.median_ns,
            std_dev_ns: summary.std_dev_ns,
            sample_count: summary.sample_count,
            sem_ns: summary.sem(),
        }
    }
}

impl From<RunSummaryRecord> for RunSummary {
    fn from(record: RunSummaryRecord) -> Self {
        Self::new(
            record.run_id,
            record.median_ns,
            record.std_dev_ns,
            record.sample_count,
        )
    }
}

impl RunSummary {
    /// Build a summary, normalizing `sample_count` to at least 1 and zeroing the
    /// spread of single-sample runs
    pub fn new(run_id: RunId, median_ns: u64, std_dev_ns: u64, sample_count: u64) -> Self {
        let sample_count = sample_count.max(1);
        let std_dev_ns = if sample_count < 2 { 0 } else { std_dev_ns };
        Self {
            run_id,
            median_ns,
            std_dev_ns,
            sample_count,
        }
    }

    /// Standard error of the median estimate
    pub fn sem(&self) -> f64 {
        if self.sample_count < 2 {
            return 0.0;
        }
        self.std_dev_ns as f64 / (self.sample_count as f64).sqrt()
    }

    /// Whether this run can contribute to a baseline
    pub fn is_valid(&self) -> bool {
        self.sample_count >= 2 && self.std_dev_ns > 0 && self.sem() > 0.0
    }

    pub(crate) fn median(&self) -> f64 {
        self.median_ns as f64
    }
}

/// Full distribution of one benchmark's samples within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDistribution {
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: u64,
    pub std_dev_ns: u64,
    pub p50_ns: u64,
    pub p95_ns: u64,
    pub p99_ns: u64,
    pub total_ns: u64,
    pub iterations: u64,
    pub sample_count: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mem_stats: Vec<MemStat>,
}

impl SampleDistribution {
    /// Project onto the fields the regression engine consumes
    pub fn to_summary(&self, run_id: RunId) -> RunSummary {
        RunSummary::new(run_id, self.p50_ns, self.std_dev_ns, self.sample_count)
    }
}

/// Describe a non-empty set of samples
///
/// Memory counters are taken from the first sample; they are per-process
/// totals and do not vary between repeated invocations.
pub fn describe(samples: &[Sample]) -> Result<SampleDistribution> {
    let first = samples.first().ok_or(AnalysisError::EmptySamples)?;

    if samples.len() == 1 {
        return Ok(SampleDistribution {
            min_ns: first.min_ns,
            max_ns: first.max_ns,
            mean_ns: first.avg_ns,
            std_dev_ns: 0,
            p50_ns: first.avg_ns,
            p95_ns: first.avg_ns,
            p99_ns: first.avg_ns,
            total_ns: first.total_ns,
            iterations: first.iterations,
            sample_count: 1,
            mem_stats: first.mem_stats.clone(),
        });
    }

    let mut averages: Vec<f64> = samples.iter().map(|s| s.avg_ns as f64).collect();
    let mean = averages.iter().sum::<f64>() / averages.len() as f64;
    let std_dev = sample_std_dev(&averages);
    sort_values(&mut averages);

    Ok(SampleDistribution {
        min_ns: samples.iter().map(|s| s.min_ns).min().unwrap_or(first.min_ns),
        max_ns: samples.iter().map(|s| s.max_ns).max().unwrap_or(first.max_ns),
        mean_ns: round_ns(mean),
        std_dev_ns: round_ns(std_dev),
        p50_ns: round_ns(percentile_sorted(&averages, 0.50)),
        p95_ns: round_ns(percentile_sorted(&averages, 0.95)),
        p99_ns: round_ns(percentile_sorted(&averages, 0.99)),
        total_ns: samples.iter().fold(0u64, |acc, s| acc.saturating_add(s.total_ns)),
        iterations: samples
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.iterations)),
        sample_count: samples.len() as u64,
        mem_stats: first.mem_stats.clone(),
    })
}

/// Aggregate the samples of one benchmark in one run into a [`RunSummary`]
///
/// # Errors
/// Returns [`AnalysisError::EmptySamples`] for an empty slice.
///
/// # Example
/// ```
/// use benchgate::summary::{aggregate, RunId, Sample};
///
/// let samples = [Sample::from_avg(100), Sample::from_avg(104), Sample::from_avg(102)];
/// let summary = aggregate(RunId(7), &samples).unwrap();
/// assert_eq!(summary.median_ns, 102);
/// assert_eq!(summary.std_dev_ns, 2);
/// assert_eq!(summary.sample_count, 3);
/// ```
pub fn aggregate(run_id: RunId, samples: &[Sample]) -> Result<RunSummary> {
    Ok(describe(samples)?.to_summary(run_id))
}

/// Interpolated percentile (`p` in [0, 1]) of unsorted values
///
/// Index is `p * (n - 1)`; results between order statistics are linearly
/// interpolated. Returns 0 for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sort_values(&mut sorted);
    percentile_sorted(&sorted, p)
}

/// Sample standard deviation with Bessel's correction; 0 when fewer than 2 values
pub fn sample_std_dev(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

pub(crate) fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    sum_sq / (n - 1) as f64
}

pub(crate) fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let index = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = index.floor() as usize;
            let upper = lower + 1;
            if upper >= n {
                return sorted[n - 1];
            }
            let weight = index - lower as f64;
            sorted[lower] * (1.0 - weight) + sorted[upper] * weight
        }
    }
}

fn round_ns(value: f64) -> u64 {
    value.round().max(0.0) as u64
}
