// Robust baseline estimation from a window of historical runs
//
// Median of per-run medians: each run is already outlier-resistant through its
// own median, and taking the median across runs discounts whole-run outliers
// such as a noisy CI machine. Variance follows a random-effects split into
// within-run noise (mean squared SEM) and between-run excess (tau^2).

use super::tables::t_critical_95;
use crate::error::{AnalysisError, InsufficientReason, Result};
use crate::summary::{sample_variance, sort_values, RunId, RunSummary};
use serde::{Deserialize, Serialize};

/// Below this many valid runs the tau^2 decomposition is unreliable
const RANDOM_EFFECTS_MIN_RUNS: usize = 10;

/// Baseline estimate derived from historical runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    /// Run whose median sits closest to the baseline median (display only)
    pub reference_run_id: RunId,
    /// Median of the per-run medians, in nanoseconds
    pub median: f64,
    /// Variance of the baseline estimate, used in the t-test denominator
    pub variance: f64,
    /// 95% confidence bounds around `median`
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// Run-to-run noise relative to the mean median
    pub coefficient_of_variation: f64,
    /// Number of valid runs in the window
    pub valid_count: usize,
}

/// Compute a baseline from `history`
///
/// `baseline_offset` skips the most recent N runs; `history` must then be
/// ordered newest-first (non-increasing run IDs). Only runs with at least two
/// samples and non-zero spread count toward `min_points`.
///
/// # Errors
/// [`AnalysisError::InsufficientData`] when the ordering check fails, the
/// offset consumes the whole history, or fewer than `min_points` valid runs
/// remain.
///
/// # Example
/// ```
/// use benchgate::regression::compute_baseline;
/// use benchgate::summary::{RunId, RunSummary};
///
/// let history: Vec<_> = [100, 102, 98, 101, 99]
///     .iter()
///     .enumerate()
///     .map(|(i, &median)| RunSummary::new(RunId(i as i64 + 1), median, 5, 5))
///     .collect();
///
/// let baseline = compute_baseline(&history, 3, 0).unwrap();
/// assert_eq!(baseline.median, 100.0);
/// assert!(baseline.coefficient_of_variation < 0.02);
/// ```
pub fn compute_baseline(
    history: &[RunSummary],
    min_points: usize,
    baseline_offset: usize,
) -> Result<BaselineStats> {
    if baseline_offset > 0 && !is_ordered_newest_first(history) {
        return Err(AnalysisError::InsufficientData(InsufficientReason::Unordered));
    }
    if baseline_offset > 0 && baseline_offset >= history.len() {
        return Err(AnalysisError::InsufficientData(
            InsufficientReason::OffsetExhaustsHistory {
                offset: baseline_offset,
                available: history.len(),
            },
        ));
    }

    let valid: Vec<&RunSummary> = history[baseline_offset..]
        .iter()
        .filter(|run| run.is_valid())
        .collect();

    if valid.is_empty() || valid.len() < min_points {
        tracing::debug!(
            valid = valid.len(),
            required = min_points,
            "not enough valid runs for a baseline"
        );
        return Err(AnalysisError::InsufficientData(
            InsufficientReason::TooFewValidRuns {
                valid: valid.len(),
                required: min_points,
            },
        ));
    }

    let n = valid.len();
    let medians: Vec<f64> = valid.iter().map(|run| run.median()).collect();
    let baseline_median = median_of(&medians);

    let mean_of_medians = medians.iter().sum::<f64>() / n as f64;
    let s2 = sample_variance(&medians);
    let mean_sem2 = valid.iter().map(|run| run.sem() * run.sem()).sum::<f64>() / n as f64;

    let variance = if n >= RANDOM_EFFECTS_MIN_RUNS {
        let tau2 = (s2 - mean_sem2).max(0.0);
        mean_sem2 + tau2
    } else {
        s2 / n as f64
    };

    let coefficient_of_variation = if mean_of_medians > 0.0 {
        s2.sqrt() / mean_of_medians
    } else {
        0.0
    };

    let margin = t_critical_95(n - 1) * variance.sqrt();
    let ci_lower = (baseline_median - margin).max(0.0);
    let ci_upper = baseline_median + margin;

    let reference_run_id = nearest_run(&valid, baseline_median);

    tracing::debug!(
        runs = n,
        median = baseline_median,
        variance,
        cv = coefficient_of_variation,
        reference = %reference_run_id,
        "computed baseline"
    );

    Ok(BaselineStats {
        reference_run_id,
        median: baseline_median,
        variance,
        ci_lower,
        ci_upper,
        coefficient_of_variation,
        valid_count: n,
    })
}

fn is_ordered_newest_first(history: &[RunSummary]) -> bool {
    history.windows(2).all(|w| w[1].run_id <= w[0].run_id)
}

fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sort_values(&mut sorted);
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

/// First run (in window order) whose median is nearest `target`
fn nearest_run(valid: &[&RunSummary], target: f64) -> RunId {
    let mut best = valid[0];
    let mut best_dist = (best.median() - target).abs();
    for run in &valid[1..] {
        let dist = (run.median() - target).abs();
        if dist < best_dist {
            best = run;
            best_dist = dist;
        }
    }
    best.run_id
}
