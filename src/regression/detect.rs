// Regression verdict for a single run against a fixed baseline
//
// Dual gate: a run is flagged only when the slowdown is statistically
// significant (one-sided t-test) AND practically significant (relative effect
// at least the noise-scaled minimum). Either alone is not enough.

use super::baseline::BaselineStats;
use super::config::DetectionConfig;
use super::tables::SignificanceModel;
use crate::summary::{RunId, RunSummary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest relative change ever flagged, in percent
const MIN_EFFECT_FLOOR_PERCENT: f64 = 1.0;

/// Multiplier applied to the baseline CV (as a percentage)
const CV_EFFECT_MULTIPLIER: f64 = 2.0;

/// Outcome of comparing one run against a baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionStatus {
    /// Not distinguishable from the baseline, or faster
    Ok,
    /// Significantly and meaningfully slower than the baseline
    Regressed,
    /// No judgment possible (single-sample run or no baseline)
    Insufficient,
}

impl fmt::Display for RegressionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::Regressed => "regressed",
            Self::Insufficient => "insufficient",
        })
    }
}

/// Detailed detection result
///
/// Optional fields are `None` unless `status` says they were computed:
/// everything is empty for `Insufficient`, and `change_percent` is set only for
/// `Regressed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub status: RegressionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_run_id: Option<RunId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_ci_lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_ci_upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
    /// Noise-scaled threshold that was applied, in percent
    pub min_effect_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_statistic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_critical: Option<f64>,
}

impl RegressionResult {
    fn insufficient() -> Self {
        Self {
            status: RegressionStatus::Insufficient,
            baseline_run_id: None,
            baseline_ci_lower: None,
            baseline_ci_upper: None,
            change_percent: None,
            min_effect_percent: 0.0,
            p_value: None,
            t_statistic: None,
            t_critical: None,
        }
    }

    fn against(baseline: &BaselineStats, min_effect_percent: f64) -> Self {
        Self {
            status: RegressionStatus::Ok,
            baseline_run_id: Some(baseline.reference_run_id),
            baseline_ci_lower: Some(baseline.ci_lower),
            baseline_ci_upper: Some(baseline.ci_upper),
            change_percent: None,
            min_effect_percent,
            p_value: None,
            t_statistic: None,
            t_critical: None,
        }
    }

    pub fn is_regressed(&self) -> bool {
        self.status == RegressionStatus::Regressed
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        match self.status {
            RegressionStatus::Regressed => {
                report.push_str(&format!(
                    "REGRESSED (+{:.1}%)\n",
                    self.change_percent.unwrap_or_default()
                ));
            }
            RegressionStatus::Ok => report.push_str("OK\n"),
            RegressionStatus::Insufficient => {
                report.push_str("INSUFFICIENT DATA\n");
                return report;
            }
        }

        if let Some(run_id) = self.baseline_run_id {
            report.push_str(&format!("  baseline run: {}\n", run_id));
        }
        if let (Some(lower), Some(upper)) = (self.baseline_ci_lower, self.baseline_ci_upper) {
            report.push_str(&format!("  baseline 95% CI: [{:.1}, {:.1}] ns\n", lower, upper));
        }
        report.push_str(&format!(
            "  min effect: {:.2}%\n",
            self.min_effect_percent
        ));
        if let (Some(t), Some(t_crit)) = (self.t_statistic, self.t_critical) {
            report.push_str(&format!("  t = {:.3} (critical {:.3})\n", t, t_crit));
        }
        if let Some(p) = self.p_value {
            report.push_str(&format!("  p = {:.4}\n", p));
        }

        report
    }
}

/// Noise-scaled minimum effect in percent: `max(1, 2 * CV * 100)`
pub fn min_effect_percent(baseline: &BaselineStats) -> f64 {
    MIN_EFFECT_FLOOR_PERCENT.max(CV_EFFECT_MULTIPLIER * baseline.coefficient_of_variation * 100.0)
}

/// Test whether `latest` is slower than `baseline` at significance `alpha`
///
/// Uses the tabulated significance model.
///
/// # Example
/// ```
/// use benchgate::regression::{compute_baseline, detect_regression, RegressionStatus};
/// use benchgate::summary::{RunId, RunSummary};
///
/// let history: Vec<_> = [100, 102, 98, 101, 99]
///     .iter()
///     .enumerate()
///     .map(|(i, &median)| RunSummary::new(RunId(5 - i as i64), median, 5, 5))
///     .collect();
/// let baseline = compute_baseline(&history, 3, 0).unwrap();
///
/// let latest = RunSummary::new(RunId(6), 130, 5, 5);
/// let result = detect_regression(&latest, Some(&baseline), 0.01);
/// assert_eq!(result.status, RegressionStatus::Regressed);
/// assert!((result.change_percent.unwrap() - 30.0).abs() < 1e-9);
/// ```
pub fn detect_regression(
    latest: &RunSummary,
    baseline: Option<&BaselineStats>,
    alpha: f64,
) -> RegressionResult {
    detect_with_model(latest, baseline, alpha, SignificanceModel::Tabulated)
}

/// Like [`detect_regression`], using the alpha and model from `config`
pub fn detect_regression_with(
    latest: &RunSummary,
    baseline: Option<&BaselineStats>,
    config: &DetectionConfig,
) -> RegressionResult {
    detect_with_model(latest, baseline, config.alpha, config.significance_model)
}

fn detect_with_model(
    latest: &RunSummary,
    baseline: Option<&BaselineStats>,
    alpha: f64,
    model: SignificanceModel,
) -> RegressionResult {
    // Single-sample and zero-spread runs carry no variance estimate
    if latest.sample_count < 2 || latest.std_dev_ns == 0 {
        return RegressionResult::insufficient();
    }
    let Some(baseline) = baseline else {
        return RegressionResult::insufficient();
    };

    let min_effect = min_effect_percent(baseline);
    let diff = latest.median() - baseline.median;
    let sem = latest.sem();
    let se_diff = (sem * sem + baseline.variance).sqrt();

    let mut result = RegressionResult::against(baseline, min_effect);
    if se_diff == 0.0 {
        return result;
    }

    let t = diff / se_diff;
    // Latest run's own df stands in for Welch-Satterthwaite
    let df = (latest.sample_count.saturating_sub(1) as usize).max(1);
    let t_crit = model.critical_value(df, alpha);

    let effect_percent = if baseline.median > 0.0 {
        diff / baseline.median * 100.0
    } else {
        0.0
    };

    result.p_value = Some(model.p_value(t, df));
    result.t_statistic = Some(t);
    result.t_critical = Some(t_crit);

    if t > t_crit && effect_percent >= min_effect {
        result.status = RegressionStatus::Regressed;
        result.change_percent = Some(effect_percent);
    }

    tracing::debug!(
        run = %latest.run_id,
        status = %result.status,
        t,
        t_crit,
        effect_percent,
        min_effect,
        "regression check"
    );

    result
}

/// First run in an oldest-first `history` flagged as regressed
///
/// Linear scan against a fixed baseline; `None` when there is no baseline, the
/// history is empty, or nothing is flagged.
pub fn find_introducing_run(
    history: &[RunSummary],
    baseline: Option<&BaselineStats>,
    alpha: f64,
) -> Option<RunId> {
    let baseline = baseline?;
    history
        .iter()
        .find(|run| detect_regression(run, Some(baseline), alpha).is_regressed())
        .map(|run| run.run_id)
}

/// Like [`find_introducing_run`], using the alpha and model from `config`
pub fn find_introducing_run_with(
    history: &[RunSummary],
    baseline: Option<&BaselineStats>,
    config: &DetectionConfig,
) -> Option<RunId> {
    let baseline = baseline?;
    history
        .iter()
        .find(|run| detect_regression_with(run, Some(baseline), config).is_regressed())
        .map(|run| run.run_id)
}
