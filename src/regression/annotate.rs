// Per-run verdicts across a whole history window
//
// Every run is judged against the same baseline, so a trend view can color
// each point. The reference run of the baseline is marked as such instead of
// being compared against itself.

use super::baseline::{compute_baseline, BaselineStats};
use super::ci::{mean_ci95, MeanInterval};
use super::config::DetectionConfig;
use super::detect::{detect_regression_with, RegressionStatus};
use crate::summary::{RunId, RunSummary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one historical run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    Regressed,
    /// Reference run the baseline was anchored on
    Baseline,
    Insufficient,
}

impl From<RegressionStatus> for RunStatus {
    fn from(status: RegressionStatus) -> Self {
        match status {
            RegressionStatus::Ok => Self::Ok,
            RegressionStatus::Regressed => Self::Regressed,
            RegressionStatus::Insufficient => Self::Insufficient,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::Regressed => "regressed",
            Self::Baseline => "baseline",
            Self::Insufficient => "insufficient",
        })
    }
}

/// One annotated run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunVerdict {
    pub run_id: RunId,
    pub median_ns: u64,
    pub status: RunStatus,
    /// 95% interval around the run's own median
    pub ci: MeanInterval,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
}

/// Annotate every run of a newest-first `history`
///
/// The baseline is computed with `config.min_points` and
/// `config.baseline_offset`. Without one, every run is `Insufficient`. Output
/// keeps the input order.
///
/// # Example
/// ```
/// use benchgate::regression::{annotate_history, DetectionConfig, RunStatus};
/// use benchgate::summary::{RunId, RunSummary};
///
/// let history: Vec<RunSummary> = [100, 102, 98, 101, 99]
///     .iter()
///     .enumerate()
///     .map(|(i, &m)| RunSummary::new(RunId(5 - i as i64), m, 5, 5))
///     .collect();
/// let verdicts = annotate_history(&history, &DetectionConfig::default());
/// assert_eq!(verdicts[0].status, RunStatus::Baseline);
/// assert_eq!((verdicts[0].ci.lower_ns, verdicts[0].ci.upper_ns), (94, 106));
/// ```
pub fn annotate_history(history: &[RunSummary], config: &DetectionConfig) -> Vec<RunVerdict> {
    let baseline = compute_baseline(history, config.min_points, config.baseline_offset).ok();
    annotate_runs(history, baseline.as_ref(), config)
}

pub(crate) fn annotate_runs(
    runs: &[RunSummary],
    baseline: Option<&BaselineStats>,
    config: &DetectionConfig,
) -> Vec<RunVerdict> {
    runs.iter()
        .map(|run| {
            let ci = mean_ci95(run.median_ns, run.std_dev_ns, run.sample_count);
            let (status, change_percent) = match baseline {
                Some(b) if b.reference_run_id == run.run_id => (RunStatus::Baseline, None),
                _ => {
                    let result = detect_regression_with(run, baseline, config);
                    (result.status.into(), result.change_percent)
                }
            };
            RunVerdict {
                run_id: run.run_id,
                median_ns: run.median_ns,
                status,
                ci,
                change_percent,
            }
        })
        .collect()
}
