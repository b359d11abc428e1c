// Per-benchmark and suite-wide orchestration of baseline + detection
//
// A benchmark without enough history is reported as insufficient, never as an
// error: new benchmarks appear all the time.

use super::annotate::{annotate_runs, RunVerdict};
use super::baseline::{compute_baseline, BaselineStats};
use super::ci::{mean_ci95, MeanInterval};
use super::config::DetectionConfig;
use super::detect::{
    detect_regression_with, find_introducing_run_with, RegressionResult, RegressionStatus,
};
use crate::summary::{RunId, RunSummary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speedup (in percent) beyond which an ok candidate counts as an improvement
pub const IMPROVEMENT_THRESHOLD_PERCENT: f64 = 5.0;

/// Identity of a benchmark within a suite
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BenchmarkKey {
    pub category: String,
    pub name: String,
}

impl BenchmarkKey {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for BenchmarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// Analysis of one candidate run against its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkAnalysis {
    pub key: BenchmarkKey,
    pub candidate: RunSummary,
    /// 95% interval around the candidate median
    pub candidate_ci: MeanInterval,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineStats>,
    pub result: RegressionResult,
    /// Earliest run (excluded window or the candidate) flagged against the baseline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introducing_run: Option<RunId>,
    /// Every historical run judged against the same baseline, newest first
    pub history: Vec<RunVerdict>,
}

impl BenchmarkAnalysis {
    /// Relative change of the candidate median against the baseline median
    pub fn change_percent(&self) -> Option<f64> {
        match self.baseline {
            Some(b) if b.median > 0.0 => {
                Some((self.candidate.median_ns as f64 - b.median) / b.median * 100.0)
            }
            _ => None,
        }
    }

    /// Ok verdict with a speedup beyond [`IMPROVEMENT_THRESHOLD_PERCENT`]
    pub fn is_improvement(&self) -> bool {
        self.result.status == RegressionStatus::Ok
            && self
                .change_percent()
                .is_some_and(|change| change < -IMPROVEMENT_THRESHOLD_PERCENT)
    }
}

/// Analyze `candidate` against a newest-first `history`
///
/// The first `config.baseline_offset` runs of `history` are kept out of the
/// baseline. When the candidate regresses, those excluded runs (oldest first)
/// and then the candidate are scanned for the run that introduced it.
pub fn analyze_benchmark(
    key: BenchmarkKey,
    history: &[RunSummary],
    candidate: RunSummary,
    config: &DetectionConfig,
) -> BenchmarkAnalysis {
    let baseline = match compute_baseline(history, config.min_points, config.baseline_offset) {
        Ok(baseline) => Some(baseline),
        Err(e) => {
            tracing::debug!(benchmark = %key, "no baseline: {}", e);
            None
        }
    };

    let result = detect_regression_with(&candidate, baseline.as_ref(), config);

    let introducing_run = if result.is_regressed() {
        let excluded = config.baseline_offset.min(history.len());
        let mut window: Vec<RunSummary> = history[..excluded].iter().rev().copied().collect();
        window.push(candidate);
        find_introducing_run_with(&window, baseline.as_ref(), config)
    } else {
        None
    };

    let history = annotate_runs(history, baseline.as_ref(), config);

    BenchmarkAnalysis {
        key,
        candidate,
        candidate_ci: mean_ci95(
            candidate.median_ns,
            candidate.std_dev_ns,
            candidate.sample_count,
        ),
        baseline,
        result,
        introducing_run,
        history,
    }
}

/// Verdicts for every benchmark in a suite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub analyses: Vec<BenchmarkAnalysis>,
    pub regressed: usize,
    pub ok: usize,
    pub insufficient: usize,
    /// Ok candidates more than [`IMPROVEMENT_THRESHOLD_PERCENT`] faster
    pub improved: usize,
}

impl SuiteReport {
    pub fn has_regressions(&self) -> bool {
        self.regressed > 0
    }

    /// Regressed benchmarks only
    pub fn regressions(&self) -> impl Iterator<Item = &BenchmarkAnalysis> {
        self.analyses.iter().filter(|a| a.result.is_regressed())
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        if self.has_regressions() {
            report.push_str(&format!("REGRESSIONS DETECTED ({})\n\n", self.regressed));
        } else {
            report.push_str("NO REGRESSIONS DETECTED\n\n");
        }

        report.push_str(&format!(
            "{:<48} {:>12} {:>12} {:>10}  {}\n",
            "Benchmark", "Baseline", "Current", "Change", "Status"
        ));
        for analysis in &self.analyses {
            let baseline = analysis
                .baseline
                .map(|b| format!("{:.0}", b.median))
                .unwrap_or_else(|| "-".to_string());
            let change = analysis
                .change_percent()
                .map(|c| format!("{:+.1}%", c))
                .unwrap_or_else(|| "-".to_string());
            report.push_str(&format!(
                "{:<48} {:>12} {:>12} {:>10}  {}",
                analysis.key.to_string(),
                baseline,
                analysis.candidate.median_ns,
                change,
                analysis.result.status
            ));
            if let Some(run_id) = analysis.introducing_run {
                report.push_str(&format!(" (introduced in {})", run_id));
            }
            report.push('\n');
        }

        report.push_str(&format!(
            "\nSummary: {} regressed, {} ok, {} insufficient, {} improved\n",
            self.regressed, self.ok, self.insufficient, self.improved
        ));
        report
    }
}

/// Analyze every `(key, newest-first history, candidate)` entry
pub fn analyze_suite<I>(benchmarks: I, config: &DetectionConfig) -> SuiteReport
where
    I: IntoIterator<Item = (BenchmarkKey, Vec<RunSummary>, RunSummary)>,
{
    let mut report = SuiteReport::default();
    for (key, history, candidate) in benchmarks {
        let analysis = analyze_benchmark(key, &history, candidate, config);
        match analysis.result.status {
            RegressionStatus::Regressed => report.regressed += 1,
            RegressionStatus::Ok => report.ok += 1,
            RegressionStatus::Insufficient => report.insufficient += 1,
        }
        if analysis.is_improvement() {
            report.improved += 1;
        }
        report.analyses.push(analysis);
    }

    tracing::info!(
        benchmarks = report.analyses.len(),
        regressed = report.regressed,
        insufficient = report.insufficient,
        improved = report.improved,
        "suite analysis complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::RunStatus;

    fn newest_first(medians: &[u64]) -> Vec<RunSummary> {
        let n = medians.len() as i64;
        medians
            .iter()
            .enumerate()
            .map(|(i, &m)| RunSummary::new(RunId(n - i as i64), m, 5, 5))
            .collect()
    }

    #[test]
    fn test_analyze_benchmark_regression() {
        let history = newest_first(&[100, 102, 98, 101, 99]);
        let candidate = RunSummary::new(RunId(6), 130, 5, 5);
        let analysis = analyze_benchmark(
            BenchmarkKey::new("render", "diff"),
            &history,
            candidate,
            &DetectionConfig::default(),
        );

        assert_eq!(analysis.result.status, RegressionStatus::Regressed);
        assert_eq!(analysis.introducing_run, Some(RunId(6)));
        assert!(analysis.baseline.is_some());
        assert!(!analysis.is_improvement());
    }

    #[test]
    fn test_analyze_benchmark_carries_intervals_and_history() {
        let history = newest_first(&[100, 102, 98, 101, 99]);
        let candidate = RunSummary::new(RunId(6), 130, 5, 5);
        let analysis = analyze_benchmark(
            BenchmarkKey::new("render", "diff"),
            &history,
            candidate,
            &DetectionConfig::default(),
        );

        // sem ~ 2.24, t(df = 4) = 2.776
        assert_eq!(
            (analysis.candidate_ci.lower_ns, analysis.candidate_ci.upper_ns),
            (124, 136)
        );
        assert_eq!(analysis.candidate_ci.sem_ns, 2);
        assert_eq!(analysis.history.len(), 5);
        assert_eq!(analysis.history[0].status, RunStatus::Baseline);
        assert!(analysis.history[1..].iter().all(|v| v.status == RunStatus::Ok));

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["history"][0]["status"], "baseline");
        assert_eq!(json["candidate_ci"]["upper_ns"], 136);
    }

    #[test]
    fn test_improvement_needs_more_than_five_percent() {
        let history = newest_first(&[100, 102, 98, 101, 99]);
        let config = DetectionConfig::default();
        let key = BenchmarkKey::new("render", "diff");

        let faster = analyze_benchmark(
            key.clone(),
            &history,
            RunSummary::new(RunId(6), 90, 5, 5),
            &config,
        );
        assert_eq!(faster.result.status, RegressionStatus::Ok);
        assert!(faster.is_improvement());

        let slightly_faster = analyze_benchmark(
            key,
            &history,
            RunSummary::new(RunId(6), 96, 5, 5),
            &config,
        );
        assert!(!slightly_faster.is_improvement());
    }

    #[test]
    fn test_analyze_benchmark_finds_run_inside_offset() {
        // Newest first: runs 9 and 8 are already slow, the baseline is older
        let history = newest_first(&[131, 129, 100, 102, 98, 101, 99]);
        let candidate = RunSummary::new(RunId(10), 130, 5, 5);
        let config = DetectionConfig {
            baseline_offset: 2,
            ..DetectionConfig::default()
        };
        let analysis =
            analyze_benchmark(BenchmarkKey::new("render", "diff"), &history, candidate, &config);

        assert_eq!(analysis.result.status, RegressionStatus::Regressed);
        assert_eq!(analysis.introducing_run, Some(RunId(6)));
    }

    #[test]
    fn test_analyze_benchmark_without_history_is_insufficient() {
        let candidate = RunSummary::new(RunId(1), 130, 5, 5);
        let analysis = analyze_benchmark(
            BenchmarkKey::new("render", "new"),
            &[],
            candidate,
            &DetectionConfig::default(),
        );
        assert_eq!(analysis.result.status, RegressionStatus::Insufficient);
        assert!(analysis.baseline.is_none());
        assert!(analysis.introducing_run.is_none());
        assert!(analysis.history.is_empty());
        assert!(!analysis.is_improvement());
    }

    #[test]
    fn test_analyze_suite_counts() {
        let config = DetectionConfig::default();
        let report = analyze_suite(
            vec![
                (
                    BenchmarkKey::new("a", "slow"),
                    newest_first(&[100, 102, 98, 101, 99]),
                    RunSummary::new(RunId(6), 130, 5, 5),
                ),
                (
                    BenchmarkKey::new("a", "steady"),
                    newest_first(&[100, 102, 98, 101, 99]),
                    RunSummary::new(RunId(6), 101, 5, 5),
                ),
                (
                    BenchmarkKey::new("a", "faster"),
                    newest_first(&[100, 102, 98, 101, 99]),
                    RunSummary::new(RunId(6), 80, 5, 5),
                ),
                (
                    BenchmarkKey::new("b", "fresh"),
                    Vec::new(),
                    RunSummary::new(RunId(6), 101, 5, 5),
                ),
            ],
            &config,
        );

        assert_eq!(
            (report.regressed, report.ok, report.insufficient, report.improved),
            (1, 2, 1, 1)
        );
        assert!(report.has_regressions());
        assert_eq!(report.regressions().count(), 1);

        let text = report.to_report_string();
        assert!(text.contains("REGRESSIONS DETECTED (1)"));
        assert!(text.contains("a/slow"));
        assert!(text.contains("+30.0%"));
        assert!(text.contains("-20.0%"));
        assert!(text.contains("Summary: 1 regressed, 2 ok, 1 insufficient, 1 improved"));
    }
}
