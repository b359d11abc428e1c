// Statistical Regression Detection over Benchmark History
//
// Replaces fixed percentage thresholds ("flag anything 10% slower") with a
// baseline estimated from a window of comparable historical runs and a dual
// gate on the candidate run:
//
// - statistical significance: one-sided t-test of the candidate median against
//   the baseline median, with the candidate's SEM and the baseline variance
//   pooled in the denominator
// - practical significance: the relative slowdown must reach a minimum effect
//   that scales with the benchmark's run-to-run coefficient of variation
//
// Baseline: median of per-run medians. Variance: random-effects split into
// mean squared SEM (within-run) plus tau^2 (between-run excess) for 10+ runs,
// plain sampling variance of the median estimator below that.
//
// Everything here is a pure function of in-memory values: no I/O, no shared
// state. Callers may analyze benchmarks in parallel.

mod analysis;
mod annotate;
mod baseline;
mod ci;
mod config;
mod detect;
mod tables;

pub use analysis::{
    analyze_benchmark, analyze_suite, BenchmarkAnalysis, BenchmarkKey, SuiteReport,
    IMPROVEMENT_THRESHOLD_PERCENT,
};
pub use annotate::{annotate_history, RunStatus, RunVerdict};
pub use baseline::{compute_baseline, BaselineStats};
pub use ci::{mean_ci95, MeanInterval};
pub use config::DetectionConfig;
pub use detect::{
    detect_regression, detect_regression_with, find_introducing_run, find_introducing_run_with,
    min_effect_percent, RegressionResult, RegressionStatus,
};
pub use tables::{
    approximate_p_value, t_critical_95, t_critical_one_sided, SignificanceModel, Z_95_TWO_SIDED,
    Z_99_ONE_SIDED,
};
