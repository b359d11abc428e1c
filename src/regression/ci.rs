// 95% confidence interval around a single run's point estimate
//
// Parametric t-interval from the sample standard deviation. It serves both the
// mean and the median at the 3-30 sample counts typical of benchmark runs.

use super::tables::{t_critical_95, Z_95_TWO_SIDED};
use serde::{Deserialize, Serialize};

/// Rounded interval bounds and standard error, in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeanInterval {
    pub lower_ns: u64,
    pub upper_ns: u64,
    pub sem_ns: u64,
}

/// 95% confidence interval around `value_ns`
///
/// Collapses to `value_ns` with zero standard error when fewer than two samples
/// or no spread were recorded. Uses the t table below 30 samples and the normal
/// value from 30 on. The lower bound is clamped at zero.
///
/// # Example
/// ```
/// use benchgate::regression::mean_ci95;
///
/// let ci = mean_ci95(100, 20, 4);
/// assert_eq!(ci.sem_ns, 10);
/// assert_eq!((ci.lower_ns, ci.upper_ns), (68, 132));
/// ```
pub fn mean_ci95(value_ns: u64, std_dev_ns: u64, sample_count: u64) -> MeanInterval {
    if sample_count < 2 || std_dev_ns == 0 {
        return MeanInterval {
            lower_ns: value_ns,
            upper_ns: value_ns,
            sem_ns: 0,
        };
    }

    let sem = std_dev_ns as f64 / (sample_count as f64).sqrt();
    let t_crit = if sample_count < 30 {
        t_critical_95((sample_count - 1) as usize)
    } else {
        Z_95_TWO_SIDED
    };

    let margin = t_crit * sem;
    let lower = (value_ns as f64 - margin).max(0.0);
    let upper = value_ns as f64 + margin;

    MeanInterval {
        lower_ns: lower.round() as u64,
        upper_ns: upper.round() as u64,
        sem_ns: sem.round() as u64,
    }
}
