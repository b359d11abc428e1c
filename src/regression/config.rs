// Operator-facing parameters for baseline computation and detection
//
// No fixed percentage threshold: the minimum effect adapts to each
// benchmark's run-to-run noise, and significance comes from a one-sided t-test.

use super::tables::SignificanceModel;
use crate::error::{AnalysisError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for baseline computation and regression detection
///
/// # Example
/// ```
/// use benchgate::regression::DetectionConfig;
///
/// let config = DetectionConfig::default();
/// assert_eq!(config.alpha, 0.01); // 99% one-sided confidence
/// assert_eq!(config.min_points, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum number of valid historical runs before a baseline is trusted
    ///
    /// Runs with a single sample or zero spread do not count.
    ///
    /// Default: 3
    pub min_points: usize,

    /// Number of most recent runs excluded from the baseline window
    ///
    /// Keeps the runs under test from poisoning their own baseline. History
    /// must be ordered newest-first when this is non-zero.
    ///
    /// Default: 0
    pub baseline_offset: usize,

    /// One-sided significance level for the regression t-test
    ///
    /// - 0.01 (default): tabulated critical values for df 1-30
    /// - other values: exact only under [`SignificanceModel::StudentT`]
    pub alpha: f64,

    /// How critical values and p-values are derived
    ///
    /// Default: [`SignificanceModel::Tabulated`]
    pub significance_model: SignificanceModel,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_points: 3,
            baseline_offset: 0,
            alpha: 0.01,
            significance_model: SignificanceModel::Tabulated,
        }
    }
}

impl DetectionConfig {
    /// Fewer false positives: a longer history and exact t quantiles at alpha 0.005
    pub fn strict() -> Self {
        Self {
            min_points: 10,
            baseline_offset: 0,
            alpha: 0.005,
            significance_model: SignificanceModel::StudentT,
        }
    }

    /// Earlier warnings: a short history and alpha 0.05
    pub fn permissive() -> Self {
        Self {
            min_points: 2,
            baseline_offset: 0,
            alpha: 0.05,
            significance_model: SignificanceModel::StudentT,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }

        // Sample variance of run medians needs two points
        if self.min_points < 2 {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_points must be >= 2, got {}",
                self.min_points
            )));
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    ///
    /// # Example TOML
    /// ```toml
    /// min_points = 5
    /// baseline_offset = 1
    /// alpha = 0.01
    /// significance_model = "tabulated"
    /// ```
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self =
            toml::from_str(content).context("Failed to parse TOML detection config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectionConfig::default();
        assert_eq!(config.min_points, 3);
        assert_eq!(config.baseline_offset, 0);
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.significance_model, SignificanceModel::Tabulated);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_config() {
        let config = DetectionConfig::strict();
        assert_eq!(config.alpha, 0.005);
        assert_eq!(config.min_points, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_permissive_config() {
        let config = DetectionConfig::permissive();
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.min_points, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_alpha() {
        let mut config = DetectionConfig::default();
        config.alpha = 1.5;
        assert!(config.validate().is_err());
        config.alpha = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_min_points() {
        let mut config = DetectionConfig::default();
        config.min_points = 1;
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_toml_partial_uses_defaults() {
        let config = DetectionConfig::from_toml_str("baseline_offset = 2\n").unwrap();
        assert_eq!(config.baseline_offset, 2);
        assert_eq!(config.min_points, 3);
        assert_eq!(config.alpha, 0.01);
    }

    #[test]
    fn test_from_toml_model() {
        let config =
            DetectionConfig::from_toml_str("alpha = 0.05\nsignificance_model = \"student_t\"\n")
                .unwrap();
        assert_eq!(config.significance_model, SignificanceModel::StudentT);
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        assert!(DetectionConfig::from_toml_str("min_points = 0\n").is_err());
        assert!(DetectionConfig::from_toml_str("alpha = \"high\"\n").is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.toml");
        fs::write(&path, "min_points = 4\n").unwrap();
        let config = DetectionConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.min_points, 4);

        let missing = DetectionConfig::from_toml_file(dir.path().join("missing.toml"));
        assert!(missing.is_err());
    }
}
