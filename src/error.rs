//! Error types for benchmark aggregation and regression analysis
//!
//! `InsufficientData` is a routine outcome (a brand-new benchmark has no
//! history yet), so callers branch on it rather than report it.

use std::fmt;
use thiserror::Error;

/// Why a baseline could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsufficientReason {
    /// A baseline offset was requested but run IDs are not newest-first
    Unordered,
    /// The offset skips every run in the history
    OffsetExhaustsHistory { offset: usize, available: usize },
    /// Too few runs with `sample_count >= 2` and non-zero spread
    TooFewValidRuns { valid: usize, required: usize },
}

impl fmt::Display for InsufficientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unordered => write!(f, "history is not ordered newest-first"),
            Self::OffsetExhaustsHistory { offset, available } => write!(
                f,
                "baseline offset {} leaves no runs out of {}",
                offset, available
            ),
            Self::TooFewValidRuns { valid, required } => write!(
                f,
                "need at least {} valid runs, got {}",
                required, valid
            ),
        }
    }
}

/// Errors for aggregation, ingestion and baseline computation
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("insufficient data for regression analysis: {0}")]
    InsufficientData(InsufficientReason),

    #[error("cannot aggregate an empty sample list")]
    EmptySamples,

    #[error("invalid detection config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse benchmark JSON on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read benchmark output: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// True for the "not enough history" branch
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
