//! Benchgate - statistical regression detection for benchmark history
//!
//! This library reduces repeated benchmark samples into robust per-run
//! summaries, estimates a baseline from comparable historical runs, and decides
//! whether a new run is a genuine regression or run-to-run noise.

pub mod cli;
pub mod error;
pub mod ingest;
pub mod regression;
pub mod summary;

pub use error::{AnalysisError, InsufficientReason};
