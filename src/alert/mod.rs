//! Alert decision logic.
//!
//! - `thresholds` — the threshold table and its fixed defaults.
//! - `scoring` — pure point/indicator accumulation, convergence, severity.
//! - `messages` — fixed alert wording.
//! - `convergence` — the `ConvergenceEngine` tying it together with the trace.

pub mod convergence;
pub mod messages;
pub mod scoring;
pub mod thresholds;

pub use convergence::{ConvergenceAnalysis, ConvergenceEngine, TracedAnalysis};
pub use thresholds::{ThresholdError, ThresholdTable};
