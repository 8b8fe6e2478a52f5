//! Threshold-based alerting
//!
//! Readings are checked against fixed temperature and humidity limits. The
//! evaluator only computes alerts; the hub's processor persists them.

pub mod config;
pub mod evaluator;

pub use config::Thresholds;
pub use evaluator::AlertEvaluator;
