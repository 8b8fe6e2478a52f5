//! Synthetic device sampling

pub mod simulator;

pub use simulator::{Baseline, SensorSimulator, Variation};
