//! Alert threshold configuration

use serde::{Deserialize, Serialize};

/// Fixed limits a reading is checked against.
///
/// All comparisons are strict: a value exactly on a limit is in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub temperature_high: f64,
    pub temperature_low: f64,
    pub humidity_high: f64,
    pub humidity_low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature_high: 28.0,
            temperature_low: 18.0,
            humidity_high: 70.0,
            humidity_low: 30.0,
        }
    }
}
