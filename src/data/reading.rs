use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped environmental sample from a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    pub location: String,
}

impl Reading {
    pub fn new(
        device_id: impl Into<String>,
        location: impl Into<String>,
        temperature: f64,
        humidity: f64,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp: Utc::now(),
            temperature,
            humidity,
            location: location.into(),
        }
    }

    /// Replace the capture time
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
