//! Threshold evaluation of readings

use super::config::Thresholds;
use crate::data::{Alert, AlertType, Reading};

/// Turns readings into alerts.
///
/// Evaluation is pure; persisting the resulting alerts is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    thresholds: Thresholds,
}

impl AlertEvaluator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Check a reading against the thresholds.
    ///
    /// Each dimension yields at most one alert: high is checked first, low
    /// only when high did not fire. The temperature alert, if any, comes
    /// before the humidity alert.
    ///
    /// Values are not validated. A NaN compares false against every limit
    /// and therefore never raises an alert.
    pub fn evaluate(&self, reading: &Reading) -> Vec<Alert> {
        let t = &self.thresholds;
        let mut alerts = Vec::with_capacity(2);

        if reading.temperature > t.temperature_high {
            alerts.push(Self::alert(
                reading,
                AlertType::HighTemperature,
                reading.temperature,
            ));
        } else if reading.temperature < t.temperature_low {
            alerts.push(Self::alert(
                reading,
                AlertType::LowTemperature,
                reading.temperature,
            ));
        }

        if reading.humidity > t.humidity_high {
            alerts.push(Self::alert(reading, AlertType::HighHumidity, reading.humidity));
        } else if reading.humidity < t.humidity_low {
            alerts.push(Self::alert(reading, AlertType::LowHumidity, reading.humidity));
        }

        alerts
    }

    fn alert(reading: &Reading, alert_type: AlertType, value: f64) -> Alert {
        Alert {
            device_id: reading.device_id.clone(),
            timestamp: reading.timestamp,
            alert_type,
            message: describe(alert_type, value),
            value,
        }
    }
}

fn describe(alert_type: AlertType, value: f64) -> String {
    match alert_type {
        AlertType::HighTemperature => format!("High temperature detected: {}°C", value),
        AlertType::LowTemperature => format!("Low temperature detected: {}°C", value),
        AlertType::HighHumidity => format!("High humidity detected: {}%", value),
        AlertType::LowHumidity => format!("Low humidity detected: {}%", value),
    }
}
