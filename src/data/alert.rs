use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which threshold a reading crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    HighTemperature,
    LowTemperature,
    HighHumidity,
    LowHumidity,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::HighTemperature => "HIGH_TEMPERATURE",
            AlertType::LowTemperature => "LOW_TEMPERATURE",
            AlertType::HighHumidity => "HIGH_HUMIDITY",
            AlertType::LowHumidity => "LOW_HUMIDITY",
        }
    }

    /// Whether this alert concerns the temperature dimension
    pub fn is_temperature(&self) -> bool {
        matches!(self, AlertType::HighTemperature | AlertType::LowTemperature)
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold violation derived from a single reading.
///
/// `device_id` and `timestamp` are copied from the triggering reading, so an
/// alert can always be matched back to the reading that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub alert_type: AlertType,
    pub message: String,
    /// The offending measurement
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_type_serializes_as_screaming_case() {
        let json = serde_json::to_value(AlertType::HighTemperature).unwrap();
        assert_eq!(json, "HIGH_TEMPERATURE");

        let parsed: AlertType = serde_json::from_str("\"LOW_HUMIDITY\"").unwrap();
        assert_eq!(parsed, AlertType::LowHumidity);
    }

    #[test]
    fn test_alert_type_display_matches_serde() {
        for kind in [
            AlertType::HighTemperature,
            AlertType::LowTemperature,
            AlertType::HighHumidity,
            AlertType::LowHumidity,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
        }
    }

    #[test]
    fn test_alert_dimension() {
        assert!(AlertType::LowTemperature.is_temperature());
        assert!(!AlertType::HighHumidity.is_temperature());
    }
}
