//! Console output for an interactive hub

use super::Reporter;
use crate::data::{Alert, Reading};
use crate::hub::DeviceStatistics;
use crate::storage::StorageError;

/// Prints live summaries to stdout and mirrors alerts and failures to tracing
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    fn format_reading(reading: &Reading, alerts: &[Alert]) -> String {
        let mut out = format!(
            "\n{} ({})\n   Temperature: {}°C\n   Humidity: {}%\n   Time: {}",
            reading.device_id,
            reading.location,
            reading.temperature,
            reading.humidity,
            reading.timestamp.to_rfc3339(),
        );
        for alert in alerts {
            out.push_str(&format!("\n   ALERT: {}", alert.message));
        }
        out
    }

    fn format_statistics(stats: &DeviceStatistics) -> String {
        format!(
            concat!(
                "\n{} statistics:\n",
                "   Readings: {}\n",
                "   Mean temperature: {:.2}°C\n",
                "   Min/Max temperature: {:.2}°C / {:.2}°C\n",
                "   Mean humidity: {:.2}%\n",
                "   Min/Max humidity: {:.2}% / {:.2}%\n",
            ),
            stats.device_id,
            stats.count,
            stats.temperature.mean,
            stats.temperature.min,
            stats.temperature.max,
            stats.humidity.mean,
            stats.humidity.min,
            stats.humidity.max,
        )
    }
}

impl Reporter for ConsoleReporter {
    fn device_registered(&self, device_id: &str, location: &str) {
        tracing::info!(device_id = %device_id, location = %location, "Device registered");
        println!("Device registered: {} ({})", device_id, location);
    }

    fn hub_started(&self) {
        println!("\nHub running. Press Ctrl+C to stop.\n");
        println!("{}", "=".repeat(50));
    }

    fn hub_stopped(&self) {
        println!("\nHub stopped\n");
    }

    fn reading_processed(&self, reading: &Reading, alerts: &[Alert]) {
        for alert in alerts {
            tracing::warn!(
                device_id = %alert.device_id,
                alert_type = %alert.alert_type,
                value = alert.value,
                "Alert triggered: {}",
                alert.message
            );
        }
        println!("{}", Self::format_reading(reading, alerts));
    }

    fn processing_failed(&self, reading: &Reading, error: &StorageError) {
        tracing::error!(
            device_id = %reading.device_id,
            error = %error,
            "Failed to process reading"
        );
    }

    fn statistics(&self, device_id: &str, stats: Option<&DeviceStatistics>) {
        match stats {
            Some(stats) => println!("{}", Self::format_statistics(stats)),
            None => println!("No data found for {}", device_id),
        }
    }
}
