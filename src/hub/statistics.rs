//! Per-device statistics and pipeline counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::data::Reading;

/// Mean/min/max of one measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// `None` for an empty input
    fn from_values(values: impl Iterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            mean: sum / count as f64,
            min,
            max,
        })
    }
}

/// Statistics over a window of a device's most recent readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatistics {
    pub device_id: String,
    /// Readings in the window, not the device's full history
    pub count: usize,
    pub temperature: Summary,
    pub humidity: Summary,
}

impl DeviceStatistics {
    /// Compute statistics, or `None` when there are no readings
    pub fn from_readings(device_id: impl Into<String>, readings: &[Reading]) -> Option<Self> {
        let temperature = Summary::from_values(readings.iter().map(|r| r.temperature))?;
        let humidity = Summary::from_values(readings.iter().map(|r| r.humidity))?;

        Some(Self {
            device_id: device_id.into(),
            count: readings.len(),
            temperature,
            humidity,
        })
    }
}

/// Running counters shared by the collector and processor
#[derive(Debug, Default)]
pub struct PipelineStats {
    readings_collected: AtomicU64,
    readings_persisted: AtomicU64,
    alerts_persisted: AtomicU64,
    processing_errors: AtomicU64,
}

impl PipelineStats {
    pub fn record_collected(&self) {
        self.readings_collected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reading_persisted(&self) {
        self.readings_persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alert_persisted(&self) {
        self.alerts_persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.processing_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            readings_collected: self.readings_collected.load(Ordering::Relaxed),
            readings_persisted: self.readings_persisted.load(Ordering::Relaxed),
            alerts_persisted: self.alerts_persisted.load(Ordering::Relaxed),
            processing_errors: self.processing_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSnapshot {
    pub readings_collected: u64,
    pub readings_persisted: u64,
    pub alerts_persisted: u64,
    pub processing_errors: u64,
}
