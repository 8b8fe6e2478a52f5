//! Test doubles for the pipeline

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::DeviceStatistics;
use crate::data::{Alert, Reading};
use crate::report::Reporter;
use crate::storage::{Persistence, StorageError};

/// Captures every reporter call
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub registered: Mutex<Vec<String>>,
    /// (device_id, number of alerts)
    pub processed: Mutex<Vec<(String, usize)>>,
    pub failures: Mutex<Vec<String>>,
    pub statistics: Mutex<Vec<(String, Option<DeviceStatistics>)>>,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
}

impl Reporter for RecordingReporter {
    fn device_registered(&self, device_id: &str, _location: &str) {
        self.registered.lock().push(device_id.to_string());
    }

    fn hub_started(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn hub_stopped(&self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }

    fn reading_processed(&self, reading: &Reading, alerts: &[Alert]) {
        self.processed
            .lock()
            .push((reading.device_id.clone(), alerts.len()));
    }

    fn processing_failed(&self, _reading: &Reading, error: &StorageError) {
        self.failures.lock().push(error.to_string());
    }

    fn statistics(&self, device_id: &str, stats: Option<&DeviceStatistics>) {
        self.statistics
            .lock()
            .push((device_id.to_string(), stats.cloned()));
    }
}

/// Store wrapper that fails a set number of writes before delegating
pub struct FlakyStore {
    inner: Arc<dyn Persistence>,
    reading_failures: AtomicUsize,
    alert_failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn Persistence>) -> Self {
        Self {
            inner,
            reading_failures: AtomicUsize::new(0),
            alert_failures: AtomicUsize::new(0),
        }
    }

    pub fn fail_reading_saves(self, count: usize) -> Self {
        self.reading_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn fail_alert_saves(self, count: usize) -> Self {
        self.alert_failures.store(count, Ordering::SeqCst);
        self
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Persistence for FlakyStore {
    fn save_reading(&self, reading: &Reading) -> Result<(), StorageError> {
        if Self::take_failure(&self.reading_failures) {
            return Err(StorageError::Unavailable("injected reading failure".into()));
        }
        self.inner.save_reading(reading)
    }

    fn save_alert(&self, alert: &Alert) -> Result<(), StorageError> {
        if Self::take_failure(&self.alert_failures) {
            return Err(StorageError::Unavailable("injected alert failure".into()));
        }
        self.inner.save_alert(alert)
    }

    fn latest_readings(&self, device_id: &str, limit: usize) -> Result<Vec<Reading>, StorageError> {
        self.inner.latest_readings(device_id, limit)
    }

    fn alerts_for(&self, device_id: &str, limit: usize) -> Result<Vec<Alert>, StorageError> {
        self.inner.alerts_for(device_id, limit)
    }

    fn reading_count(&self, device_id: &str) -> Result<usize, StorageError> {
        self.inner.reading_count(device_id)
    }

    fn alert_count(&self, device_id: &str) -> Result<usize, StorageError> {
        self.inner.alert_count(device_id)
    }
}
