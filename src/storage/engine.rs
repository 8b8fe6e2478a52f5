use std::cmp::Reverse;

use dashmap::DashMap;

use super::log::{Entry, RecordLog};
use super::{Persistence, PersistenceConfig, StorageError};
use crate::data::{Alert, Reading};

const READINGS_FILE: &str = "readings.jsonl";
const ALERTS_FILE: &str = "alerts.jsonl";

/// File-backed store for readings and alerts.
///
/// Every write goes to the log first and is indexed only once it is on disk,
/// so the index never holds a record that would be lost on restart.
pub struct SensorStore {
    config: PersistenceConfig,
    readings_log: RecordLog,
    alerts_log: RecordLog,
    /// Readings by device, in append order
    readings: DashMap<String, Vec<Entry<Reading>>>,
    /// Alerts by device, in append order
    alerts: DashMap<String, Vec<Entry<Alert>>>,
}

impl SensorStore {
    /// Open the store in `config.data_dir`, creating it if needed
    pub fn open(config: PersistenceConfig) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.data_dir)?;

        let (readings_log, stored_readings) = RecordLog::open::<Reading>(
            config.data_dir.join(READINGS_FILE),
            config.sync_on_write,
        )?;
        let (alerts_log, stored_alerts) =
            RecordLog::open::<Alert>(config.data_dir.join(ALERTS_FILE), config.sync_on_write)?;

        let readings: DashMap<String, Vec<Entry<Reading>>> = DashMap::new();
        for entry in stored_readings {
            readings
                .entry(entry.record.device_id.clone())
                .or_default()
                .push(entry);
        }

        let alerts: DashMap<String, Vec<Entry<Alert>>> = DashMap::new();
        for entry in stored_alerts {
            alerts
                .entry(entry.record.device_id.clone())
                .or_default()
                .push(entry);
        }

        tracing::info!(
            data_dir = %config.data_dir.display(),
            devices = readings.len(),
            "Opened sensor store"
        );

        Ok(Self {
            config,
            readings_log,
            alerts_log,
            readings,
            alerts,
        })
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    /// Devices with at least one stored reading, sorted
    pub fn device_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.readings.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Flush both logs to disk
    pub fn sync(&self) -> Result<(), StorageError> {
        self.readings_log.sync()?;
        self.alerts_log.sync()
    }
}

/// Newest `limit` records by (timestamp, id), descending
fn newest<T: Clone>(
    entries: &[Entry<T>],
    limit: usize,
    timestamp: impl Fn(&T) -> chrono::DateTime<chrono::Utc>,
) -> Vec<T> {
    let mut refs: Vec<&Entry<T>> = entries.iter().collect();
    refs.sort_by_key(|e| Reverse((timestamp(&e.record), e.id)));
    refs.into_iter()
        .take(limit)
        .map(|e| e.record.clone())
        .collect()
}

impl Persistence for SensorStore {
    fn save_reading(&self, reading: &Reading) -> Result<(), StorageError> {
        let id = self.readings_log.append(reading)?;
        self.readings
            .entry(reading.device_id.clone())
            .or_default()
            .push(Entry {
                id,
                record: reading.clone(),
            });
        Ok(())
    }

    fn save_alert(&self, alert: &Alert) -> Result<(), StorageError> {
        let id = self.alerts_log.append(alert)?;
        self.alerts
            .entry(alert.device_id.clone())
            .or_default()
            .push(Entry {
                id,
                record: alert.clone(),
            });
        Ok(())
    }

    fn latest_readings(&self, device_id: &str, limit: usize) -> Result<Vec<Reading>, StorageError> {
        Ok(self
            .readings
            .get(device_id)
            .map(|entries| newest(entries.as_slice(), limit, |r| r.timestamp))
            .unwrap_or_default())
    }

    fn alerts_for(&self, device_id: &str, limit: usize) -> Result<Vec<Alert>, StorageError> {
        Ok(self
            .alerts
            .get(device_id)
            .map(|entries| newest(entries.as_slice(), limit, |a| a.timestamp))
            .unwrap_or_default())
    }

    fn reading_count(&self, device_id: &str) -> Result<usize, StorageError> {
        Ok(self.readings.get(device_id).map(|e| e.len()).unwrap_or(0))
    }

    fn alert_count(&self, device_id: &str) -> Result<usize, StorageError> {
        Ok(self.alerts.get(device_id).map(|e| e.len()).unwrap_or(0))
    }
}
