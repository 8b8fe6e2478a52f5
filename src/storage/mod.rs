//! Durable storage for readings and alerts
//!
//! The pipeline only talks to the [`Persistence`] trait. [`SensorStore`] is
//! the on-disk implementation: two append-only JSON-lines logs replayed into
//! an in-memory index on open.

pub mod engine;
pub mod log;

pub use engine::SensorStore;
pub use log::{Entry, RecordLog};

use std::path::{Path, PathBuf};

use crate::data::{Alert, Reading};

/// Storage operations the pipeline depends on.
///
/// Implementations must tolerate reads concurrent with the single writer.
pub trait Persistence: Send + Sync {
    /// Durably store a reading
    fn save_reading(&self, reading: &Reading) -> Result<(), StorageError>;

    /// Durably store an alert
    fn save_alert(&self, alert: &Alert) -> Result<(), StorageError>;

    /// Up to `limit` readings for a device, newest first
    fn latest_readings(&self, device_id: &str, limit: usize) -> Result<Vec<Reading>, StorageError>;

    /// Up to `limit` alerts for a device, newest first
    fn alerts_for(&self, device_id: &str, limit: usize) -> Result<Vec<Alert>, StorageError>;

    /// Total readings stored for a device
    fn reading_count(&self, device_id: &str) -> Result<usize, StorageError>;

    /// Total alerts stored for a device
    fn alert_count(&self, device_id: &str) -> Result<usize, StorageError>;
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Directory holding the log files
    pub data_dir: PathBuf,
    /// fsync after every append
    pub sync_on_write: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./sensorhub_data"),
            sync_on_write: true,
        }
    }
}

impl PersistenceConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupted record in {file} at line {line}: {reason}")]
    Corrupted {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
