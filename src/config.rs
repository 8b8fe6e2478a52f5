//! Hub configuration
//!
//! Environment variables (unset or unparseable values fall back to defaults):
//! - SENSORHUB_DATA_DIR: Storage directory (default: ./sensorhub_data)
//! - SENSORHUB_SYNC_ON_WRITE: fsync every append (default: true)
//! - SENSORHUB_COLLECT_INTERVAL_MS: Sampling period (default: 5000)
//! - SENSORHUB_DEQUEUE_TIMEOUT_MS: Processor wait per dequeue (default: 1000)
//! - SENSORHUB_SHUTDOWN_GRACE_MS: Drain time allowed on stop (default: 2000)
//! - SENSORHUB_QUEUE_CAPACITY: Bounded queue size (default: 1024)
//! - SENSORHUB_STATS_WINDOW: Readings used for statistics (default: 100)
//! - SENSORHUB_DEVICES: Comma-separated `id:location` pairs

use std::str::FromStr;
use std::time::Duration;

use crate::alerts::Thresholds;
use crate::storage::PersistenceConfig;

/// Shortest sampling period; `tokio::time::interval` panics on zero
pub const MIN_COLLECTION_INTERVAL: Duration = Duration::from_millis(1);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Time between sampling rounds
    pub collection_interval: Duration,
    /// Longest the processor waits on an empty queue before re-checking
    /// the running flag
    pub dequeue_timeout: Duration,
    /// How long `stop` waits for the collector and processor to exit
    pub shutdown_grace: Duration,
    /// Capacity of the reading queue
    pub queue_capacity: usize,
    /// Number of most recent readings a statistics query covers
    pub statistics_window: usize,
    pub thresholds: Thresholds,
    pub persistence: PersistenceConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            collection_interval: Duration::from_secs(5),
            dequeue_timeout: Duration::from_secs(1),
            shutdown_grace: Duration::from_secs(2),
            queue_capacity: 1024,
            statistics_window: 100,
            thresholds: Thresholds::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl HubConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut persistence = defaults.persistence.clone();
        if let Ok(dir) = std::env::var("SENSORHUB_DATA_DIR") {
            persistence = PersistenceConfig::new(dir);
        }
        persistence.sync_on_write = env_or("SENSORHUB_SYNC_ON_WRITE", persistence.sync_on_write);

        Self {
            collection_interval: env_millis(
                "SENSORHUB_COLLECT_INTERVAL_MS",
                defaults.collection_interval,
            ),
            dequeue_timeout: env_millis("SENSORHUB_DEQUEUE_TIMEOUT_MS", defaults.dequeue_timeout),
            shutdown_grace: env_millis("SENSORHUB_SHUTDOWN_GRACE_MS", defaults.shutdown_grace),
            // A zero-capacity tokio channel panics
            queue_capacity: env_or("SENSORHUB_QUEUE_CAPACITY", defaults.queue_capacity).max(1),
            statistics_window: env_or("SENSORHUB_STATS_WINDOW", defaults.statistics_window)
                .max(1),
            thresholds: defaults.thresholds,
            persistence,
        }
    }

    pub fn with_collection_interval(mut self, interval: Duration) -> Self {
        self.collection_interval = interval.max(MIN_COLLECTION_INTERVAL);
        self
    }

    pub fn with_dequeue_timeout(mut self, timeout: Duration) -> Self {
        self.dequeue_timeout = timeout;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_statistics_window(mut self, window: usize) -> Self {
        self.statistics_window = window.max(1);
        self
    }

    pub fn with_persistence(mut self, persistence: PersistenceConfig) -> Self {
        self.persistence = persistence;
        self
    }
}

/// A device to register at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSpec {
    pub device_id: String,
    pub location: String,
}

impl DeviceSpec {
    pub fn new(device_id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            location: location.into(),
        }
    }
}

/// Devices registered when none are configured
pub fn default_devices() -> Vec<DeviceSpec> {
    vec![
        DeviceSpec::new("SENSOR-001", "Living Room"),
        DeviceSpec::new("SENSOR-002", "Bedroom"),
        DeviceSpec::new("SENSOR-003", "Kitchen"),
    ]
}

/// Parse `id:location,id:location`. Entries without a location or with an
/// empty id are skipped.
pub fn parse_devices(list: &str) -> Vec<DeviceSpec> {
    list.split(',')
        .filter_map(|entry| {
            let (id, location) = entry.split_once(':')?;
            let id = id.trim();
            if id.is_empty() {
                return None;
            }
            Some(DeviceSpec::new(id, location.trim()))
        })
        .collect()
}

/// Devices from SENSORHUB_DEVICES, or the defaults
pub fn devices_from_env() -> Vec<DeviceSpec> {
    std::env::var("SENSORHUB_DEVICES")
        .ok()
        .map(|s| parse_devices(&s))
        .filter(|devices| !devices.is_empty())
        .unwrap_or_else(default_devices)
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Milliseconds from `key`; zero counts as unset
fn env_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(default)
}
