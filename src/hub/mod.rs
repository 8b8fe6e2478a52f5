//! Pipeline coordinator
//!
//! A [`Hub`] owns the device registry and, once started, two tasks sharing a
//! bounded queue:
//!
//! - the [`Collector`] samples every device each interval and enqueues the
//!   readings, blocking when the queue is full
//! - the [`Processor`] drains the queue, persisting each reading and the
//!   alerts it raises
//!
//! Both tasks watch a shared running flag. Stopping clears it and gives the
//! tasks a grace period to exit. Readings still queued at that point are
//! dropped.

pub mod collector;
pub mod processor;
pub mod statistics;

#[cfg(test)]
pub(crate) mod testing;

pub use collector::Collector;
pub use processor::Processor;
pub use statistics::{DeviceStatistics, PipelineSnapshot, PipelineStats, Summary};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::alerts::AlertEvaluator;
use crate::config::HubConfig;
use crate::report::Reporter;
use crate::sensor::SensorSimulator;
use crate::storage::{Persistence, SensorStore, StorageError};

/// Lifecycle of a hub. A stopped hub cannot be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    Created,
    Running,
    Stopped,
}

impl fmt::Display for HubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HubState::Created => "created",
            HubState::Running => "running",
            HubState::Stopped => "stopped",
        })
    }
}

/// Sensor hub: device registry plus the collection/processing pipeline
pub struct Hub {
    config: HubConfig,
    store: Arc<dyn Persistence>,
    reporter: Arc<dyn Reporter>,
    evaluator: AlertEvaluator,
    devices: Vec<SensorSimulator>,
    state: HubState,
    stats: Arc<PipelineStats>,
    running: Option<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Hub {
    pub fn new(
        config: HubConfig,
        store: Arc<dyn Persistence>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let evaluator = AlertEvaluator::new(config.thresholds);

        Self {
            config,
            store,
            reporter,
            evaluator,
            devices: Vec::new(),
            state: HubState::Created,
            stats: Arc::new(PipelineStats::default()),
            running: None,
            tasks: Vec::new(),
        }
    }

    /// Create a hub backed by a [`SensorStore`] in the configured data dir
    pub fn open(config: HubConfig, reporter: Arc<dyn Reporter>) -> Result<Self, HubError> {
        let store = Arc::new(SensorStore::open(config.persistence.clone())?);
        Ok(Self::new(config, store, reporter))
    }

    /// Register a simulated device with default baselines
    pub fn register_device(
        &mut self,
        device_id: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<(), HubError> {
        self.register(SensorSimulator::new(device_id, location))
    }

    /// Register a pre-configured simulator.
    ///
    /// Only allowed before `start`; the registry is frozen once running.
    /// Registering an id twice is an error, the first registration stays.
    pub fn register(&mut self, device: SensorSimulator) -> Result<(), HubError> {
        if self.state != HubState::Created {
            return Err(HubError::InvalidState {
                operation: "register_device",
                state: self.state,
            });
        }
        if self.devices.iter().any(|d| d.device_id() == device.device_id()) {
            return Err(HubError::DuplicateDevice(device.device_id().to_string()));
        }

        self.reporter
            .device_registered(device.device_id(), device.location());
        self.devices.push(device);
        Ok(())
    }

    /// Spawn the collector and processor.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> Result<(), HubError> {
        if self.state != HubState::Created {
            return Err(HubError::InvalidState {
                operation: "start",
                state: self.state,
            });
        }

        tracing::info!(
            devices = self.devices.len(),
            queue_capacity = self.config.queue_capacity,
            "Starting sensor hub"
        );

        let (queue_tx, queue_rx) = mpsc::channel(self.config.queue_capacity.max(1));
        let (running_tx, running_rx) = watch::channel(true);

        let devices: Arc<[SensorSimulator]> = self.devices.clone().into();
        let collector = Collector::new(
            devices,
            self.config.collection_interval,
            Arc::clone(&self.stats),
        );
        let processor = Processor::new(
            Arc::clone(&self.store),
            self.evaluator.clone(),
            Arc::clone(&self.reporter),
            Arc::clone(&self.stats),
            self.config.dequeue_timeout,
        );

        self.tasks.push(tokio::spawn(collector.run(queue_tx, running_rx.clone())));
        self.tasks.push(tokio::spawn(processor.run(queue_rx, running_rx)));
        self.running = Some(running_tx);
        self.state = HubState::Running;

        self.reporter.hub_started();
        Ok(())
    }

    /// Clear the running flag and wait up to the grace period for both tasks.
    ///
    /// Tasks still busy after the grace period are aborted. Readings left in
    /// the queue are not processed. Calling `stop` again is a no-op.
    pub async fn stop(&mut self) {
        match self.state {
            HubState::Stopped => return,
            HubState::Created => {
                self.state = HubState::Stopped;
                return;
            }
            HubState::Running => {}
        }

        tracing::info!("Stopping sensor hub");
        if let Some(running) = self.running.take() {
            let _ = running.send(false);
        }

        let mut tasks = std::mem::take(&mut self.tasks);
        let drained = tokio::time::timeout(self.config.shutdown_grace, async {
            for task in tasks.iter_mut() {
                if let Err(e) = task.await {
                    tracing::error!(error = %e, "Pipeline task failed");
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                "Pipeline did not stop within {:?}, aborting",
                self.config.shutdown_grace
            );
            for task in &tasks {
                task.abort();
            }
        }

        self.state = HubState::Stopped;
        let snapshot = self.stats.snapshot();
        tracing::info!(
            collected = snapshot.readings_collected,
            persisted = snapshot.readings_persisted,
            alerts = snapshot.alerts_persisted,
            errors = snapshot.processing_errors,
            "Sensor hub stopped"
        );
        self.reporter.hub_stopped();
    }

    /// Start, wait for `shutdown` to resolve, then stop
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), HubError>
    where
        F: Future<Output = ()>,
    {
        self.start()?;
        shutdown.await;
        tracing::info!("Shutdown signal received");
        self.stop().await;
        Ok(())
    }

    /// Start and run until Ctrl+C
    pub async fn run(&mut self) -> Result<(), HubError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await
    }

    /// Statistics over the device's most recent readings.
    ///
    /// Returns `Ok(None)` when the device has no stored readings. The outcome
    /// is also passed to the reporter.
    pub fn get_statistics(
        &self,
        device_id: &str,
    ) -> Result<Option<DeviceStatistics>, StorageError> {
        let window = self.config.statistics_window.max(1);
        let readings = self.store.latest_readings(device_id, window)?;
        let stats = DeviceStatistics::from_readings(device_id, &readings);

        self.reporter.statistics(device_id, stats.as_ref());
        Ok(stats)
    }

    pub fn state(&self) -> HubState {
        self.state
    }

    pub fn devices(&self) -> &[SensorSimulator] {
        &self.devices
    }

    pub fn store(&self) -> &Arc<dyn Persistence> {
        &self.store
    }

    pub fn pipeline_stats(&self) -> PipelineSnapshot {
        self.stats.snapshot()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Device '{0}' is already registered")]
    DuplicateDevice(String),

    #[error("Cannot {operation} while hub is {state}")]
    InvalidState {
        operation: &'static str,
        state: HubState,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

fn is_running(running: &watch::Receiver<bool>) -> bool {
    *running.borrow()
}

/// Resolves once the flag is cleared or the hub has gone away
async fn stopped(running: &mut watch::Receiver<bool>) {
    let _ = running.wait_for(|r| !*r).await;
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingReporter;
    use super::*;
    use crate::data::{AlertType, Reading};
    use crate::sensor::{Baseline, Variation};
    use crate::storage::PersistenceConfig;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> HubConfig {
        HubConfig::default()
            .with_collection_interval(Duration::from_millis(20))
            .with_dequeue_timeout(Duration::from_millis(10))
            .with_shutdown_grace(Duration::from_millis(500))
            .with_persistence(PersistenceConfig::new(dir.path()).with_sync_on_write(false))
    }

    fn test_hub(dir: &TempDir) -> (Hub, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::default());
        let hub = Hub::open(test_config(dir), reporter.clone()).unwrap();
        (hub, reporter)
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let (mut hub, reporter) = test_hub(&temp_dir);

        hub.register_device("SENSOR-001", "Living Room").unwrap();
        let err = hub.register_device("SENSOR-001", "Kitchen").unwrap_err();

        assert!(matches!(err, HubError::DuplicateDevice(ref id) if id == "SENSOR-001"));
        assert_eq!(hub.devices().len(), 1);
        assert_eq!(hub.devices()[0].location(), "Living Room");
        assert_eq!(*reporter.registered.lock(), vec!["SENSOR-001".to_string()]);
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let temp_dir = TempDir::new().unwrap();
        let (mut hub, reporter) = test_hub(&temp_dir);
        hub.register_device("SENSOR-001", "Living Room").unwrap();
        assert_eq!(hub.state(), HubState::Created);

        hub.start().unwrap();
        assert_eq!(hub.state(), HubState::Running);

        assert!(matches!(
            hub.start(),
            Err(HubError::InvalidState { state: HubState::Running, .. })
        ));
        assert!(matches!(
            hub.register_device("SENSOR-002", "Bedroom"),
            Err(HubError::InvalidState { .. })
        ));

        hub.stop().await;
        assert_eq!(hub.state(), HubState::Stopped);
        hub.stop().await;
        assert_eq!(reporter.stopped.load(std::sync::atomic::Ordering::SeqCst), 1);

        assert!(matches!(
            hub.start(),
            Err(HubError::InvalidState { state: HubState::Stopped, .. })
        ));
    }

    #[tokio::test]
    async fn test_stop_before_start_is_terminal() {
        let temp_dir = TempDir::new().unwrap();
        let (mut hub, _) = test_hub(&temp_dir);

        hub.stop().await;
        assert_eq!(hub.state(), HubState::Stopped);
        assert!(hub.start().is_err());
    }

    #[tokio::test]
    async fn test_pipeline_persists_collected_readings() {
        let temp_dir = TempDir::new().unwrap();
        let (mut hub, reporter) = test_hub(&temp_dir);
        let devices = [
            ("SENSOR-001", "Living Room"),
            ("SENSOR-002", "Bedroom"),
            ("SENSOR-003", "Kitchen"),
        ];
        for (id, location) in devices {
            hub.register_device(id, location).unwrap();
        }

        hub.start().unwrap();
        let stats = Arc::clone(&hub.stats);
        wait_for(|| stats.snapshot().readings_persisted >= 9).await;
        hub.stop().await;

        let snapshot = hub.pipeline_stats();
        assert!(snapshot.readings_collected >= snapshot.readings_persisted);
        assert_eq!(snapshot.processing_errors, 0);

        let mut stored = 0;
        for device in hub.devices() {
            let count = hub.store().reading_count(device.device_id()).unwrap();
            assert!(count >= 1, "{} has no readings", device.device_id());
            stored += count;
        }
        assert_eq!(stored as u64, snapshot.readings_persisted);
        assert_eq!(reporter.processed.lock().len() as u64, snapshot.readings_persisted);
    }

    #[tokio::test]
    async fn test_forced_temperature_raises_high_temperature_alert() {
        let temp_dir = TempDir::new().unwrap();
        let (mut hub, _) = test_hub(&temp_dir);

        let hot = SensorSimulator::new("SENSOR-001", "Living Room")
            .with_baseline(Baseline {
                temperature: 30.5,
                humidity: 50.0,
            })
            .with_variation(Variation::none());
        hub.register(hot).unwrap();

        hub.start().unwrap();
        let store = Arc::clone(hub.store());
        wait_for(|| store.alert_count("SENSOR-001").unwrap() >= 1).await;
        hub.stop().await;

        let alerts = store.alerts_for("SENSOR-001", 100).unwrap();
        assert!(!alerts.is_empty());
        for alert in &alerts {
            assert_eq!(alert.alert_type, AlertType::HighTemperature);
            assert_eq!(alert.value, 30.5);
        }
        // One alert per reading, each matching a stored reading
        let readings = store.latest_readings("SENSOR-001", 100).unwrap();
        assert_eq!(alerts.len(), readings.len());
        for alert in &alerts {
            assert!(readings.iter().any(|r| r.timestamp == alert.timestamp));
        }
    }

    #[tokio::test]
    async fn test_run_until_signal() {
        let temp_dir = TempDir::new().unwrap();
        let (mut hub, reporter) = test_hub(&temp_dir);
        hub.register_device("SENSOR-001", "Living Room").unwrap();

        hub.run_until(tokio::time::sleep(Duration::from_millis(100)))
            .await
            .unwrap();

        assert_eq!(hub.state(), HubState::Stopped);
        assert_eq!(reporter.started.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(reporter.stopped.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(hub.store().reading_count("SENSOR-001").unwrap() >= 1);
    }

    #[test]
    fn test_statistics_without_data() {
        let temp_dir = TempDir::new().unwrap();
        let (hub, reporter) = test_hub(&temp_dir);

        assert!(hub.get_statistics("SENSOR-404").unwrap().is_none());

        let reported = reporter.statistics.lock();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].0, "SENSOR-404");
        assert!(reported[0].1.is_none());
    }

    #[test]
    fn test_statistics_cover_latest_window() {
        let temp_dir = TempDir::new().unwrap();
        let (hub, reporter) = test_hub(&temp_dir);
        let base = chrono::Utc::now();

        // 150 readings; only the newest 100 (temperatures 50..150) count
        for i in 0..150 {
            let humidity = 40.0 + (i % 2) as f64 * 10.0;
            let reading = Reading::new("SENSOR-001", "Lab", i as f64, humidity)
                .with_timestamp(base + chrono::Duration::seconds(i));
            hub.store().save_reading(&reading).unwrap();
        }

        let stats = hub.get_statistics("SENSOR-001").unwrap().unwrap();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.temperature.min, 50.0);
        assert_eq!(stats.temperature.max, 149.0);
        assert_eq!(stats.temperature.mean, 99.5);
        assert_eq!(stats.humidity.min, 40.0);
        assert_eq!(stats.humidity.max, 50.0);
        assert_eq!(stats.humidity.mean, 45.0);

        assert_eq!(reporter.statistics.lock()[0].1.as_ref(), Some(&stats));
    }

    #[test]
    fn test_zero_statistics_window_still_reports_data() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        config.statistics_window = 0;
        let hub = Hub::open(config, Arc::new(RecordingReporter::default())).unwrap();

        let reading = Reading::new("SENSOR-001", "Lab", 21.5, 48.0);
        hub.store().save_reading(&reading).unwrap();

        let stats = hub.get_statistics("SENSOR-001").unwrap().unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.temperature.mean, 21.5);
    }
}
