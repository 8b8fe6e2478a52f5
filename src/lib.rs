//! Sensorhub: Simulated Environmental Sensor Pipeline
//!
//! A small fleet of simulated temperature/humidity sensors feeding a bounded
//! queue into a persistence and alerting pipeline.
//!
//! # Features
//!
//! - **Device Simulation**: Readings drawn around fixed baselines
//! - **Bounded Queue**: Collector blocks on a full queue instead of dropping data
//! - **Threshold Alerts**: High/low temperature and humidity checks
//! - **Durable Storage**: Append-only logs that survive restarts
//! - **Statistics**: Mean/min/max over a device's recent readings
//!
//! # Example
//!
//! ```no_run
//! use sensorhub::{ConsoleReporter, Hub, HubConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut hub = Hub::open(HubConfig::default(), Arc::new(ConsoleReporter::new()))?;
//! hub.register_device("SENSOR-001", "Living Room")?;
//!
//! // Runs until Ctrl+C
//! hub.run().await?;
//!
//! hub.get_statistics("SENSOR-001")?;
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod config;
pub mod data;
pub mod hub;
pub mod report;
pub mod sensor;
pub mod storage;

// Re-export commonly used types
pub use alerts::{AlertEvaluator, Thresholds};
pub use config::HubConfig;
pub use data::{Alert, AlertType, Reading};
pub use hub::{DeviceStatistics, Hub, HubError, HubState};
pub use report::{ConsoleReporter, Reporter};
pub use sensor::SensorSimulator;
pub use storage::{Persistence, PersistenceConfig, SensorStore, StorageError};
