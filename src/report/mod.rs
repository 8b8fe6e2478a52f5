//! Reporting of pipeline activity
//!
//! The hub never prints directly. Everything user-facing goes through a
//! [`Reporter`], which keeps output formatting out of the pipeline.

pub mod console;

pub use console::ConsoleReporter;

use crate::data::{Alert, Reading};
use crate::hub::DeviceStatistics;
use crate::storage::StorageError;

/// Receiver for hub lifecycle events and processing outcomes
pub trait Reporter: Send + Sync {
    fn device_registered(&self, device_id: &str, location: &str);

    fn hub_started(&self);

    fn hub_stopped(&self);

    /// A reading was persisted together with the alerts it raised
    fn reading_processed(&self, reading: &Reading, alerts: &[Alert]);

    /// Processing of one reading failed; the pipeline keeps going
    fn processing_failed(&self, reading: &Reading, error: &StorageError);

    /// Statistics query outcome; `None` means no data for the device
    fn statistics(&self, device_id: &str, stats: Option<&DeviceStatistics>);
}
