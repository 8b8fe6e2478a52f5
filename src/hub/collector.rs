//! Periodic sampling of every registered device

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};

use super::statistics::PipelineStats;
use super::{is_running, stopped};
use crate::config::MIN_COLLECTION_INTERVAL;
use crate::data::Reading;
use crate::sensor::SensorSimulator;

/// Samples all devices once per interval and queues the readings.
///
/// Devices are sampled in registration order, which becomes the processing
/// order. A full queue blocks the collector rather than dropping readings.
pub struct Collector {
    devices: Arc<[SensorSimulator]>,
    interval: Duration,
    stats: Arc<PipelineStats>,
}

impl Collector {
    pub fn new(
        devices: Arc<[SensorSimulator]>,
        interval: Duration,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            devices,
            interval: interval.max(MIN_COLLECTION_INTERVAL),
            stats,
        }
    }

    /// Run until the running flag clears or the queue closes
    pub async fn run(self, queue: mpsc::Sender<Reading>, mut running: watch::Receiver<bool>) {
        tracing::info!(
            devices = self.devices.len(),
            "Collector started with interval {:?}",
            self.interval
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        'rounds: while is_running(&running) {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stopped(&mut running) => break,
            }

            for device in self.devices.iter() {
                let reading = device.sample();

                tokio::select! {
                    sent = queue.send(reading) => {
                        if sent.is_err() {
                            tracing::warn!("Reading queue closed, collector exiting");
                            break 'rounds;
                        }
                        self.stats.record_collected();
                    }
                    _ = stopped(&mut running) => break 'rounds,
                }
            }

            tracing::debug!(devices = self.devices.len(), "Collection round complete");
        }

        tracing::info!("Collector stopped");
    }
}
