//! Queue draining: persist, evaluate, report

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::{task, time};

use super::is_running;
use super::statistics::PipelineStats;
use crate::alerts::AlertEvaluator;
use crate::data::{Alert, Reading};
use crate::report::Reporter;
use crate::storage::{Persistence, StorageError};

/// Single writer between the queue and storage
pub struct Processor {
    store: Arc<dyn Persistence>,
    evaluator: AlertEvaluator,
    reporter: Arc<dyn Reporter>,
    stats: Arc<PipelineStats>,
    dequeue_timeout: Duration,
}

impl Processor {
    pub fn new(
        store: Arc<dyn Persistence>,
        evaluator: AlertEvaluator,
        reporter: Arc<dyn Reporter>,
        stats: Arc<PipelineStats>,
        dequeue_timeout: Duration,
    ) -> Self {
        Self {
            store,
            evaluator,
            reporter,
            stats,
            dequeue_timeout,
        }
    }

    /// Drain the queue until the running flag clears or every sender is gone.
    ///
    /// Waits at most `dequeue_timeout` per dequeue so the flag is re-checked
    /// even when no readings arrive.
    ///
    /// Storage writes run on the blocking pool, one reading at a time, so
    /// processing order stays queue order.
    pub async fn run(self, mut queue: mpsc::Receiver<Reading>, running: watch::Receiver<bool>) {
        tracing::info!("Processor started");
        let dequeue_timeout = self.dequeue_timeout;
        let processor = Arc::new(self);

        while is_running(&running) {
            let reading = match time::timeout(dequeue_timeout, queue.recv()).await {
                Ok(Some(reading)) => reading,
                Ok(None) => break,
                Err(_) => continue,
            };

            let worker = Arc::clone(&processor);
            if let Err(e) = task::spawn_blocking(move || worker.handle(&reading)).await {
                tracing::error!(error = %e, "Reading handler panicked");
            }
        }

        tracing::info!("Processor stopped");
    }

    /// Process one reading and report the outcome. Failures are reported and
    /// swallowed; the failed reading is not retried.
    pub fn handle(&self, reading: &Reading) {
        match self.process(reading) {
            Ok(alerts) => self.reporter.reading_processed(reading, &alerts),
            Err(e) => {
                self.stats.record_error();
                self.reporter.processing_failed(reading, &e);
            }
        }
    }

    /// Persist the reading, then each alert it raises, in order.
    ///
    /// Alerts are only evaluated once the reading is stored, so every stored
    /// alert has a stored reading behind it. The first failing write stops
    /// processing of this reading.
    pub fn process(&self, reading: &Reading) -> Result<Vec<Alert>, StorageError> {
        self.store.save_reading(reading)?;
        self.stats.record_reading_persisted();

        let alerts = self.evaluator.evaluate(reading);
        for alert in &alerts {
            self.store.save_alert(alert)?;
            self.stats.record_alert_persisted();
        }

        Ok(alerts)
    }
}
