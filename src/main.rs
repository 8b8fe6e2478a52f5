//! Sensorhub
//!
//! Run with: cargo run
//!
//! Configuration comes from the environment, see [`sensorhub::config`].
//! RUST_LOG sets the log level (default: sensorhub=info).

use std::sync::Arc;

use sensorhub::config::devices_from_env;
use sensorhub::{ConsoleReporter, Hub, HubConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensorhub=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HubConfig::from_env();

    tracing::info!("Sensorhub configuration:");
    tracing::info!("  Data dir: {}", config.persistence.data_dir.display());
    tracing::info!("  Collection interval: {:?}", config.collection_interval);
    tracing::info!("  Dequeue timeout: {:?}", config.dequeue_timeout);
    tracing::info!("  Shutdown grace: {:?}", config.shutdown_grace);
    tracing::info!("  Queue capacity: {}", config.queue_capacity);

    let reporter = Arc::new(ConsoleReporter::new());
    let mut hub = Hub::open(config, reporter)?;

    for device in devices_from_env() {
        hub.register_device(device.device_id, device.location)?;
    }

    println!("\nStarting sensor hub v{}...", env!("CARGO_PKG_VERSION"));
    hub.run().await?;

    let ids: Vec<String> = hub
        .devices()
        .iter()
        .map(|d| d.device_id().to_string())
        .collect();
    for id in ids {
        hub.get_statistics(&id)?;
    }

    Ok(())
}
