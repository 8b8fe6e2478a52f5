//! Print statistics from an existing data directory
//!
//! Usage: sensorhub_stats [DEVICE_ID...]
//!
//! With no arguments, reports every device that has stored readings.
//! SENSORHUB_DATA_DIR selects the store (default: ./sensorhub_data).

use std::sync::Arc;

use sensorhub::{ConsoleReporter, Hub, HubConfig, Persistence, SensorStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensorhub=warn".into()),
        )
        .init();

    let config = HubConfig::from_env();
    let store = Arc::new(SensorStore::open(config.persistence.clone())?);

    let mut device_ids: Vec<String> = std::env::args().skip(1).collect();
    if device_ids.is_empty() {
        device_ids = store.device_ids();
    }
    if device_ids.is_empty() {
        println!(
            "No readings stored in {}",
            config.persistence.data_dir.display()
        );
        return Ok(());
    }

    let hub = Hub::new(config, store.clone(), Arc::new(ConsoleReporter::new()));
    for id in &device_ids {
        hub.get_statistics(id)?;
        let alerts = store.alert_count(id)?;
        if alerts > 0 {
            println!("   Alerts recorded: {}", alerts);
            for alert in store.alerts_for(id, 5)? {
                println!(
                    "     {} {} {}",
                    alert.timestamp.to_rfc3339(),
                    alert.alert_type,
                    alert.message
                );
            }
        }
    }

    Ok(())
}
