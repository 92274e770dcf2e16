// ============================================================================
// Notification Worker
// ============================================================================
//
// Long-lived consumer of the durable `user_created_queue`. Receives one
// message at a time, dispatches a (simulated) welcome notification, and
// acknowledges after processing. On a lost broker connection it waits a
// fixed delay and exits non-zero; the process supervisor restarts it.
//
// ============================================================================

use anyhow::Result;
use portico::config::Config;
use portico::events::{EventConsumer, WelcomeEmailSimulator};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Notification Worker Starting ===");
    info!("Broker: {}:{}", config.broker.host, config.broker.port);
    info!("Queue: {}", config.broker.queue_name);

    let consumer = EventConsumer::new(config.broker.clone(), Arc::new(WelcomeEmailSimulator));

    // Returns only on a fatal connection-level error.
    let err = consumer.run().await;

    error!(error = %err, "Consumer stopped");
    info!(
        delay_secs = config.broker.reconnect_delay_secs,
        "Backing off before exit; supervisor will restart the worker"
    );
    tokio::time::sleep(Duration::from_secs(config.broker.reconnect_delay_secs)).await;

    anyhow::bail!("notification worker terminated: {err}")
}
