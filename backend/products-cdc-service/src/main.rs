//! products-cdc-service - prints Debezium change events for the products table
//!
//! Environment variables (all optional):
//! - CDC_BROKERS: Kafka bootstrap servers (default: "localhost:29092")
//! - CDC_GROUP_ID: Consumer group ID (default: "debezium-go-consumer")
//! - CDC_TOPICS: Comma-separated topics (default: "pgdemo.public.products")
//! - CDC_AUTO_OFFSET_RESET: "earliest" or "latest" (default: "earliest")
//! - CDC_POLL_TIMEOUT_MS: Poll timeout in milliseconds (default: 100)
//! - CDC_LOG_RAW_MESSAGES: Log raw message bodies (default: true)
//! - CDC_LOG_JSON: JSON log output (default: false)

use anyhow::{Context, Result};
use products_cdc_service::logging::init_tracing;
use products_cdc_service::services::cdc::{CdcConsumer, KafkaSource};
use products_cdc_service::ConsumerConfig;
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConsumerConfig::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_json);

    info!("Starting products-cdc-service");

    let source = KafkaSource::open(&config).context("Failed to open Kafka source")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    println!("Listening to topic: {}", config.topic_list().join(", "));
    println!("Press Ctrl+C to exit.");

    let mut consumer = CdcConsumer::new(source, std::io::stdout(), shutdown_rx)
        .with_poll_timeout(config.poll_timeout())
        .with_raw_logging(config.log_raw_messages);

    let stats = consumer.run().await.context("CDC consumer failed")?;

    println!("Closing consumer");
    info!(
        processed = stats.processed,
        failed = stats.failed,
        skipped = stats.skipped,
        decimal_fallbacks = stats.decimal_fallbacks,
        "products-cdc-service stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C signal"),
            _ = terminate.recv() => info!("Received SIGTERM signal"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C signal");
    }
}
