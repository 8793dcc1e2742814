use std::io::Write;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::interpreter::interpret_bytes;
use super::render::render;
use super::source::{InboundMessage, MessageSource, Polled};
use crate::error::{CdcError, Result};
use crate::metrics::CdcConsumerMetrics;

const SEPARATOR: &str =
    "--------------------------------------------------------------------------------";

/// Per-run message counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub processed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub decimal_fallbacks: u64,
    pub source_errors: u64,
}

/// What happened to a single message
#[derive(Debug, PartialEq, Eq)]
pub enum MessageOutcome {
    Rendered,
    SkippedEmpty,
    Rejected(&'static str),
}

/// CDC Consumer
///
/// Pulls Debezium messages from a [`MessageSource`], interprets each one and
/// writes a summary line to `out`. Interpretation errors only drop the message
/// they belong to.
pub struct CdcConsumer<S, W> {
    source: S,
    out: W,
    poll_timeout: Duration,
    log_raw_messages: bool,
    shutdown_rx: watch::Receiver<bool>,
    metrics: CdcConsumerMetrics,
    stats: ConsumerStats,
}

impl<S, W> CdcConsumer<S, W>
where
    S: MessageSource,
    W: Write + Send,
{
    pub fn new(source: S, out: W, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            source,
            out,
            poll_timeout: Duration::from_millis(100),
            log_raw_messages: true,
            shutdown_rx,
            metrics: CdcConsumerMetrics::new(),
            stats: ConsumerStats::default(),
        }
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn with_raw_logging(mut self, enabled: bool) -> Self {
        self.log_raw_messages = enabled;
        self
    }

    pub fn stats(&self) -> ConsumerStats {
        self.stats
    }

    /// Hand back the source and output once the consumer is done
    pub fn into_parts(self) -> (S, W) {
        (self.source, self.out)
    }

    /// Run until shutdown is signalled or the source is exhausted, then close the source.
    pub async fn run(&mut self) -> Result<ConsumerStats> {
        info!("Starting CDC consumer loop");

        let result = self.poll_loop().await;
        if let Err(e) = self.source.close().await {
            warn!(error = %e, "Failed to close message source");
        }

        let stats = self.stats;
        info!(
            processed = stats.processed,
            failed = stats.failed,
            skipped = stats.skipped,
            "CDC consumer stopped"
        );
        result.map(|_| stats)
    }

    async fn poll_loop(&mut self) -> Result<()> {
        loop {
            if *self.shutdown_rx.borrow() {
                info!("Shutdown signal received, stopping consumer");
                return Ok(());
            }

            let polled = tokio::select! {
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() {
                        info!("Shutdown channel closed, stopping consumer");
                        return Ok(());
                    }
                    continue;
                }
                polled = self.source.next_message(self.poll_timeout) => polled,
            };

            match polled {
                Ok(Polled::Message(msg)) => {
                    self.process_message(&msg)?;
                }
                Ok(Polled::Timeout) => {}
                Ok(Polled::Exhausted) => {
                    info!("Message source exhausted");
                    return Ok(());
                }
                Err(e) => {
                    self.stats.source_errors += 1;
                    self.metrics.consumer_errors_total.inc();
                    error!(error = %e, "Kafka consumer error");
                }
            }
        }
    }

    /// Interpret and render one message. Only output failures are returned as errors.
    pub fn process_message(&mut self, msg: &InboundMessage) -> Result<MessageOutcome> {
        debug!(
            topic = %msg.topic,
            partition = msg.partition,
            offset = msg.offset,
            "Received CDC message"
        );

        let body = match msg.payload.as_deref() {
            Some(body) if !body.is_empty() => body,
            _ => {
                debug!(offset = msg.offset, "Skipping empty message");
                self.stats.skipped += 1;
                self.metrics.messages_skipped_total.inc();
                return Ok(MessageOutcome::SkippedEmpty);
            }
        };

        if self.log_raw_messages {
            info!(topic = %msg.topic, offset = msg.offset, "Raw message:\n{}\n{}", String::from_utf8_lossy(body), SEPARATOR);
        }

        let event = match interpret_bytes(body) {
            Ok(event) => event,
            Err(e) => {
                self.stats.failed += 1;
                self.metrics
                    .messages_failed_total
                    .with_label_values(&[e.kind()])
                    .inc();
                warn!(
                    topic = %msg.topic,
                    partition = msg.partition,
                    offset = msg.offset,
                    error = %e,
                    "Skipping CDC message"
                );
                return Ok(MessageOutcome::Rejected(e.kind()));
            }
        };

        if event.change.row().is_some_and(|row| row.exact_price.is_none()) {
            self.stats.decimal_fallbacks += 1;
            self.metrics.decimal_fallbacks_total.inc();
        }

        render(&mut self.out, &event).map_err(CdcError::Io)?;
        self.out.flush()?;

        self.stats.processed += 1;
        self.metrics.messages_processed_total.inc();
        self.metrics
            .events_total
            .with_label_values(&[event.operation().as_str()])
            .inc();

        debug!(
            op = %event.operation(),
            id = event.id(),
            ts_ms = ?event.ts_ms,
            "Rendered CDC event"
        );
        Ok(MessageOutcome::Rendered)
    }
}
