/// Prometheus metrics for the CDC consumer
use prometheus::{IntCounter, IntCounterVec, Opts};

/// Metrics for CDC consumer monitoring
#[derive(Clone)]
pub struct CdcConsumerMetrics {
    /// Total number of Kafka consumer errors
    pub consumer_errors_total: IntCounter,
    /// Total messages successfully interpreted and rendered
    pub messages_processed_total: IntCounter,
    /// Total messages that failed interpretation (label: reason)
    pub messages_failed_total: IntCounterVec,
    /// Total empty messages (tombstones) skipped
    pub messages_skipped_total: IntCounter,
    /// Prices that fell back to zero because the encoded decimal was unreadable
    pub decimal_fallbacks_total: IntCounter,
    /// Interpreted events (label: operation)
    pub events_total: IntCounterVec,
}

impl CdcConsumerMetrics {
    pub fn new() -> Self {
        let registry = prometheus::default_registry();

        let consumer_errors_total = IntCounter::new(
            "cdc_consumer_errors_total",
            "Total number of Kafka consumer errors encountered",
        )
        .expect("valid metric for cdc_consumer_errors_total");

        let messages_processed_total = IntCounter::new(
            "cdc_messages_processed_total",
            "Total number of CDC messages successfully processed",
        )
        .expect("valid metric for cdc_messages_processed_total");

        let messages_failed_total = IntCounterVec::new(
            Opts::new(
                "cdc_messages_failed_total",
                "Total number of CDC messages that failed processing",
            ),
            &["reason"],
        )
        .expect("valid metric for cdc_messages_failed_total");

        let messages_skipped_total = IntCounter::new(
            "cdc_messages_skipped_total",
            "Total number of empty CDC messages skipped",
        )
        .expect("valid metric for cdc_messages_skipped_total");

        let decimal_fallbacks_total = IntCounter::new(
            "cdc_decimal_fallbacks_total",
            "Total number of decimal values replaced by zero after a decode failure",
        )
        .expect("valid metric for cdc_decimal_fallbacks_total");

        let events_total = IntCounterVec::new(
            Opts::new("cdc_events_total", "Total number of CDC events by operation"),
            &["operation"],
        )
        .expect("valid metric for cdc_events_total");

        // Registration fails once per process after the first consumer; the counters still work
        for metric in [
            Box::new(consumer_errors_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(messages_processed_total.clone()),
            Box::new(messages_failed_total.clone()),
            Box::new(messages_skipped_total.clone()),
            Box::new(decimal_fallbacks_total.clone()),
            Box::new(events_total.clone()),
        ] {
            let _ = registry.register(metric);
        }

        Self {
            consumer_errors_total,
            messages_processed_total,
            messages_failed_total,
            messages_skipped_total,
            decimal_fallbacks_total,
            events_total,
        }
    }
}

impl Default for CdcConsumerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
