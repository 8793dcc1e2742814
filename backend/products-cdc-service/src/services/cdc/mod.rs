/// CDC (Change Data Capture) consumer for the `products` table
///
/// Consumes Debezium change events from Kafka and prints a one-line summary
/// per create/update/read/delete.
///
/// # Architecture
/// - **Decimal**: exact decoding of Debezium variable-scale decimals
/// - **Models**: typed change events
/// - **Interpreter**: untyped Debezium JSON to typed events
/// - **Render**: summary lines
/// - **Source**: message sources (Kafka, replay)
/// - **Consumer**: poll loop with graceful shutdown
pub mod consumer;
pub mod decimal;
pub mod interpreter;
pub mod models;
pub mod render;
pub mod source;

pub use consumer::{CdcConsumer, ConsumerStats, MessageOutcome};
pub use decimal::{decode_decimal, try_decode_decimal, DecimalDecodeError, ExactDecimal};
pub use interpreter::{interpret, interpret_bytes};
pub use models::{CdcSource, ChangeEvent, DecimalField, Operation, ProductRow, RowChange, RowKey};
pub use source::{InboundMessage, KafkaSource, MessageSource, Polled, ReplaySource};
