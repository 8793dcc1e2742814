use thiserror::Error;

use crate::services::cdc::Operation;

pub type Result<T> = std::result::Result<T, CdcError>;

/// Errors raised while consuming and interpreting CDC events.
///
/// Everything except `Config` and `Io` is scoped to a single message: the
/// consumer logs it and moves on to the next one.
#[derive(Debug, Error)]
pub enum CdcError {
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Missing '{field}' snapshot for {op:?} operation")]
    MissingSnapshot { op: Operation, field: &'static str },

    #[error("Malformed field '{field}': {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CdcError {
    /// Short label used for the `reason` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            CdcError::MalformedEvent(_) => "malformed_event",
            CdcError::UnknownOperation(_) => "unknown_operation",
            CdcError::MissingSnapshot { .. } => "missing_snapshot",
            CdcError::MalformedField { .. } => "malformed_field",
            CdcError::InvalidJson(_) => "invalid_json",
            CdcError::Kafka(_) => "kafka",
            CdcError::Config(_) => "config",
            CdcError::Io(_) => "io",
        }
    }
}

impl From<envy::Error> for CdcError {
    fn from(err: envy::Error) -> Self {
        CdcError::Config(err.to_string())
    }
}
