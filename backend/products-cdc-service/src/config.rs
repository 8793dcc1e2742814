/// Configuration management
use serde::Deserialize;
use std::time::Duration;

use crate::error::{CdcError, Result};

const ENV_PREFIX: &str = "CDC_";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConsumerConfig {
    /// Kafka brokers (comma-separated)
    #[serde(default = "default_brokers")]
    pub brokers: String,

    /// Consumer group ID
    #[serde(default = "default_group_id")]
    pub group_id: String,

    /// Debezium topics to consume
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,

    /// Where to start when the group has no committed offset: earliest | latest
    #[serde(default = "default_auto_offset_reset")]
    pub auto_offset_reset: String,

    /// Upper bound on a single poll, so shutdown is noticed promptly
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Log every raw message body at info level
    #[serde(default = "default_true")]
    pub log_raw_messages: bool,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
}

fn default_brokers() -> String {
    "localhost:29092".to_string()
}

fn default_group_id() -> String {
    "debezium-go-consumer".to_string()
}

fn default_topics() -> Vec<String> {
    vec!["pgdemo.public.products".to_string()]
}

fn default_auto_offset_reset() -> String {
    "earliest".to_string()
}

fn default_poll_timeout_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: default_brokers(),
            group_id: default_group_id(),
            topics: default_topics(),
            auto_offset_reset: default_auto_offset_reset(),
            poll_timeout_ms: default_poll_timeout_ms(),
            log_raw_messages: true,
            log_json: false,
        }
    }
}

impl ConsumerConfig {
    /// Load from `CDC_*` environment variables (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config: Self = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.brokers.trim().is_empty() {
            return Err(CdcError::Config("CDC_BROKERS must not be empty".to_string()));
        }
        if self.group_id.trim().is_empty() {
            return Err(CdcError::Config("CDC_GROUP_ID must not be empty".to_string()));
        }
        if self.topics.iter().all(|t| t.trim().is_empty()) {
            return Err(CdcError::Config(
                "CDC_TOPICS must name at least one topic".to_string(),
            ));
        }
        if !matches!(self.auto_offset_reset.as_str(), "earliest" | "latest") {
            return Err(CdcError::Config(format!(
                "CDC_AUTO_OFFSET_RESET must be 'earliest' or 'latest', got '{}'",
                self.auto_offset_reset
            )));
        }
        if self.poll_timeout_ms == 0 {
            return Err(CdcError::Config(
                "CDC_POLL_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Topic names with surrounding whitespace and empty entries removed
    pub fn topic_list(&self) -> Vec<&str> {
        self.topics
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}
