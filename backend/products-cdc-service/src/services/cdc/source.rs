//! Message sources feeding the CDC consumer
//!
//! The broker connection is a collaborator with an explicit lifecycle:
//! open it, poll it with a timeout until shutdown, then close it.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use tracing::{error, info};

use crate::config::ConsumerConfig;
use crate::error::{CdcError, Result};

/// A fully received message body plus its stream position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// `None` for tombstones
    pub payload: Option<Vec<u8>>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, offset: i64, payload: Option<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            partition: 0,
            offset,
            payload,
        }
    }
}

/// Outcome of one poll
#[derive(Debug)]
pub enum Polled {
    Message(InboundMessage),
    /// Nothing arrived within the timeout
    Timeout,
    /// The source will never yield another message
    Exhausted,
}

#[async_trait]
pub trait MessageSource: Send {
    /// Wait at most `timeout` for the next message.
    async fn next_message(&mut self, timeout: Duration) -> Result<Polled>;

    /// Release the underlying connection. Called once, after the last poll.
    async fn close(&mut self) -> Result<()>;
}

/// Kafka-backed source
pub struct KafkaSource {
    consumer: StreamConsumer,
}

impl KafkaSource {
    /// Create the consumer and subscribe to the configured topics
    pub fn open(config: &ConsumerConfig) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| {
                error!("Failed to create Kafka consumer: {}", e);
                CdcError::Kafka(e)
            })?;

        let topics = config.topic_list();
        consumer.subscribe(&topics).map_err(|e| {
            error!("Failed to subscribe to topics: {}", e);
            CdcError::Kafka(e)
        })?;

        info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            topics = ?topics,
            "Kafka source opened"
        );

        Ok(Self { consumer })
    }
}

#[async_trait]
impl MessageSource for KafkaSource {
    async fn next_message(&mut self, timeout: Duration) -> Result<Polled> {
        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_) => Ok(Polled::Timeout),
            Ok(Err(e)) => Err(CdcError::Kafka(e)),
            Ok(Ok(msg)) => Ok(Polled::Message(InboundMessage {
                topic: msg.topic().to_string(),
                partition: msg.partition(),
                offset: msg.offset(),
                payload: msg.payload().map(<[u8]>::to_vec),
            })),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.consumer.unsubscribe();
        info!("Kafka source closed");
        Ok(())
    }
}

/// Replays a fixed sequence of messages, then reports exhaustion.
///
/// Handy for feeding captured Debezium output through the consumer offline.
#[derive(Debug, Default)]
pub struct ReplaySource {
    messages: VecDeque<InboundMessage>,
    closed: bool,
}

impl ReplaySource {
    pub fn new(messages: impl IntoIterator<Item = InboundMessage>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
            closed: false,
        }
    }

    /// Build from raw bodies on a single topic, numbering offsets from zero
    pub fn from_payloads<I, P>(topic: &str, payloads: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        Self::new(
            payloads
                .into_iter()
                .enumerate()
                .map(|(offset, body)| InboundMessage::new(topic, offset as i64, Some(body.into()))),
        )
    }

    pub fn push(&mut self, message: InboundMessage) {
        self.messages.push_back(message);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl MessageSource for ReplaySource {
    async fn next_message(&mut self, _timeout: Duration) -> Result<Polled> {
        Ok(match self.messages.pop_front() {
            Some(msg) => Polled::Message(msg),
            None => Polled::Exhausted,
        })
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
