//! Message publishing with exponential-backoff retry.
//!
//! [`ProxyProducer`] writes messages to a topic through the queue proxy.
//! Failed attempts are retried up to three times with exponential backoff
//! (1 s, 2 s, 4 s).

use std::time::Duration;

use async_trait::async_trait;

use crate::message::Message;
use crate::proxy::{ProxyClient, QueueError};

/// Retry delays (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// Destination for mapped messages.
#[async_trait]
pub trait MessageProducer: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), QueueError>;
}

/// Something whose reachability is reported by the health endpoints.
#[async_trait]
pub trait ConnectivityCheck: Send + Sync {
    /// Returns `Ok(())` when the dependency is reachable and usable.
    async fn connectivity_check(&self) -> Result<(), QueueError>;

    /// Human-readable target description used in health output.
    fn describe(&self) -> String;
}

/// Publishes to a single topic through the queue proxy.
pub struct ProxyProducer {
    client: ProxyClient,
    topic: String,
    retry_delays: Vec<Duration>,
}

impl ProxyProducer {
    pub fn new(client: ProxyClient, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
            retry_delays: RETRY_DELAYS.to_vec(),
        }
    }

    /// Override the backoff schedule.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }
}

#[async_trait]
impl MessageProducer for ProxyProducer {
    /// Send with retry. Returns `Ok(())` on the first successful attempt.
    async fn send(&self, message: Message) -> Result<(), QueueError> {
        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.client.produce(&self.topic, &message).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        queue_topic = %self.topic,
                        error = %e,
                        "Publish attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        // Final attempt after the last backoff.
        self.client
            .produce(&self.topic, &message)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    queue_topic = %self.topic,
                    error = %e,
                    "Publish failed after all retries"
                );
            })
    }
}

#[async_trait]
impl ConnectivityCheck for ProxyProducer {
    async fn connectivity_check(&self) -> Result<(), QueueError> {
        self.client.check_topic(&self.topic).await
    }

    fn describe(&self) -> String {
        format!(
            "queue address {}, topic {}",
            self.client.endpoint().addr,
            self.topic
        )
    }
}

/// Reachability of a topic on one proxy endpoint, used for consumer
/// addresses.
pub struct TopicProbe {
    client: ProxyClient,
    topic: String,
}

impl TopicProbe {
    pub fn new(client: ProxyClient, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl ConnectivityCheck for TopicProbe {
    async fn connectivity_check(&self) -> Result<(), QueueError> {
        self.client.check_topic(&self.topic).await
    }

    fn describe(&self) -> String {
        format!(
            "queue address {}, topic {}",
            self.client.endpoint().addr,
            self.topic
        )
    }
}
