//! Long-running consumer loop.
//!
//! [`run`] owns one consumer instance on the proxy, polls it sequentially
//! and hands every decoded message to the [`QueueHandler`] in order. It
//! runs until the [`CancellationToken`] is triggered and deletes its
//! consumer instance on the way out.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::handler::QueueHandler;
use crate::proxy::{decode_record, ProxyClient, QueueError};

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay, clamped to [`BackoffConfig::max_delay`].
pub fn next_delay(current: Duration, config: &BackoffConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Where and how to consume.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub group: String,
    pub topic: String,
    /// Pause after a poll that returned no records.
    pub poll_interval: Duration,
    pub backoff: BackoffConfig,
}

/// Consume until cancelled.
pub async fn run(
    client: ProxyClient,
    config: ConsumerConfig,
    handler: QueueHandler,
    cancel: CancellationToken,
) {
    tracing::info!(
        queue_topic = %config.topic,
        group = %config.group,
        addr = %client.endpoint().addr,
        "Starting queue consumer"
    );

    while let Some(instance_id) = create_instance(&client, &config, &cancel).await {
        let result = consume(&client, &config, &handler, &instance_id, &cancel).await;

        if let Err(e) = client.delete_consumer(&config.group, &instance_id).await {
            tracing::debug!(
                instance_id = %instance_id,
                error = %e,
                "Could not delete consumer instance"
            );
        }

        match result {
            Ok(()) => break,
            Err(e) => {
                tracing::warn!(
                    queue_topic = %config.topic,
                    instance_id = %instance_id,
                    error = %e,
                    "Consumer poll failed, recreating consumer instance"
                );
            }
        }
    }

    tracing::info!(queue_topic = %config.topic, "Queue consumer stopped");
}

/// Create a consumer instance, retrying with exponential backoff.
///
/// Returns `None` if cancelled first.
async fn create_instance(
    client: &ProxyClient,
    config: &ConsumerConfig,
    cancel: &CancellationToken,
) -> Option<String> {
    let mut delay = config.backoff.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        tokio::select! {
            _ = cancel.cancelled() => return None,
            result = client.create_consumer(&config.group) => {
                match result {
                    Ok(instance_id) => {
                        tracing::info!(
                            instance_id = %instance_id,
                            attempt,
                            "Consumer instance created"
                        );
                        return Some(instance_id);
                    }
                    Err(e) => {
                        tracing::warn!(
                            group = %config.group,
                            attempt,
                            error = %e,
                            delay_ms = delay.as_millis() as u64,
                            "Creating consumer instance failed, retrying"
                        );
                    }
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        delay = next_delay(delay, &config.backoff);
    }
}

/// Poll one consumer instance until cancelled (`Ok`) or a poll fails.
async fn consume(
    client: &ProxyClient,
    config: &ConsumerConfig,
    handler: &QueueHandler,
    instance_id: &str,
    cancel: &CancellationToken,
) -> Result<(), QueueError> {
    loop {
        let records = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            result = client.poll(&config.group, instance_id, &config.topic) => result?,
        };

        if records.is_empty() {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(config.poll_interval) => {}
            }
            continue;
        }

        tracing::debug!(count = records.len(), "Received records");
        for record in &records {
            if let Some(message) = decode_record(record) {
                handler.handle(message).await;
            }
        }
    }
}
