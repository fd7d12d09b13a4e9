//! HTTP client for the queue REST proxy.
//!
//! The proxy fronts the message broker with a small REST API. Records are
//! sent and received in the binary embedded format: each record value is a
//! base64-encoded [`envelope`](crate::envelope).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HOST};
use serde::{Deserialize, Serialize};

use crate::envelope;
use crate::message::Message;

/// Content type for record payloads in the binary embedded format.
pub const BINARY_CONTENT_TYPE: &str = "application/vnd.kafka.binary.v1+json";

/// Content type for consumer management requests.
pub const CONSUMER_CONTENT_TYPE: &str = "application/vnd.kafka.v1+json";

/// Errors from the queue proxy layer.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The proxy returned a non-2xx status code.
    #[error("Queue proxy returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The topic is not known to the proxy.
    #[error("Topic {0} was not found")]
    TopicNotFound(String),
}

/// Location and credentials of one proxy endpoint.
#[derive(Debug, Clone)]
pub struct ProxyEndpoint {
    /// Base URL, e.g. `http://localhost:8080`.
    pub addr: String,
    /// Optional `Host` header override routing to the right broker.
    pub queue: Option<String>,
    /// Optional `Authorization` header value.
    pub authorization: Option<String>,
}

impl ProxyEndpoint {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into().trim_end_matches('/').to_string(),
            queue: None,
            authorization: None,
        }
    }

    pub fn with_queue(mut self, queue: Option<String>) -> Self {
        self.queue = queue.filter(|q| !q.is_empty());
        self
    }

    pub fn with_authorization(mut self, authorization: Option<String>) -> Self {
        self.authorization = authorization.filter(|a| !a.is_empty());
        self
    }
}

/// One record as returned by a consumer poll.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumedRecord {
    /// Base64-encoded envelope.
    pub value: Option<String>,
    #[serde(default)]
    pub partition: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Serialize)]
struct ProduceRequest<'a> {
    records: [ProduceRecord<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ProduceRecord<'a> {
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateConsumerRequest {
    #[serde(rename = "auto.offset.reset")]
    auto_offset_reset: &'static str,
    #[serde(rename = "auto.commit.enable")]
    auto_commit_enable: &'static str,
}

#[derive(Debug, Deserialize)]
struct CreateConsumerResponse {
    instance_id: String,
}

/// Thin REST wrapper around one proxy endpoint.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    endpoint: ProxyEndpoint,
}

impl ProxyClient {
    pub fn new(client: reqwest::Client, endpoint: ProxyEndpoint) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &ProxyEndpoint {
        &self.endpoint
    }

    /// `POST /topics/{topic}` with a single enveloped record.
    pub async fn produce(&self, topic: &str, message: &Message) -> Result<(), QueueError> {
        let value = BASE64.encode(envelope::encode(message));
        let body = ProduceRequest {
            records: [ProduceRecord { value: &value }],
        };

        let response = self
            .request(reqwest::Method::POST, &format!("/topics/{topic}"))
            .header(CONTENT_TYPE, BINARY_CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    /// `POST /consumers/{group}`; returns the new instance id.
    pub async fn create_consumer(&self, group: &str) -> Result<String, QueueError> {
        let body = CreateConsumerRequest {
            auto_offset_reset: "largest",
            auto_commit_enable: "true",
        };

        let response = self
            .request(reqwest::Method::POST, &format!("/consumers/{group}"))
            .header(CONTENT_TYPE, CONSUMER_CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;

        let created: CreateConsumerResponse = Self::ensure_success(response).await?.json().await?;
        Ok(created.instance_id)
    }

    /// `GET /consumers/{group}/instances/{id}/topics/{topic}`.
    pub async fn poll(
        &self,
        group: &str,
        instance_id: &str,
        topic: &str,
    ) -> Result<Vec<ConsumedRecord>, QueueError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/consumers/{group}/instances/{instance_id}/topics/{topic}"),
            )
            .header(ACCEPT, BINARY_CONTENT_TYPE)
            .send()
            .await?;

        Ok(Self::ensure_success(response).await?.json().await?)
    }

    /// `DELETE /consumers/{group}/instances/{id}`.
    pub async fn delete_consumer(&self, group: &str, instance_id: &str) -> Result<(), QueueError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/consumers/{group}/instances/{instance_id}"),
            )
            .header(CONTENT_TYPE, CONSUMER_CONTENT_TYPE)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    /// `GET /topics` and check that `topic` is listed.
    pub async fn check_topic(&self, topic: &str) -> Result<(), QueueError> {
        let response = self.request(reqwest::Method::GET, "/topics").send().await?;
        let topics: Vec<String> = Self::ensure_success(response).await?.json().await?;

        if topics.iter().any(|t| t == topic) {
            Ok(())
        } else {
            Err(QueueError::TopicNotFound(topic.to_string()))
        }
    }

    // ---- private helpers ----

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.endpoint.addr, path));
        if let Some(queue) = &self.endpoint.queue {
            builder = builder.header(HOST, queue);
        }
        if let Some(authorization) = &self.endpoint.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }
        builder
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, QueueError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(QueueError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Decode a consumed record into a message.
///
/// Returns `None` (after logging) for empty, non-base64, non-UTF-8 or
/// non-envelope values.
pub fn decode_record(record: &ConsumedRecord) -> Option<Message> {
    let Some(value) = record.value.as_deref() else {
        tracing::warn!(
            partition = record.partition,
            offset = record.offset,
            "Skipping record without value"
        );
        return None;
    };

    let bytes = match BASE64.decode(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                partition = record.partition,
                offset = record.offset,
                error = %e,
                "Skipping record with invalid base64 value"
            );
            return None;
        }
    };

    let raw = match String::from_utf8(bytes) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                partition = record.partition,
                offset = record.offset,
                error = %e,
                "Skipping record with non-UTF-8 value"
            );
            return None;
        }
    };

    match envelope::decode(&raw) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::warn!(
                partition = record.partition,
                offset = record.offset,
                error = %e,
                "Skipping record with invalid message envelope"
            );
            None
        }
    }
}
