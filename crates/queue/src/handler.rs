//! Per-message queue processing.
//!
//! [`QueueHandler`] filters inbound messages by origin, maps the native
//! video event and publishes the resulting concept annotations. Every
//! outcome is logged here; the consumer loop only drives the handler.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use vam_core::{map_event, MappingError, MappingOutcome};

use crate::message::{outbound_headers, Message, HEADER_ORIGIN_SYSTEM_ID, NEXT_VIDEO_ORIGIN};
use crate::producer::MessageProducer;
use crate::proxy::QueueError;

/// Why a message was not forwarded.
#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    #[error("X-Request-Id not found in message headers")]
    MissingTransactionId,

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("Error sending transformed message to queue: {0}")]
    Publish(#[source] QueueError),
}

/// What happened to one inbound message.
#[derive(Debug)]
pub enum HandleOutcome {
    /// Mapped and published.
    Sent { video_uuid: String },
    /// Not from the expected origin system.
    Ignored { origin: Option<String> },
    /// A deletion event. Nothing was published.
    Suppressed { video_uuid: String },
    /// Processing failed for this message.
    Rejected(HandleError),
}

/// Maps inbound messages and hands them to a producer.
#[derive(Clone)]
pub struct QueueHandler {
    producer: Arc<dyn MessageProducer>,
    read_topic: String,
    expected_origin: String,
}

impl QueueHandler {
    pub fn new(producer: Arc<dyn MessageProducer>, read_topic: impl Into<String>) -> Self {
        Self {
            producer,
            read_topic: read_topic.into(),
            expected_origin: NEXT_VIDEO_ORIGIN.to_string(),
        }
    }

    pub async fn handle(&self, message: Message) -> HandleOutcome {
        let origin = message.header(HEADER_ORIGIN_SYSTEM_ID);
        if origin != Some(self.expected_origin.as_str()) {
            tracing::info!(
                queue_topic = %self.read_topic,
                origin = origin.unwrap_or_default(),
                "Ignoring message with different Origin-System-Id"
            );
            return HandleOutcome::Ignored {
                origin: origin.map(str::to_string),
            };
        }

        let Some(tid) = message.transaction_id().map(str::to_string) else {
            tracing::warn!(
                queue_topic = %self.read_topic,
                "X-Request-Id not found in message headers, skipping message"
            );
            return HandleOutcome::Rejected(HandleError::MissingTransactionId);
        };

        let outcome = match map_event(message.body.as_bytes(), &tid) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    queue_topic = %self.read_topic,
                    transaction_id = %tid,
                    video_uuid = e.video_uuid().unwrap_or_default(),
                    error = %e,
                    "Error mapping the message from queue"
                );
                return HandleOutcome::Rejected(e.into());
            }
        };

        let doc = match outcome {
            MappingOutcome::Suppressed { uuid } => {
                return HandleOutcome::Suppressed { video_uuid: uuid };
            }
            MappingOutcome::Mapped(doc) => doc,
        };

        let body = match doc.to_json_string() {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    transaction_id = %tid,
                    video_uuid = %doc.uuid,
                    error = %e,
                    "Error encoding mapped document"
                );
                return HandleOutcome::Rejected(e.into());
            }
        };

        let outbound = Message::new(outbound_headers(&message, Utc::now(), Uuid::new_v4()), body);

        if let Err(e) = self.producer.send(outbound).await {
            tracing::warn!(
                transaction_id = %tid,
                video_uuid = %doc.uuid,
                error = %e,
                "Error sending transformed message to queue"
            );
            return HandleOutcome::Rejected(HandleError::Publish(e));
        }

        tracing::info!(
            transaction_id = %tid,
            video_uuid = %doc.uuid,
            annotations = doc.annotations.len(),
            "Mapped and sent concept annotations"
        );
        HandleOutcome::Sent {
            video_uuid: doc.uuid,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::message::{HEADER_MESSAGE_TYPE, HEADER_REQUEST_ID};

    const VIDEO_UUID: &str = "e2290d14-7e80-4db8-a715-949da4de9a07";
    const NEXT_VIDEO: &str = r#"{"id":"e2290d14-7e80-4db8-a715-949da4de9a07","annotations":[{"id":"http://api.ft.com/things/71a5efa5-e6e0-3ce1-9190-a7eac8bef325","predicate":"http://www.ft.com/ontology/classification/isClassifiedBy"}]}"#;

    #[derive(Default)]
    struct RecordingProducer {
        sent: Mutex<Vec<Message>>,
        fail: bool,
    }

    #[async_trait]
    impl MessageProducer for RecordingProducer {
        async fn send(&self, message: Message) -> Result<(), QueueError> {
            if self.fail {
                return Err(QueueError::Status {
                    status: 500,
                    body: "down".into(),
                });
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn inbound(origin: &str, tid: &str, body: &str) -> Message {
        Message::new(
            BTreeMap::from([
                (HEADER_ORIGIN_SYSTEM_ID.to_string(), origin.to_string()),
                (HEADER_REQUEST_ID.to_string(), tid.to_string()),
            ]),
            body,
        )
    }

    fn handler() -> (QueueHandler, Arc<RecordingProducer>) {
        let producer = Arc::new(RecordingProducer::default());
        let handler = QueueHandler::new(producer.clone(), "NativeCmsPublicationEvents");
        (handler, producer)
    }

    #[tokio::test]
    async fn maps_and_sends_next_video() {
        let (handler, producer) = handler();

        let outcome = handler
            .handle(inbound(NEXT_VIDEO_ORIGIN, "tid_1234", NEXT_VIDEO))
            .await;
        assert_matches!(outcome, HandleOutcome::Sent { video_uuid } if video_uuid == VIDEO_UUID);

        let sent = producer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].body,
            r#"{"uuid":"e2290d14-7e80-4db8-a715-949da4de9a07","annotations":[{"id":"http://api.ft.com/things/71a5efa5-e6e0-3ce1-9190-a7eac8bef325","predicate":"isClassifiedBy","relevanceScore":0.9,"confidenceScore":0.9}]}"#
        );
        assert_eq!(sent[0].header(HEADER_REQUEST_ID), Some("tid_1234"));
        assert_eq!(sent[0].header(HEADER_ORIGIN_SYSTEM_ID), Some(NEXT_VIDEO_ORIGIN));
        assert_eq!(sent[0].header(HEADER_MESSAGE_TYPE), Some("concept-annotations"));
    }

    #[tokio::test]
    async fn other_origin_is_ignored() {
        let (handler, producer) = handler();

        let outcome = handler.handle(inbound("other", "tid_1234", NEXT_VIDEO)).await;
        assert_matches!(outcome, HandleOutcome::Ignored { origin: Some(o) } if o == "other");
        assert!(producer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_origin_is_ignored() {
        let (handler, producer) = handler();
        let mut message = inbound(NEXT_VIDEO_ORIGIN, "tid_1234", NEXT_VIDEO);
        message.headers.remove(HEADER_ORIGIN_SYSTEM_ID);

        let outcome = handler.handle(message).await;
        assert_matches!(outcome, HandleOutcome::Ignored { origin: None });
        assert!(producer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_transaction_id_is_rejected() {
        let (handler, producer) = handler();

        let outcome = handler.handle(inbound(NEXT_VIDEO_ORIGIN, "", NEXT_VIDEO)).await;
        assert_matches!(outcome, HandleOutcome::Rejected(HandleError::MissingTransactionId));
        assert!(producer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_json_is_rejected() {
        let (handler, producer) = handler();

        let outcome = handler
            .handle(inbound(NEXT_VIDEO_ORIGIN, "tid_1234", "{\"id\": "))
            .await;
        assert_matches!(
            outcome,
            HandleOutcome::Rejected(HandleError::Mapping(MappingError::Decode(_)))
        );
        assert!(producer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_annotations_are_rejected() {
        let (handler, producer) = handler();

        let outcome = handler
            .handle(inbound(
                NEXT_VIDEO_ORIGIN,
                "tid_1234",
                r#"{"id":"abc","annotations":"x"}"#,
            ))
            .await;
        assert_matches!(
            outcome,
            HandleOutcome::Rejected(HandleError::Mapping(e)) if e.video_uuid() == Some("abc")
        );
        assert!(producer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_annotations_are_still_sent() {
        let (handler, producer) = handler();

        let outcome = handler
            .handle(inbound(
                NEXT_VIDEO_ORIGIN,
                "tid_1234",
                r#"{"id":"e2290d14-7e80-4db8-a715-949da4de9a07","annotations":[]}"#,
            ))
            .await;
        assert_matches!(outcome, HandleOutcome::Sent { .. });
        assert_eq!(
            producer.sent.lock().unwrap()[0].body,
            r#"{"uuid":"e2290d14-7e80-4db8-a715-949da4de9a07","annotations":[]}"#
        );
    }

    #[tokio::test]
    async fn delete_event_is_not_sent() {
        let (handler, producer) = handler();

        let outcome = handler
            .handle(inbound(
                NEXT_VIDEO_ORIGIN,
                "tid_1234",
                r#"{"uuid":"e2290d14-7e80-4db8-a715-949da4de9a07","deleted":true}"#,
            ))
            .await;
        assert_matches!(outcome, HandleOutcome::Suppressed { video_uuid } if video_uuid == VIDEO_UUID);
        assert!(producer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_is_rejected() {
        let producer = Arc::new(RecordingProducer {
            fail: true,
            ..Default::default()
        });
        let handler = QueueHandler::new(producer, "NativeCmsPublicationEvents");

        let outcome = handler
            .handle(inbound(NEXT_VIDEO_ORIGIN, "tid_1234", NEXT_VIDEO))
            .await;
        assert_matches!(outcome, HandleOutcome::Rejected(HandleError::Publish(_)));
    }
}
