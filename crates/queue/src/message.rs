//! Queue message model and header handling.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

pub const HEADER_REQUEST_ID: &str = "X-Request-Id";
pub const HEADER_ORIGIN_SYSTEM_ID: &str = "Origin-System-Id";
pub const HEADER_MESSAGE_TIMESTAMP: &str = "Message-Timestamp";
pub const HEADER_MESSAGE_ID: &str = "Message-Id";
pub const HEADER_MESSAGE_TYPE: &str = "Message-Type";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Origin of native video events this service maps.
pub const NEXT_VIDEO_ORIGIN: &str = "http://cmdb.ft.com/systems/next-video-editor";

/// `Message-Type` of every published message.
pub const CONCEPT_ANNOTATIONS_MESSAGE_TYPE: &str = "concept-annotations";

/// A message read from or written to the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Message {
    pub fn new(headers: BTreeMap<String, String>, body: impl Into<String>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Header value, or `None` when absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Transaction id from `X-Request-Id`, ignoring empty values.
    pub fn transaction_id(&self) -> Option<&str> {
        self.header(HEADER_REQUEST_ID).filter(|tid| !tid.is_empty())
    }
}

/// Format a timestamp as RFC 3339 with millisecond precision.
pub fn message_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the headers for a published concept annotations message.
///
/// `X-Request-Id` and `Origin-System-Id` are copied from the inbound
/// message; the rest are generated.
pub fn outbound_headers(
    inbound: &Message,
    now: DateTime<Utc>,
    message_id: Uuid,
) -> BTreeMap<String, String> {
    let propagated = |name: &str| inbound.header(name).unwrap_or_default().to_string();

    BTreeMap::from([
        (HEADER_REQUEST_ID.to_string(), propagated(HEADER_REQUEST_ID)),
        (
            HEADER_ORIGIN_SYSTEM_ID.to_string(),
            propagated(HEADER_ORIGIN_SYSTEM_ID),
        ),
        (HEADER_MESSAGE_TIMESTAMP.to_string(), message_timestamp(now)),
        (HEADER_MESSAGE_ID.to_string(), message_id.to_string()),
        (
            HEADER_MESSAGE_TYPE.to_string(),
            CONCEPT_ANNOTATIONS_MESSAGE_TYPE.to_string(),
        ),
        (
            HEADER_CONTENT_TYPE.to_string(),
            "application/json".to_string(),
        ),
    ])
}
