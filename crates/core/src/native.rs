//! Typed decoding of native video events.
//!
//! The publisher sends loosely structured JSON. [`NativeEvent::decode`]
//! checks the top-level shape once and hands the mapper a typed value, so
//! the mapping code never inspects raw JSON types itself. Individual
//! annotation entries stay as raw objects because a bad entry must only
//! drop that entry, not the whole message.

use serde_json::{Map, Value};

use crate::error::MappingError;

pub const VIDEO_ID_FIELD: &str = "id";
pub const DELETED_VIDEO_ID_FIELD: &str = "uuid";
pub const DELETED_MARKER_FIELD: &str = "deleted";
pub const ANNOTATIONS_FIELD: &str = "annotations";

/// A decoded native video event.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// A video was created or updated.
    Publish(NativeVideo),
    /// A video was deleted. Carries the id from the `uuid` field.
    Delete { uuid: String },
}

/// A published video and its raw annotation entries.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeVideo {
    pub id: String,
    /// `None` when the `annotations` field was absent.
    pub annotations: Option<Vec<Map<String, Value>>>,
}

impl NativeEvent {
    /// Decode and shape-check a raw event body.
    ///
    /// The `deleted` marker is detected by key presence; its value is not
    /// inspected.
    pub fn decode(body: &[u8]) -> Result<Self, MappingError> {
        let object: Map<String, Value> =
            serde_json::from_slice(body).map_err(MappingError::Decode)?;
        Self::from_object(object)
    }

    /// Shape-check an already parsed JSON object.
    pub fn from_object(mut object: Map<String, Value>) -> Result<Self, MappingError> {
        if object.contains_key(DELETED_MARKER_FIELD) {
            let uuid = take_string(&mut object, DELETED_VIDEO_ID_FIELD)?;
            return Ok(Self::Delete { uuid });
        }

        let id = take_string(&mut object, VIDEO_ID_FIELD)?;
        let annotations = match object.remove(ANNOTATIONS_FIELD) {
            None => None,
            Some(value) => Some(object_array(value, &id)?),
        };

        Ok(Self::Publish(NativeVideo { id, annotations }))
    }
}

fn take_string(object: &mut Map<String, Value>, field: &'static str) -> Result<String, MappingError> {
    match object.remove(field) {
        Some(Value::String(s)) => Ok(s),
        _ => Err(MappingError::MissingField {
            field,
            expected: "string",
        }),
    }
}

fn object_array(
    value: Value,
    video_uuid: &str,
) -> Result<Vec<Map<String, Value>>, MappingError> {
    let malformed = || MappingError::MalformedField {
        field: ANNOTATIONS_FIELD,
        expected: "array of objects",
        video_uuid: video_uuid.to_string(),
    };

    let Value::Array(items) = value else {
        return Err(malformed());
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            _ => Err(malformed()),
        })
        .collect()
}
