/// Fatal errors raised while mapping a single native video event.
///
/// Any of these aborts the current message or request only. Problems with
/// an individual annotation entry are not errors; see
/// [`DropReason`](crate::tag::DropReason).
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// The body is not a JSON object.
    #[error("Video JSON couldn't be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    /// A required identifier field is absent or not of the expected type.
    #[error("[{field}] field of native video JSON is missing or not of type {expected}")]
    MissingField {
        field: &'static str,
        expected: &'static str,
    },

    /// A present field does not have the required shape.
    #[error("[{field}] field of native video JSON is malformed: expected {expected}")]
    MalformedField {
        field: &'static str,
        expected: &'static str,
        /// Id of the video, already read when the field was checked.
        video_uuid: String,
    },

    /// The canonical document could not be serialized.
    #[error("Concept annotations couldn't be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

impl MappingError {
    /// Id of the video the error refers to, when it was known at the time.
    pub fn video_uuid(&self) -> Option<&str> {
        match self {
            Self::MalformedField { video_uuid, .. } => Some(video_uuid.as_str()),
            _ => None,
        }
    }
}
