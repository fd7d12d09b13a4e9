//! Canonical concept annotation document.
//!
//! This is the body published downstream and returned by `POST /map`:
//!
//! ```json
//! {"uuid":"<video>","annotations":[{"id":"<concept uri>","predicate":"about","relevanceScore":0.9,"confidenceScore":0.9}]}
//! ```

use serde::Serialize;

use crate::error::MappingError;
use crate::predicates::Predicate;
use crate::tag::Tag;

/// Relevance assigned to every mapped annotation.
pub const DEFAULT_RELEVANCE_SCORE: f64 = 0.9;

/// Confidence assigned to every mapped annotation.
pub const DEFAULT_CONFIDENCE_SCORE: f64 = 0.9;

/// Annotations for a single video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptAnnotations {
    pub uuid: String,
    pub annotations: Vec<Annotation>,
}

/// One concept annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    pub predicate: Predicate,
    pub relevance_score: f64,
    pub confidence_score: f64,
}

impl From<Tag> for Annotation {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.concept_uri,
            predicate: tag.predicate,
            relevance_score: DEFAULT_RELEVANCE_SCORE,
            confidence_score: DEFAULT_CONFIDENCE_SCORE,
        }
    }
}

impl ConceptAnnotations {
    pub fn from_tags(uuid: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            uuid: uuid.into(),
            annotations: tags.into_iter().map(Annotation::from).collect(),
        }
    }

    /// Serialize to the wire format.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, MappingError> {
        serde_json::to_vec(self).map_err(MappingError::Encode)
    }

    pub fn to_json_string(&self) -> Result<String, MappingError> {
        serde_json::to_string(self).map_err(MappingError::Encode)
    }
}
