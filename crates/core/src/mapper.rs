//! Native video event to concept annotations mapping.
//!
//! [`map_event`] is the single entry point shared by the queue handler and
//! the HTTP `/map` route. It is synchronous and touches no shared state, so
//! callers may run it for many messages concurrently.
//!
//! Per-entry problems are logged at `warn` and the entry is skipped. Only
//! top-level problems surface as a [`MappingError`].

use crate::annotations::ConceptAnnotations;
use crate::error::MappingError;
use crate::native::{NativeEvent, NativeVideo};
use crate::tag::Tag;

/// Result of mapping one event that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingOutcome {
    /// A document was produced and should be published.
    Mapped(ConceptAnnotations),
    /// The event was a deletion. Nothing is published.
    Suppressed { uuid: String },
}

impl MappingOutcome {
    pub fn video_uuid(&self) -> &str {
        match self {
            Self::Mapped(doc) => &doc.uuid,
            Self::Suppressed { uuid } => uuid,
        }
    }

    /// The document, if one was produced.
    pub fn into_document(self) -> Option<ConceptAnnotations> {
        match self {
            Self::Mapped(doc) => Some(doc),
            Self::Suppressed { .. } => None,
        }
    }
}

/// Decode a raw native event body and map it.
pub fn map_event(body: &[u8], transaction_id: &str) -> Result<MappingOutcome, MappingError> {
    let event = NativeEvent::decode(body)?;
    Ok(map_native_event(event, transaction_id))
}

/// Map an already decoded event.
pub fn map_native_event(event: NativeEvent, transaction_id: &str) -> MappingOutcome {
    match event {
        NativeEvent::Delete { uuid } => {
            tracing::info!(
                transaction_id,
                video_uuid = %uuid,
                "Delete event, no annotations will be mapped"
            );
            MappingOutcome::Suppressed { uuid }
        }
        NativeEvent::Publish(video) => MappingOutcome::Mapped(map_video(video, transaction_id)),
    }
}

fn map_video(video: NativeVideo, transaction_id: &str) -> ConceptAnnotations {
    let NativeVideo { id, annotations } = video;

    let Some(entries) = annotations else {
        tracing::info!(
            transaction_id,
            video_uuid = %id,
            "Annotations field is missing, mapping to an empty annotation list"
        );
        return ConceptAnnotations::from_tags(id, Vec::new());
    };

    let tags: Vec<Tag> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match Tag::from_entry(entry) {
            Ok(tag) => {
                tracing::debug!(
                    transaction_id,
                    video_uuid = %id,
                    concept_id = %tag.concept_id,
                    predicate = %tag.predicate,
                    "Annotation mapped"
                );
                Some(tag)
            }
            Err(reason) => {
                tracing::warn!(
                    transaction_id,
                    video_uuid = %id,
                    index,
                    reason = %reason,
                    "Annotation could not be processed, skipping"
                );
                None
            }
        })
        .collect();

    if tags.is_empty() {
        tracing::info!(
            transaction_id,
            video_uuid = %id,
            input_count = entries.len(),
            "No valid annotations found"
        );
    }

    ConceptAnnotations::from_tags(id, tags)
}
