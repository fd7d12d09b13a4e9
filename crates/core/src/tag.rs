//! Per-entry annotation extraction.
//!
//! Each object in a native `annotations` array becomes at most one [`Tag`].
//! Entries that cannot be used are reported as a [`DropReason`] so the
//! mapper can log them and carry on with the rest of the array.

use serde_json::{Map, Value};

use crate::predicates::Predicate;

const ENTRY_ID_FIELD: &str = "id";
const ENTRY_PREDICATE_FIELD: &str = "predicate";

/// A resolved concept-to-video relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Concept URI exactly as it appeared in the native entry.
    pub concept_uri: String,
    /// Trailing path segment of `concept_uri`.
    pub concept_id: String,
    pub predicate: Predicate,
}

/// Why an annotation entry was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    #[error("[{field}] field of annotation is missing")]
    MissingField { field: &'static str },

    #[error("[{field}] field of annotation is not of type string")]
    NotAString { field: &'static str },

    #[error("cannot extract concept id from annotation id field: {uri}")]
    EmptyConceptId { uri: String },

    #[error("predicate is not recognised: {uri}")]
    UnknownPredicate { uri: String },
}

/// Extract the concept identifier from a concept URI.
///
/// The identifier is everything after the last `/`, or the whole string
/// when there is no `/`. Returns `None` when that segment is empty.
///
/// ```
/// use vam_core::tag::concept_id_from_uri;
///
/// assert_eq!(
///     concept_id_from_uri("http://api.ft.com/things/d969d76e-f8f4-34ae-bc38-95cfd0884740"),
///     Some("d969d76e-f8f4-34ae-bc38-95cfd0884740"),
/// );
/// assert_eq!(concept_id_from_uri("http://api.ft.com/things/"), None);
/// ```
pub fn concept_id_from_uri(uri: &str) -> Option<&str> {
    let id = match uri.rfind('/') {
        Some(idx) => &uri[idx + 1..],
        None => uri,
    };
    (!id.is_empty()).then_some(id)
}

impl Tag {
    /// Build a tag from one native annotation object.
    pub fn from_entry(entry: &Map<String, Value>) -> Result<Self, DropReason> {
        let concept_uri = string_field(entry, ENTRY_ID_FIELD)?;
        let concept_id =
            concept_id_from_uri(concept_uri).ok_or_else(|| DropReason::EmptyConceptId {
                uri: concept_uri.to_string(),
            })?;

        let predicate_uri = string_field(entry, ENTRY_PREDICATE_FIELD)?;
        let predicate =
            Predicate::from_uri(predicate_uri).ok_or_else(|| DropReason::UnknownPredicate {
                uri: predicate_uri.to_string(),
            })?;

        Ok(Self {
            concept_uri: concept_uri.to_string(),
            concept_id: concept_id.to_string(),
            predicate,
        })
    }
}

fn string_field<'a>(
    entry: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, DropReason> {
    match entry.get(field) {
        None => Err(DropReason::MissingField { field }),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(DropReason::NotAString { field }),
    }
}
