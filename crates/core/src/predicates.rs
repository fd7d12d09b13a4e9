//! Ontology predicate resolution.
//!
//! Native video annotations carry the long-form predicate URI. Downstream
//! consumers expect the short canonical name, so every entry is resolved
//! through the fixed table in this module. The table is a `const` slice and
//! is never mutated.

use serde::{Serialize, Serializer};

/// Relationship between a video and an annotated concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    Mentions,
    MajorMentions,
    IsClassifiedBy,
    About,
    IsPrimarilyClassifiedBy,
    HasAuthor,
}

/// Long-form ontology URI to predicate.
const PREDICATE_URIS: &[(&str, Predicate)] = &[
    (
        "http://www.ft.com/ontology/annotation/mentions",
        Predicate::Mentions,
    ),
    (
        "http://www.ft.com/ontology/annotation/majorMentions",
        Predicate::MajorMentions,
    ),
    (
        "http://www.ft.com/ontology/classification/isClassifiedBy",
        Predicate::IsClassifiedBy,
    ),
    (
        "http://www.ft.com/ontology/annotation/about",
        Predicate::About,
    ),
    (
        "http://www.ft.com/ontology/classification/isPrimarilyClassifiedBy",
        Predicate::IsPrimarilyClassifiedBy,
    ),
    (
        "http://www.ft.com/ontology/annotation/hasAuthor",
        Predicate::HasAuthor,
    ),
];

impl Predicate {
    /// Look up the predicate for a long-form ontology URI.
    ///
    /// Returns `None` for unknown URIs. Matching is exact, including case.
    pub fn from_uri(uri: &str) -> Option<Self> {
        PREDICATE_URIS
            .iter()
            .find(|(candidate, _)| *candidate == uri)
            .map(|(_, predicate)| *predicate)
    }

    /// Canonical short form written to the outbound document.
    pub fn as_str(self) -> &'static str {
        match self {
            Predicate::Mentions => "mentions",
            Predicate::MajorMentions => "majorMentions",
            Predicate::IsClassifiedBy => "isClassifiedBy",
            Predicate::About => "about",
            Predicate::IsPrimarilyClassifiedBy => "isPrimarilyClassifiedBy",
            Predicate::HasAuthor => "hasAuthor",
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Resolve a long-form predicate URI to its short canonical name.
pub fn resolve(uri: &str) -> Option<&'static str> {
    Predicate::from_uri(uri).map(Predicate::as_str)
}
