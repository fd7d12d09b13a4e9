//! Annotation mapping core.
//!
//! Turns native video publication events into canonical concept
//! annotation documents:
//!
//! - [`predicates`] resolves long-form ontology predicate URIs.
//! - [`native`] decodes and shape-checks the incoming event.
//! - [`tag`] extracts one resolved tag per usable annotation entry.
//! - [`annotations`] is the outbound document model.
//! - [`mapper`] drives the whole transform.

pub mod annotations;
pub mod error;
pub mod mapper;
pub mod native;
pub mod predicates;
pub mod tag;

pub use annotations::{Annotation, ConceptAnnotations};
pub use error::MappingError;
pub use mapper::{map_event, MappingOutcome};
pub use native::NativeEvent;
pub use predicates::Predicate;
pub use tag::{DropReason, Tag};
