//! Mapping tests driven by native video JSON fixtures.

use assert_matches::assert_matches;
use vam_core::{map_event, MappingError, MappingOutcome};

const TID: &str = "tid_fixture";
const VIDEO_UUID: &str = "e2290d14-7e80-4db8-a715-949da4de9a07";

fn fixture(name: &str) -> Vec<u8> {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read(&path).unwrap_or_else(|e| panic!("Cannot read fixture {path}: {e}"))
}

fn mapped_json(name: &str) -> String {
    let outcome = map_event(&fixture(name), TID).expect("mapping should succeed");
    let doc = outcome.into_document().expect("a document should be produced");
    String::from_utf8(doc.to_json_bytes().unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Happy flow
// ---------------------------------------------------------------------------

#[test]
fn single_classification_maps_to_canonical_document() {
    assert_eq!(
        mapped_json("next-video-input.json"),
        r#"{"uuid":"e2290d14-7e80-4db8-a715-949da4de9a07","annotations":[{"id":"http://api.ft.com/things/71a5efa5-e6e0-3ce1-9190-a7eac8bef325","predicate":"isClassifiedBy","relevanceScore":0.9,"confidenceScore":0.9}]}"#
    );
}

#[test]
fn missing_annotations_maps_to_empty_list() {
    assert_eq!(
        mapped_json("next-video-no-anns-input.json"),
        r#"{"uuid":"e2290d14-7e80-4db8-a715-949da4de9a07","annotations":[]}"#
    );
}

#[test]
fn empty_annotations_maps_to_empty_list() {
    assert_eq!(
        mapped_json("next-video-empty-anns-input.json"),
        r#"{"uuid":"e2290d14-7e80-4db8-a715-949da4de9a07","annotations":[]}"#
    );
}

#[test]
fn mixed_annotations_keep_only_usable_entries() {
    let outcome = map_event(&fixture("next-video-mixed-anns-input.json"), TID).unwrap();
    let doc = outcome.into_document().unwrap();

    let pairs: Vec<_> = doc
        .annotations
        .iter()
        .map(|a| (a.id.as_str(), a.predicate.as_str()))
        .collect();
    assert_eq!(
        pairs,
        [
            (
                "http://api.ft.com/things/d969d76e-f8f4-34ae-bc38-95cfd0884740",
                "about"
            ),
            (
                "http://api.ft.com/things/9a5e3b4a-55da-498c-816f-9c534e1392bd",
                "isPrimarilyClassifiedBy"
            ),
        ]
    );
    assert!(doc
        .annotations
        .iter()
        .all(|a| a.relevance_score == 0.9 && a.confidence_score == 0.9));
}

// ---------------------------------------------------------------------------
// Deletes and failures
// ---------------------------------------------------------------------------

#[test]
fn delete_event_produces_no_document() {
    let outcome = map_event(&fixture("next-video-delete-input.json"), TID).unwrap();
    assert_eq!(
        outcome,
        MappingOutcome::Suppressed {
            uuid: VIDEO_UUID.to_string()
        }
    );
}

#[test]
fn invalid_annotations_field_is_rejected() {
    let result = map_event(&fixture("next-video-invalid-anns-input.json"), TID);
    assert_matches!(result, Err(MappingError::MalformedField { .. }));
}

#[test]
fn missing_video_uuid_is_rejected() {
    let result = map_event(&fixture("next-video-no-videouuid-input.json"), TID);
    assert_matches!(result, Err(MappingError::MissingField { field: "id", .. }));
}

#[test]
fn truncated_json_is_rejected() {
    let result = map_event(&fixture("invalid-format.json"), TID);
    assert_matches!(result, Err(MappingError::Decode(_)));
}
