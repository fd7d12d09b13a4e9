use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use vam_core::{map_event, MappingOutcome};

use crate::error::AppResult;
use crate::state::AppState;

/// POST /map -- map a native video body and return the concept annotations.
///
/// A deletion event has no document and answers `204 No Content`.
async fn map_video(headers: HeaderMap, body: Bytes) -> AppResult<Response> {
    // Always present: `SetRequestIdLayer` generates one when the caller sends none.
    let tid = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match map_event(&body, tid)? {
        MappingOutcome::Mapped(doc) => {
            let json = doc.to_json_bytes()?;
            Ok(([(CONTENT_TYPE, "application/json")], json).into_response())
        }
        MappingOutcome::Suppressed { .. } => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/map", post(map_video))
}
