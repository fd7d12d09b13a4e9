use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vam_core::MappingError;

/// Application-level error type for HTTP handlers.
///
/// Error bodies are plain text: `/map` callers read the message as-is.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The submitted body could not be mapped.
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Mapping(MappingError::Encode(e)) => {
                tracing::error!(error = %e, "Failed to encode mapped document");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Mapping(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        };

        (
            status,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}
