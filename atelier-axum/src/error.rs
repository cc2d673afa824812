use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use atelier_blob::GalleryError;

/// HTTP-facing wrapper around [`GalleryError`].
///
/// Validation problems surface as 400 with `{error, message}`; failures
/// after chunks were accepted surface as 500 and additionally carry
/// `complete: false` so the sender knows the transfer did not publish.
#[derive(Debug)]
pub struct AtelierAxumError(pub GalleryError);

impl From<GalleryError> for AtelierAxumError {
    fn from(e: GalleryError) -> Self {
        Self(e)
    }
}

impl AtelierAxumError {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self(GalleryError::invalid(message))
    }
}

impl IntoResponse for AtelierAxumError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            GalleryError::Invalid { message } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_request", "message": message }),
            ),
            GalleryError::NotFound { key } => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "message": format!("Not found: {key}") }),
            ),
            GalleryError::IncompleteAssembly { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "incomplete_assembly",
                    "message": self.0.to_string(),
                    "complete": false,
                }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "storage_error",
                    "message": self.0.to_string(),
                    "complete": false,
                }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
