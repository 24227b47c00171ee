use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Errors surfaced by the HTTP layer.
///
/// Chat failures never reach here: they are answered as degraded chat
/// responses. Only malformed requests map to a non-200 status.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    InvalidBody(JsonRejection),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
        };

        tracing::debug!(%status, "Rejected request: {}", message);
        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
