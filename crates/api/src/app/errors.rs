use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::warn;

use smartair_ai::AiError;

pub fn ai_error_to_response(err: AiError) -> Response {
    match err {
        AiError::UnknownCity(_) => json_error(StatusCode::BAD_REQUEST, err.to_string()),
        other => {
            warn!(error = %other, "prediction failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

/// Unparseable request bodies are server errors here, not 4xx.
pub fn rejection_to_response(rejection: JsonRejection) -> Response {
    warn!(error = %rejection.body_text(), "rejected request body");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, rejection.body_text())
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}
