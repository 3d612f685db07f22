//! JSON error envelope shared by the HTTP handlers.

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

pub type ErrorReply = (StatusCode, Json<ErrorResponse>);

pub fn error(status: StatusCode, code: &'static str, message: impl Into<String>) -> ErrorReply {
    (
        status,
        Json(ErrorResponse {
            error: ErrorBody {
                code,
                message: message.into(),
            },
        }),
    )
}

pub fn bad_request(code: &'static str, message: impl Into<String>) -> ErrorReply {
    error(StatusCode::BAD_REQUEST, code, message)
}

pub fn not_found(message: impl Into<String>) -> ErrorReply {
    error(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn internal_error(message: impl Into<String>) -> ErrorReply {
    error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
}
