//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use threadline_infra::slack::SignatureError;
use threadline_types::error::BotError;

#[derive(Debug)]
pub enum AppError {
    Bot(BotError),
    /// Missing or invalid request signature.
    Unauthorized(String),
    /// Malformed request body.
    Validation(String),
}

impl From<BotError> for AppError {
    fn from(e: BotError) -> Self {
        AppError::Bot(e)
    }
}

impl From<SignatureError> for AppError {
    fn from(e: SignatureError) -> Self {
        AppError::Unauthorized(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Bot(e @ (BotError::Busy | BotError::ShuttingDown)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", e.to_string())
            }
            AppError::Bot(BotError::Store(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string())
            }
            AppError::Bot(e) => (StatusCode::INTERNAL_SERVER_ERROR, "BOT_ERROR", e.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        };

        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        } else {
            tracing::warn!(code, error = %message, "request rejected");
        }

        let body = json!({
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
