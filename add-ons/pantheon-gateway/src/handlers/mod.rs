//! HTTP handlers. Core errors become `(StatusCode, Json<{error}>)` here and nowhere else.

pub mod chat;
pub mod cycle;

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pantheon_core::CompanionError;

pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn api_error(err: CompanionError) -> ApiError {
    let status = StatusCode::from_u16(err.status_hint()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match &err {
        CompanionError::Validation(msg) => msg.clone(),
        CompanionError::Internal(detail) => {
            tracing::error!(target: "pantheon::gateway", error = %detail, "Request failed");
            "Failed to generate response".to_string()
        }
    };
    (status, Json(serde_json::json!({ "error": message })))
}

/// Turns a handler panic into the generic 500 body.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());
    api_error(CompanionError::Internal(detail)).into_response()
}
