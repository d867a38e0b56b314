//! Client-facing JSON responses produced by the gateway itself.
//!
//! Upstream answers and dispatch failures render through their own
//! `IntoResponse` impls in the resilience subsystem; this module covers the
//! rest (health, unknown routes, bad input).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const SERVICE_NAME: &str = "api-gateway";

/// `{"error": message}` with `status`.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

pub async fn health() -> Response {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "service": SERVICE_NAME })),
    )
        .into_response()
}
