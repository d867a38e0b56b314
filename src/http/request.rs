//! Inbound request handling.
//!
//! # Responsibilities
//! - Read the client's JSON body when the route forwards one
//! - Select the headers that travel upstream (Authorization, X-Request-ID)
//!
//! # Design Decisions
//! - An empty body forwards as no body, not as `null`
//! - Only explicitly forwarded headers reach the upstream

use axum::body::Body;
use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderName, StatusCode};
use serde_json::Value;

use crate::http::response::error_response;
use crate::routing::RouteSpec;
use axum::response::Response;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Buffer and parse the inbound body.
pub async fn read_json_body(body: Body, limit: usize) -> Result<Option<Value>, Response> {
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read request body");
        error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    })?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Request body must be valid JSON"))
}

/// Headers copied from the inbound request onto the upstream call.
pub fn forwarded_headers(route: &RouteSpec, inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if route.forward_auth {
        if let Some(value) = inbound.get(AUTHORIZATION) {
            headers.insert(AUTHORIZATION, value.clone());
        }
    }
    if let Some(value) = inbound.get(X_REQUEST_ID) {
        headers.insert(X_REQUEST_ID, value.clone());
    }
    headers
}
