//! Dispatch inputs and outcomes.
//!
//! A dispatch yields either a [`ProxyResponse`] (the upstream answered, whatever
//! its status) or a [`DispatchError`] once every candidate and retry is spent.
//! Both render directly as client responses.

use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::upstream::TransportError;

/// Marker placed in the synthetic payload for non-JSON upstream bodies.
pub const MALFORMED_BODY_ERROR: &str = "Invalid response from service";

/// A request to deliver to one downstream service.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Appended to the chosen base URL, e.g. `/courses/7`.
    pub path: String,
    pub body: Option<Value>,
    /// Merged over the default `Content-Type: application/json`.
    pub headers: HeaderMap,
}

impl ProxyRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// The upstream answered; `body` is its JSON, or a synthetic error payload
/// when the body was not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ProxyResponse {
    /// Interpret a raw upstream body.
    pub fn from_upstream(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(body) => Self { status, body },
            Err(_) => Self {
                status,
                body: json!({
                    "error": MALFORMED_BODY_ERROR,
                    "status_code": status.as_u16(),
                }),
            },
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.body.get("error").and_then(Value::as_str) == Some(MALFORMED_BODY_ERROR)
            && self.body.get("status_code").is_some()
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Terminal dispatch failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Method {0} is not supported")]
    UnsupportedMethod(Method),

    #[error(
        "Could not connect to service. Tried: {}. Error: {last_error}. \
         Check that the service is running and reachable.",
        .tried.join(", ")
    )]
    Unreachable { tried: Vec<String>, last_error: String },

    #[error("Timed out connecting to service. Tried: {}. Error: {last_error}", .tried.join(", "))]
    Timeout { tried: Vec<String>, last_error: String },

    #[error("Error communicating with service. Tried: {}. Error: {last_error}", .tried.join(", "))]
    Protocol { tried: Vec<String>, last_error: String },
}

impl DispatchError {
    /// Classify the last transport failure once every candidate is exhausted.
    pub fn exhausted(last: &TransportError, tried: Vec<String>) -> Self {
        let last_error = last.to_string();
        match last {
            TransportError::Connect(_) => Self::Unreachable { tried, last_error },
            TransportError::Timeout(_) => Self::Timeout { tried, last_error },
            TransportError::Other(_) => Self::Protocol { tried, last_error },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unreachable { .. } | Self::Protocol { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Candidate base URLs attempted before giving up.
    pub fn tried(&self) -> &[String] {
        match self {
            Self::UnsupportedMethod(_) => &[],
            Self::Unreachable { tried, .. }
            | Self::Timeout { tried, .. }
            | Self::Protocol { tried, .. } => tried,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result of one complete dispatch.
pub type ProxyOutcome = Result<ProxyResponse, DispatchError>;
