//! Token validation against the auth service.
//!
//! Contract: `POST /validate` with `{"token": ...}` answers 200 with
//! `{"valid": true, "user": {"id", "username", "role"}}`, or an error status.

use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::resilience::{Dispatcher, ProxyRequest};
use crate::routing::resolver::ServiceTarget;

/// The caller as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub role: String,
}

impl Identity {
    /// Teachers and admins may manage courses and lessons.
    pub fn is_staff(&self) -> bool {
        matches!(self.role.as_str(), "teacher" | "admin")
    }
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    #[serde(default)]
    valid: bool,
    user: Option<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Access denied")]
    Forbidden,

    #[error("Auth service unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// An unreachable auth service rejects the request like a bad token.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Calls the auth service's `/validate` endpoint.
#[derive(Clone)]
pub struct AuthClient {
    dispatcher: Dispatcher,
    target: ServiceTarget,
}

impl AuthClient {
    /// `dispatcher` should carry the short validation policy.
    pub fn new(dispatcher: Dispatcher, target: ServiceTarget) -> Self {
        Self { dispatcher, target }
    }

    pub async fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        let request = ProxyRequest::new(Method::POST, "/validate")
            .with_body(Some(json!({ "token": token })));

        let response = self
            .dispatcher
            .dispatch(&self.target, true, &request)
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if response.status != StatusCode::OK {
            tracing::debug!(status = %response.status, "Token rejected by auth service");
            return Err(AuthError::InvalidToken);
        }

        match serde_json::from_value::<ValidateResponse>(response.body) {
            Ok(ValidateResponse {
                valid: true,
                user: Some(user),
            }) => Ok(user),
            _ => Err(AuthError::InvalidToken),
        }
    }
}
