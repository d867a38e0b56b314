//! Route guards.
//!
//! A guard extracts the bearer token, validates it with the auth service and
//! stores the resulting [`Identity`] in the request extensions before the
//! handler runs. Handlers read it with `Extension<Identity>`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::client::{AuthClient, AuthError, Identity};

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Public,
    /// Any valid token.
    Login,
    /// Teachers and admins.
    Staff,
}

/// State handed to [`require_guard`] for one route.
#[derive(Clone)]
pub struct GuardState {
    pub client: AuthClient,
    pub guard: Guard,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Unavailable(reason) = &self {
            tracing::warn!(reason = %reason, "Token validation failed");
        }
        let message = match self {
            AuthError::Unavailable(_) => AuthError::InvalidToken.to_string(),
            ref other => other.to_string(),
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Check `identity` against `guard`.
pub fn permits(guard: Guard, identity: &Identity) -> bool {
    match guard {
        Guard::Public | Guard::Login => true,
        Guard::Staff => identity.is_staff(),
    }
}

pub async fn require_guard(
    State(state): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if state.guard == Guard::Public {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers())
        .map(str::to_owned)
        .ok_or(AuthError::MissingToken)?;
    let identity = state.client.validate(&token).await?;

    if !permits(state.guard, &identity) {
        tracing::info!(
            user_id = identity.id,
            role = %identity.role,
            path = %request.uri().path(),
            "Role not permitted"
        );
        return Err(AuthError::Forbidden);
    }

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_staff_guard() {
        let student = Identity {
            id: 1,
            username: "s".into(),
            role: "student".into(),
        };
        let admin = Identity {
            id: 2,
            username: "a".into(),
            role: "admin".into(),
        };
        assert!(permits(Guard::Login, &student));
        assert!(!permits(Guard::Staff, &student));
        assert!(permits(Guard::Staff, &admin));
    }

    #[test]
    fn test_error_statuses() {
        use axum::http::StatusCode;
        assert_eq!(AuthError::MissingToken.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::Unavailable("down".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    async fn error_body(err: AuthError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_bodies() {
        assert_eq!(
            error_body(AuthError::Forbidden).await,
            json!({"error": "Access denied"})
        );
        assert_eq!(
            error_body(AuthError::MissingToken).await,
            json!({"error": "Authorization required"})
        );
        assert_eq!(
            error_body(AuthError::Unavailable("connection refused".into())).await,
            json!({"error": "Invalid or expired token"})
        );
    }
}
