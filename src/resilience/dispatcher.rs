//! Retried, fallback-aware delivery of one logical request.
//!
//! # Flow
//! ```text
//! ProxyRequest
//!     → method check (GET/POST/PUT/DELETE, else 405)
//!     → candidate order (qualified alternate first, else primary first)
//!     → for each candidate: up to `retries` attempts
//!           failure, attempts left      → sleep retry_delay, retry
//!           failure, next candidate     → move on, no delay
//!           failure, final candidate    → DispatchError
//!     → first upstream answer           → ProxyResponse
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method};

use crate::observability::metrics;
use crate::resilience::outcome::{DispatchError, ProxyOutcome, ProxyRequest, ProxyResponse};
use crate::resilience::retries::RetryPolicy;
use crate::routing::resolver::ServiceTarget;
use crate::upstream::{Transport, UpstreamRequest};

/// Delivers requests to downstream services through a [`Transport`].
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Deliver `request` to `target`. Without `fallback` only the preferred
    /// base URL is tried.
    pub async fn dispatch(
        &self,
        target: &ServiceTarget,
        fallback: bool,
        request: &ProxyRequest,
    ) -> ProxyOutcome {
        if !is_supported(&request.method) {
            tracing::warn!(method = %request.method, path = %request.path, "Unsupported method");
            return Err(DispatchError::UnsupportedMethod(request.method.clone()));
        }

        let candidates = candidate_order(target, fallback);
        let headers = outbound_headers(&request.headers);
        let body = outbound_body(request);
        let attempts = self.policy.attempts();

        let mut last_error = None;
        for (index, base_url) in candidates.iter().enumerate() {
            let final_candidate = index + 1 == candidates.len();
            let url = join_url(base_url, &request.path);

            for attempt in 1..=attempts {
                let started = Instant::now();
                tracing::debug!(
                    service = %target.service,
                    url = %url,
                    attempt,
                    "Dispatching upstream call"
                );

                let result = self
                    .transport
                    .send(UpstreamRequest {
                        method: request.method.clone(),
                        url: url.clone(),
                        headers: headers.clone(),
                        body: body.clone(),
                        timeout: self.policy.call_timeout,
                    })
                    .await;

                match result {
                    Ok(response) => {
                        metrics::record_attempt(&target.service, "ok", started);
                        return Ok(ProxyResponse::from_upstream(response.status, &response.body));
                    }
                    Err(err) => {
                        metrics::record_attempt(&target.service, "error", started);
                        tracing::info!(
                            service = %target.service,
                            url = %url,
                            attempt,
                            error = %err,
                            "Upstream call failed"
                        );

                        if attempt < attempts {
                            tokio::time::sleep(self.policy.retry_delay).await;
                            last_error = Some(err);
                            continue;
                        }
                        if final_candidate {
                            let failure = DispatchError::exhausted(&err, candidates.clone());
                            tracing::warn!(
                                service = %target.service,
                                status = %failure.status(),
                                error = %failure,
                                "Upstream exhausted"
                            );
                            return Err(failure);
                        }
                        last_error = Some(err);
                    }
                }
            }
        }

        // Only reachable with an empty candidate list, which `candidate_order` never produces.
        Err(DispatchError::Unreachable {
            tried: candidates,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no candidate URLs".to_string()),
        })
    }
}

fn is_supported(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::POST | Method::PUT | Method::DELETE)
}

/// Base URLs to try, in priority order.
///
/// A stack-qualified alternate goes first; a short-name alternate goes last.
/// Without `fallback` the list is cut to its first entry.
pub fn candidate_order(target: &ServiceTarget, fallback: bool) -> Vec<String> {
    let mut candidates = match &target.alternate {
        Some(alternate) if target.alternate_is_qualified => {
            vec![alternate.clone(), target.primary.clone()]
        }
        Some(alternate) => vec![target.primary.clone(), alternate.clone()],
        None => vec![target.primary.clone()],
    };
    if !fallback {
        candidates.truncate(1);
    }
    candidates
}

/// `Content-Type: application/json`, overridden only by a caller header of the same name.
fn outbound_headers(extra: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in extra {
        headers.insert(name.clone(), value.clone());
    }
    headers
}

fn outbound_body(request: &ProxyRequest) -> Option<Bytes> {
    match request.method {
        Method::POST | Method::PUT => request
            .body
            .as_ref()
            .map(|value| Bytes::from(value.to_string())),
        _ => None,
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
