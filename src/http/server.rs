//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router from the static route table
//! - Wire up middleware (tracing, request ID, timeout, CORS, guards)
//! - Dispatch each matched route through the resilient dispatcher
//! - Start the DNS probe alongside the server

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::Method,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, MethodFilter, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{require_guard, AuthClient, Guard, GuardState};
use crate::config::validation::dispatch_budget;
use crate::config::GatewayConfig;
use crate::health::DnsProbe;
use crate::http::request::{forwarded_headers, read_json_body};
use crate::http::response::{health, not_found};
use crate::observability::metrics;
use crate::resilience::{DispatchError, Dispatcher, ProxyRequest, RetryPolicy};
use crate::routing::{RouteSpec, Service, ServiceTargets, ROUTES};
use crate::upstream::{HyperTransport, Transport};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub targets: Arc<ServiceTargets>,
    pub dispatcher: Dispatcher,
    pub max_body_bytes: usize,
}

/// HTTP server for the API gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    targets: Arc<ServiceTargets>,
}

impl GatewayServer {
    /// Create a server that reaches downstream services over HTTP.
    pub fn new(config: GatewayConfig) -> Self {
        let transport = Arc::new(HyperTransport::new());
        Self::with_transport(config, transport)
    }

    /// Create a server on top of an explicit transport.
    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn Transport>) -> Self {
        let targets = Arc::new(ServiceTargets::from_config(&config.services));
        for service in Service::ALL {
            let target = targets.get(service);
            tracing::info!(
                service = %service,
                primary = %target.primary,
                alternate = ?target.alternate,
                "Service target resolved"
            );
        }

        let state = AppState {
            targets: targets.clone(),
            dispatcher: Dispatcher::new(transport.clone(), RetryPolicy::from(&config.resilience)),
            max_body_bytes: config.resilience.max_body_bytes,
        };

        let auth = config.auth.enforce_at_gateway.then(|| {
            AuthClient::new(
                Dispatcher::new(transport, RetryPolicy::validation(&config.auth)),
                targets.get(Service::Auth).clone(),
            )
        });

        let router = Self::build_router(&config, state, auth);
        Self {
            router,
            config,
            targets,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, auth: Option<AuthClient>) -> Router {
        let mut api = Router::new();
        for (path, method_router) in route_table(auth) {
            api = api.route(path, method_router.fallback(unsupported_method));
        }

        if config.cors.enabled {
            api = api.layer(
                CorsLayer::new()
                    .allow_origin(AllowOrigin::mirror_request())
                    .allow_methods(AllowMethods::mirror_request())
                    .allow_headers(AllowHeaders::mirror_request())
                    .allow_credentials(true),
            );
        }

        Router::new()
            .route("/health", get(health))
            .merge(api)
            .fallback(|| async { not_found() })
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(request_deadline(config))),
            )
    }

    /// The fully layered router, e.g. for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.health.enabled {
            let probe = DnsProbe::from_targets(&self.targets, &self.config.health);
            let probe_shutdown = shutdown.resubscribe();
            tokio::spawn(async move {
                probe.run(probe_shutdown).await;
            });
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Router-wide deadline: the configured value, raised to a full dispatch plus one second.
fn request_deadline(config: &GatewayConfig) -> Duration {
    let configured = Duration::from_secs(config.listener.request_timeout_secs);
    let floor = dispatch_budget(config) + Duration::from_secs(1);
    if configured < floor {
        tracing::warn!(
            configured_secs = config.listener.request_timeout_secs,
            deadline_ms = floor.as_millis() as u64,
            "Request timeout shorter than dispatch budget, extending"
        );
        return floor;
    }
    configured
}

/// One method router per inbound path, each method guarded as the table says.
fn route_table(auth: Option<AuthClient>) -> BTreeMap<&'static str, MethodRouter<AppState>> {
    let mut by_path: BTreeMap<&'static str, MethodRouter<AppState>> = BTreeMap::new();

    for spec in ROUTES {
        let Some(filter) = method_filter(&spec.method) else {
            tracing::error!(route = spec.name, method = %spec.method, "Route method has no filter");
            continue;
        };

        let handler =
            move |State(state): State<AppState>, request: Request| proxy_route(state, spec, request);
        let mut method_router = MethodRouter::new().on(filter, handler);

        if let Some(client) = auth.as_ref().filter(|_| spec.guard != Guard::Public) {
            let guard_state = GuardState {
                client: client.clone(),
                guard: spec.guard,
            };
            method_router = method_router
                .route_layer(middleware::from_fn_with_state(guard_state, require_guard));
        }

        let merged = match by_path.remove(spec.path) {
            Some(existing) => existing.merge(method_router),
            None => method_router,
        };
        by_path.insert(spec.path, merged);
    }

    by_path
}

/// Known path, unrouted method.
async fn unsupported_method(method: Method) -> Response {
    DispatchError::UnsupportedMethod(method).into_response()
}

fn method_filter(method: &Method) -> Option<MethodFilter> {
    match *method {
        Method::GET => Some(MethodFilter::GET),
        Method::POST => Some(MethodFilter::POST),
        Method::PUT => Some(MethodFilter::PUT),
        Method::DELETE => Some(MethodFilter::DELETE),
        _ => None,
    }
}

/// Forward one matched request to its downstream service.
async fn proxy_route(state: AppState, spec: &'static RouteSpec, request: Request) -> Response {
    let start = Instant::now();
    let path = request.uri().path().to_string();

    let Some(params) = spec.extract_params(&path) else {
        metrics::record_request(spec.method.as_str(), 404, spec.name, start);
        return not_found();
    };

    let (parts, body) = request.into_parts();
    let body = if spec.forward_body {
        match read_json_body(body, state.max_body_bytes).await {
            Ok(body) => body,
            Err(response) => return response,
        }
    } else {
        None
    };

    let proxy_request = ProxyRequest::new(parts.method.clone(), spec.upstream_path(&params))
        .with_body(body)
        .with_headers(forwarded_headers(spec, &parts.headers));

    tracing::debug!(route = spec.name, path = %path, upstream = %proxy_request.path, "Proxying request");

    let target = state.targets.get(spec.service);
    let response = match state
        .dispatcher
        .dispatch(target, spec.fallback, &proxy_request)
        .await
    {
        Ok(upstream) => upstream.into_response(),
        Err(failure) => failure.into_response(),
    };

    metrics::record_request(spec.method.as_str(), response.status().as_u16(), spec.name, start);
    response
}
