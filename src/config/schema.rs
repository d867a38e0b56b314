//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the API gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Downstream service locations.
    pub services: ServicesConfig,

    /// Retry, fallback and timeout settings for upstream calls.
    pub resilience: ResilienceConfig,

    /// Token validation against the auth service.
    pub auth: AuthConfig,

    /// Startup DNS liveness probing.
    pub health: HealthConfig,

    /// Cross-origin settings for `/api/*`.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Whole-request deadline enforced on inbound requests, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Where each downstream service lives.
///
/// URLs are kept as opaque strings; the resolver only looks at their host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Deployment stack qualifier used to form `{stack}_{service}` hostnames.
    pub stack_name: String,

    pub auth_url: String,
    pub course_url: String,
    pub learning_url: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            stack_name: "learning-platform".to_string(),
            auth_url: "http://localhost:5001".to_string(),
            course_url: "http://localhost:5002".to_string(),
            learning_url: "http://localhost:5003".to_string(),
        }
    }
}

/// Retry and fallback configuration for proxied calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Attempts per candidate base URL.
    pub retries: u32,

    /// Deadline for a single outbound proxy call, in milliseconds.
    pub call_timeout_ms: u64,

    /// Pause between attempts against the same candidate, in milliseconds.
    pub retry_delay_ms: u64,

    /// Largest inbound body buffered for forwarding, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            call_timeout_ms: 10_000,
            retry_delay_ms: 1_000,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Token validation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Apply per-route guards at the gateway before proxying.
    pub enforce_at_gateway: bool,

    /// Deadline for a `/validate` call, in milliseconds.
    pub validate_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enforce_at_gateway: false,
            validate_timeout_ms: 2_000,
        }
    }
}

/// DNS liveness probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Enable the startup resolvability probe.
    pub enabled: bool,

    /// Seconds between probe rounds.
    pub interval_secs: u64,

    /// Give up probing after this many seconds.
    pub max_wait_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 2,
            max_wait_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
