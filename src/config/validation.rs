//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Service URLs stay opaque; only emptiness is rejected

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::schema::GatewayConfig;
use crate::resilience::RetryPolicy;

/// Base URLs a single dispatch can try: the configured one and its alternate.
const MAX_CANDIDATES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),

    #[error("service URL for `{0}` is empty")]
    EmptyServiceUrl(&'static str),

    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),

    #[error(
        "`listener.request_timeout_secs` ({timeout_secs}s) must exceed the worst-case \
         dispatch time of {budget_ms}ms"
    )]
    RequestTimeoutTooShort { timeout_secs: u64, budget_ms: u128 },
}

/// Worst case for one proxied request: the full retry schedule over both
/// candidates, plus the token check when guards run at the gateway.
pub fn dispatch_budget(config: &GatewayConfig) -> Duration {
    let mut budget = RetryPolicy::from(&config.resilience).budget(MAX_CANDIDATES);
    if config.auth.enforce_at_gateway {
        budget += RetryPolicy::validation(&config.auth).budget(MAX_CANDIDATES);
    }
    budget
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let services = [
        ("auth", &config.services.auth_url),
        ("course", &config.services.course_url),
        ("learning", &config.services.learning_url),
    ];
    for (name, url) in services {
        if url.trim().is_empty() {
            errors.push(ValidationError::EmptyServiceUrl(name));
        }
    }

    if config.resilience.retries == 0 {
        errors.push(ValidationError::Zero("resilience.retries"));
    }
    if config.resilience.call_timeout_ms == 0 {
        errors.push(ValidationError::Zero("resilience.call_timeout_ms"));
    }
    if config.auth.validate_timeout_ms == 0 {
        errors.push(ValidationError::Zero("auth.validate_timeout_ms"));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("listener.request_timeout_secs"));
    } else {
        let budget = dispatch_budget(config);
        if Duration::from_secs(config.listener.request_timeout_secs) <= budget {
            errors.push(ValidationError::RequestTimeoutTooShort {
                timeout_secs: config.listener.request_timeout_secs,
                budget_ms: budget.as_millis(),
            });
        }
    }
    if config.health.enabled && config.health.interval_secs == 0 {
        errors.push(ValidationError::Zero("health.interval_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.services.course_url = "   ".into();
        config.resilience.retries = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("not-an-address".into()),
                ValidationError::EmptyServiceUrl("course"),
                ValidationError::Zero("resilience.retries"),
            ]
        );
    }

    #[test]
    fn test_request_timeout_must_outlast_dispatch() {
        let mut config = GatewayConfig::default();
        config.resilience.call_timeout_ms = 800;
        config.listener.request_timeout_secs = 1;

        // 2 candidates x (3 x 800ms + 2 x 1000ms)
        assert_eq!(dispatch_budget(&config), Duration::from_millis(8_800));
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::RequestTimeoutTooShort {
                timeout_secs: 1,
                budget_ms: 8_800,
            }]
        );

        config.listener.request_timeout_secs = 9;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_gateway_auth_extends_budget() {
        let mut config = GatewayConfig::default();
        let proxy_only = dispatch_budget(&config);
        config.auth.enforce_at_gateway = true;
        assert_eq!(dispatch_budget(&config), proxy_only + Duration::from_secs(4));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_service_url_syntax_is_not_checked() {
        let mut config = GatewayConfig::default();
        config.services.auth_url = "auth-service:5001".into();
        assert!(validate_config(&config).is_ok());
    }
}
