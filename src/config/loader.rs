//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_AUTH_SERVICE_URL: &str = "AUTH_SERVICE_URL";
pub const ENV_COURSE_SERVICE_URL: &str = "COURSE_SERVICE_URL";
pub const ENV_LEARNING_SERVICE_URL: &str = "LEARNING_SERVICE_URL";
pub const ENV_STACK_NAME: &str = "STACK_NAME";
pub const ENV_PORT: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the effective configuration: defaults, then the optional TOML file,
/// then environment overrides. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so the overlay can be exercised without
/// touching process-global state.
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_AUTH_SERVICE_URL) {
        config.services.auth_url = url;
    }
    if let Some(url) = lookup(ENV_COURSE_SERVICE_URL) {
        config.services.course_url = url;
    }
    if let Some(url) = lookup(ENV_LEARNING_SERVICE_URL) {
        config.services.learning_url = url;
    }
    if let Some(stack) = lookup(ENV_STACK_NAME) {
        config.services.stack_name = stack;
    }
    if let Some(port) = lookup(ENV_PORT) {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port.trim());
    }
    config
}
