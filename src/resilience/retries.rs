//! Retry policy.
//!
//! # Responsibilities
//! - Bound the number of attempts per candidate base URL
//! - Fix the per-call deadline and the pause between attempts
//!
//! # Design Decisions
//! - Every transport failure (connect, timeout, other) is retryable
//! - Fixed delay between attempts on the same candidate, none when switching candidates
//! - At least one attempt is always made

use std::time::Duration;

use crate::config::{AuthConfig, ResilienceConfig};

/// Deadline for calls proxied on behalf of a client.
pub const PROXY_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for internal token validation calls.
pub const VALIDATION_CALL_TIMEOUT: Duration = Duration::from_secs(2);

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per candidate.
    pub retries: u32,
    pub call_timeout: Duration,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Policy used for token validation: a single short attempt.
    pub fn validation(config: &AuthConfig) -> Self {
        Self {
            retries: 1,
            call_timeout: Duration::from_millis(config.validate_timeout_ms),
            retry_delay: Duration::ZERO,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.retries.max(1)
    }

    /// Longest a dispatch over `candidates` base URLs can take before it
    /// yields a final answer.
    pub fn budget(&self, candidates: u32) -> Duration {
        let attempts = self.attempts();
        let per_candidate = self.call_timeout * attempts + self.retry_delay * (attempts - 1);
        per_candidate * candidates
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            call_timeout: PROXY_CALL_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl From<&ResilienceConfig> for RetryPolicy {
    fn from(config: &ResilienceConfig) -> Self {
        Self {
            retries: config.retries,
            call_timeout: Duration::from_millis(config.call_timeout_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}
