//! Startup DNS liveness probe.
//!
//! # Responsibilities
//! - Periodically resolve each downstream hostname until all resolve
//! - Report which services are not yet resolvable
//!
//! In a clustered deployment service names appear in DNS some time after the
//! gateway starts; the probe makes that visible in the logs.

use std::time::Duration;

use tokio::net::lookup_host;
use tokio::sync::broadcast;
use tokio::time;
use url::Url;

use crate::config::schema::HealthConfig;
use crate::observability::metrics;
use crate::resilience::candidate_order;
use crate::routing::resolver::{Service, ServiceTargets};

/// A hostname to resolve on behalf of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub service: String,
    pub host: String,
    pub port: u16,
}

pub struct DnsProbe {
    targets: Vec<ProbeTarget>,
    interval: Duration,
    max_wait: Duration,
}

impl DnsProbe {
    pub fn new(targets: Vec<ProbeTarget>, config: &HealthConfig) -> Self {
        Self {
            targets,
            interval: Duration::from_secs(config.interval_secs),
            max_wait: Duration::from_secs(config.max_wait_secs),
        }
    }

    /// Probe the base URL each service would be tried at first.
    pub fn from_targets(services: &ServiceTargets, config: &HealthConfig) -> Self {
        let targets = Service::ALL
            .iter()
            .filter_map(|&service| {
                let target = services.get(service);
                let first = candidate_order(target, true).into_iter().next()?;
                let (host, port) = probe_address(&first)?;
                Some(ProbeTarget {
                    service: target.service.clone(),
                    host,
                    port,
                })
            })
            .collect();
        Self::new(targets, config)
    }

    pub fn targets(&self) -> &[ProbeTarget] {
        &self.targets
    }

    /// Run until every target resolves, `max_wait` elapses, or shutdown fires.
    ///
    /// Returns whether every target became resolvable.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> bool {
        tracing::info!(
            targets = self.targets.len(),
            interval_secs = self.interval.as_secs(),
            max_wait_secs = self.max_wait.as_secs(),
            "DNS probe starting"
        );

        let mut waited = Duration::ZERO;
        while waited < self.max_wait {
            if self.check_all().await {
                tracing::info!("All services are resolvable");
                return true;
            }

            tokio::select! {
                _ = time::sleep(self.interval) => {
                    waited += self.interval;
                }
                _ = shutdown.recv() => {
                    tracing::info!("DNS probe received shutdown signal, exiting loop");
                    return false;
                }
            }
        }

        tracing::warn!("Some services may not be resolvable yet, continuing anyway");
        false
    }

    /// Resolve every target once; stops at the first failure.
    async fn check_all(&self) -> bool {
        for target in &self.targets {
            let resolvable = match lookup_host((target.host.as_str(), target.port)).await {
                Ok(mut addrs) => addrs.next().is_some(),
                Err(e) => {
                    tracing::debug!(host = %target.host, error = %e, "Lookup failed");
                    false
                }
            };
            metrics::record_dns(&target.host, resolvable);

            if !resolvable {
                tracing::info!(
                    service = %target.service,
                    host = %target.host,
                    "Waiting for service to be resolvable"
                );
                return false;
            }
        }
        true
    }
}

/// Host and port of a base URL, defaulting the port from the scheme.
pub fn probe_address(url: &str) -> Option<(String, u16)> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_string();
    let port = parsed.port_or_known_default()?;
    Some((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServicesConfig;
    use crate::lifecycle::Shutdown;

    fn fast() -> HealthConfig {
        HealthConfig {
            enabled: true,
            interval_secs: 1,
            max_wait_secs: 60,
        }
    }

    #[test]
    fn test_probe_address() {
        assert_eq!(
            probe_address("http://auth-service:5001"),
            Some(("auth-service".into(), 5001))
        );
        assert_eq!(probe_address("http://course-service"), Some(("course-service".into(), 80)));
        assert_eq!(probe_address("course-service:5002"), None);
    }

    #[test]
    fn test_probes_preferred_hostname() {
        let services = ServicesConfig {
            stack_name: "learning-platform".into(),
            auth_url: "http://auth-service:5001".into(),
            course_url: "http://localhost:5002".into(),
            learning_url: "http://localhost:5003".into(),
        };
        let probe = DnsProbe::from_targets(&ServiceTargets::from_config(&services), &fast());

        let hosts: Vec<&str> = probe.targets().iter().map(|t| t.host.as_str()).collect();
        assert_eq!(hosts, vec!["learning-platform_auth-service", "localhost", "localhost"]);
    }

    #[tokio::test]
    async fn test_localhost_resolves_immediately() {
        let probe = DnsProbe::new(
            vec![ProbeTarget {
                service: "auth-service".into(),
                host: "localhost".into(),
                port: 5001,
            }],
            &fast(),
        );
        let shutdown = Shutdown::new();
        assert!(probe.run(shutdown.subscribe()).await);
    }

    #[tokio::test]
    async fn test_shutdown_stops_waiting() {
        let probe = DnsProbe::new(
            vec![ProbeTarget {
                service: "auth-service".into(),
                host: "auth-service.invalid".into(),
                port: 5001,
            }],
            &fast(),
        );
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        shutdown.trigger();

        let resolved = time::timeout(Duration::from_secs(30), probe.run(rx))
            .await
            .expect("probe should stop on shutdown");
        assert!(!resolved);
    }
}
