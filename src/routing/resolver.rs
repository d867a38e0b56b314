//! Service target resolution.
//!
//! # Responsibilities
//! - Turn a configured service URL into an ordered pair of candidate base URLs
//! - Recognise the short (`auth-service`) and stack-qualified
//!   (`learning-platform_auth-service`) hostnames of the same service
//!
//! # Design Decisions
//! - Pure and infallible: an unparsable or unrecognised URL simply has no alternate
//! - Only the host is rewritten; scheme, port and path are kept verbatim

use std::fmt;

use url::Url;

use crate::config::ServicesConfig;

/// Downstream services known to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Auth,
    Course,
    Learning,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Auth, Service::Course, Service::Learning];

    /// Short hostname the service is published under.
    pub fn host_name(self) -> &'static str {
        match self {
            Service::Auth => "auth-service",
            Service::Course => "course-service",
            Service::Learning => "learning-service",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

/// Candidate base URLs for one downstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    pub service: String,
    /// The URL as configured.
    pub primary: String,
    /// The same URL under the other naming scheme, when one applies.
    pub alternate: Option<String>,
    /// Whether `alternate` carries the `{stack}_{service}` hostname.
    pub alternate_is_qualified: bool,
}

impl ServiceTarget {
    /// A target with a single base URL.
    pub fn single(service: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            primary: url.into(),
            alternate: None,
            alternate_is_qualified: false,
        }
    }
}

/// Resolve the candidate base URLs for `service` from its configured URL.
pub fn resolve(service: &str, configured_url: &str, stack: &str) -> ServiceTarget {
    let qualified = format!("{}_{}", stack, service);
    let mut target = ServiceTarget::single(service, configured_url);

    let Some(host) = host_of(configured_url) else {
        return target;
    };

    if host == service {
        target.alternate = rewrite_host(configured_url, service, &qualified);
        target.alternate_is_qualified = target.alternate.is_some();
    } else if host == qualified {
        target.alternate = rewrite_host(configured_url, &qualified, service);
    }

    target
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

fn rewrite_host(url: &str, from: &str, to: &str) -> Option<String> {
    let needle = format!("://{}", from);
    if url.contains(&needle) {
        return Some(url.replacen(&needle, &format!("://{}", to), 1));
    }

    // Userinfo or unusual casing hides the plain `://host` form.
    let mut parsed = Url::parse(url).ok()?;
    parsed.set_host(Some(to)).ok()?;
    let mut rewritten = parsed.to_string();
    if !url.ends_with('/') && rewritten.ends_with('/') {
        rewritten.pop();
    }
    Some(rewritten)
}

/// Resolved targets for every downstream service, computed once at startup.
#[derive(Debug, Clone)]
pub struct ServiceTargets {
    auth: ServiceTarget,
    course: ServiceTarget,
    learning: ServiceTarget,
}

impl ServiceTargets {
    pub fn from_config(config: &ServicesConfig) -> Self {
        let stack = &config.stack_name;
        Self {
            auth: resolve(Service::Auth.host_name(), &config.auth_url, stack),
            course: resolve(Service::Course.host_name(), &config.course_url, stack),
            learning: resolve(Service::Learning.host_name(), &config.learning_url, stack),
        }
    }

    pub fn get(&self, service: Service) -> &ServiceTarget {
        match service {
            Service::Auth => &self.auth,
            Service::Course => &self.course,
            Service::Learning => &self.learning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_gets_qualified_alternate() {
        let target = resolve("auth-service", "http://auth-service:5001", "learning-platform");
        assert_eq!(target.primary, "http://auth-service:5001");
        assert_eq!(
            target.alternate.as_deref(),
            Some("http://learning-platform_auth-service:5001")
        );
        assert!(target.alternate_is_qualified);
    }

    #[test]
    fn test_qualified_name_gets_short_alternate() {
        let target = resolve(
            "course-service",
            "http://learning-platform_course-service:5002",
            "learning-platform",
        );
        assert_eq!(target.alternate.as_deref(), Some("http://course-service:5002"));
        assert!(!target.alternate_is_qualified);
    }

    #[test]
    fn test_symmetry_for_every_service() {
        for service in Service::ALL {
            let name = service.host_name();
            let short = format!("http://{}:80", name);
            let forward = resolve(name, &short, "stack");
            let qualified = forward.alternate.clone().unwrap();
            assert_eq!(qualified, format!("http://stack_{}:80", name));

            let back = resolve(name, &qualified, "stack");
            assert_eq!(back.alternate.as_deref(), Some(short.as_str()));
        }
    }

    #[test]
    fn test_unrelated_host_has_no_alternate() {
        let target = resolve("auth-service", "http://localhost:5001", "learning-platform");
        assert_eq!(target.alternate, None);
        assert!(!target.alternate_is_qualified);
    }

    #[test]
    fn test_other_stack_prefix_is_not_recognised() {
        let target = resolve(
            "auth-service",
            "http://staging_auth-service:5001",
            "learning-platform",
        );
        assert_eq!(target.alternate, None);
    }

    #[test]
    fn test_unparsable_url_does_not_fail() {
        let target = resolve("auth-service", "auth-service:5001", "learning-platform");
        assert_eq!(target.primary, "auth-service:5001");
        assert_eq!(target.alternate, None);
    }

    #[test]
    fn test_path_and_port_are_preserved() {
        let target = resolve("learning-service", "http://learning-service:5003/v1", "lp");
        assert_eq!(
            target.alternate.as_deref(),
            Some("http://lp_learning-service:5003/v1")
        );
    }

    #[test]
    fn test_targets_from_config() {
        let config = ServicesConfig {
            stack_name: "learning-platform".into(),
            auth_url: "http://auth-service:5001".into(),
            course_url: "http://localhost:5002".into(),
            learning_url: "http://learning-platform_learning-service:5003".into(),
        };
        let targets = ServiceTargets::from_config(&config);

        assert!(targets.get(Service::Auth).alternate_is_qualified);
        assert_eq!(targets.get(Service::Course).alternate, None);
        assert_eq!(
            targets.get(Service::Learning).alternate.as_deref(),
            Some("http://learning-service:5003")
        );
    }
}
