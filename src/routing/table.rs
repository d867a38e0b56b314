//! Gateway route table.
//!
//! Each entry maps an inbound `(method, path)` to a downstream service and
//! path. Path parameters use axum's `{name}` syntax on both sides.

use std::collections::HashMap;

use axum::http::Method;

use crate::auth::Guard;
use crate::routing::resolver::Service;

#[derive(Debug, Clone)]
pub struct RouteSpec {
    /// Identifier used in logs and metrics.
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub service: Service,
    pub upstream: &'static str,
    /// Copy the client's `Authorization` header to the upstream call.
    pub forward_auth: bool,
    /// Forward the client's JSON body.
    pub forward_body: bool,
    /// Fall back to the service's second hostname; otherwise only the
    /// preferred one is tried.
    pub fallback: bool,
    /// Applied only when gateway-side enforcement is enabled.
    pub guard: Guard,
}

const fn route(
    name: &'static str,
    method: Method,
    path: &'static str,
    service: Service,
    upstream: &'static str,
    guard: Guard,
) -> RouteSpec {
    RouteSpec {
        name,
        method,
        path,
        service,
        upstream,
        forward_auth: true,
        forward_body: false,
        fallback: true,
        guard,
    }
}

const fn with_body(mut spec: RouteSpec) -> RouteSpec {
    spec.forward_body = true;
    spec
}

const fn anonymous(mut spec: RouteSpec) -> RouteSpec {
    spec.forward_auth = false;
    spec
}

const fn no_fallback(mut spec: RouteSpec) -> RouteSpec {
    spec.fallback = false;
    spec
}

use Guard::{Login, Public, Staff};
use Service::{Auth, Course, Learning};

pub static ROUTES: &[RouteSpec] = &[
    // Auth service
    no_fallback(anonymous(with_body(route("auth.register", Method::POST, "/api/auth/register", Auth, "/register", Public)))),
    anonymous(with_body(route("auth.login", Method::POST, "/api/auth/login", Auth, "/login", Public))),
    anonymous(with_body(route("auth.validate", Method::POST, "/api/auth/validate", Auth, "/validate", Public))),
    route("auth.user", Method::GET, "/api/auth/user/{id}", Auth, "/user/{id}", Public),
    // Course service
    route("courses.list", Method::GET, "/api/courses", Course, "/courses", Public),
    route("courses.mine", Method::GET, "/api/courses/my", Course, "/courses/my", Login),
    with_body(route("courses.create", Method::POST, "/api/courses", Course, "/courses", Staff)),
    route("courses.get", Method::GET, "/api/courses/{id}", Course, "/courses/{id}", Public),
    with_body(route("courses.update", Method::PUT, "/api/courses/{id}", Course, "/courses/{id}", Staff)),
    route("courses.delete", Method::DELETE, "/api/courses/{id}", Course, "/courses/{id}", Staff),
    // Learning service
    route("lessons.list", Method::GET, "/api/courses/{id}/lessons", Learning, "/courses/{id}/lessons", Public),
    with_body(route("lessons.create", Method::POST, "/api/courses/{id}/lessons", Learning, "/courses/{id}/lessons", Staff)),
    route("lessons.get", Method::GET, "/api/lessons/{id}", Learning, "/lessons/{id}", Login),
    with_body(route("lessons.update", Method::PUT, "/api/lessons/{id}", Learning, "/lessons/{id}", Staff)),
    route("lessons.delete", Method::DELETE, "/api/lessons/{id}", Learning, "/lessons/{id}", Staff),
    route("courses.enroll", Method::POST, "/api/courses/{id}/enroll", Learning, "/courses/{id}/enroll", Login),
    route("users.enrollments", Method::GET, "/api/users/{id}/enrollments", Learning, "/users/{id}/enrollments", Login),
    route("lessons.complete", Method::POST, "/api/lessons/{id}/complete", Learning, "/lessons/{id}/complete", Login),
];

impl RouteSpec {
    /// Substitute path parameters into the upstream template.
    ///
    /// Unknown placeholders are left untouched.
    pub fn upstream_path(&self, params: &HashMap<String, String>) -> String {
        let mut path = self.upstream.to_string();
        for (name, value) in params {
            path = path.replace(&format!("{{{}}}", name), value);
        }
        path
    }

    /// Capture `{name}` segments of `path` against this route's inbound template.
    ///
    /// Identifiers are numeric; any other value does not match the route.
    pub fn extract_params(&self, path: &str) -> Option<HashMap<String, String>> {
        let template: Vec<&str> = self.path.split('/').collect();
        let actual: Vec<&str> = path.split('/').collect();
        if template.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, value) in template.iter().zip(&actual) {
            match expected.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    params.insert(name.to_string(), value.to_string());
                }
                None if expected == value => {}
                None => return None,
            }
        }
        Some(params)
    }
}
