//! API gateway for the learning platform.
//!
//! Routes `/api/...` requests to the auth, course and learning services,
//! retrying each downstream call and falling back between a short and a
//! stack-qualified hostname.

pub mod auth;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
