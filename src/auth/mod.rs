//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request on a guarded route
//!     → middleware.rs (extract bearer token)
//!     → client.rs (POST /validate on the auth service, short deadline)
//!     → Identity injected into request extensions
//!     → handler
//! ```
//!
//! Guards are only applied at the gateway when `auth.enforce_at_gateway` is
//! set; downstream services always check tokens themselves.

pub mod client;
pub mod middleware;

pub use client::{AuthClient, AuthError, Identity};
pub use middleware::{require_guard, Guard, GuardState};
