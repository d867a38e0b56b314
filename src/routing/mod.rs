//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ServicesConfig
//!     → resolver.rs (primary + alternate base URL per service)
//!     → ServiceTargets (immutable, shared via Arc)
//!
//! Per request:
//!     (method, path template)
//!     → table.rs (service, upstream path, header/body forwarding, guard)
//!     → dispatcher
//! ```
//!
//! # Design Decisions
//! - Routes are static data, compiled into the axum router at startup
//! - Deterministic: same configuration always yields the same candidates

pub mod resolver;
pub mod table;

pub use resolver::{resolve, Service, ServiceTarget, ServiceTargets};
pub use table::{RouteSpec, ROUTES};
