//! Health subsystem.
//!
//! # Data Flow
//! ```text
//! Startup DNS probe (probe.rs):
//!     Periodic timer (bounded by max_wait)
//!     → Resolve the preferred hostname of each downstream service
//!     → Log progress, export resolvability gauge
//!
//! Liveness endpoint:
//!     GET /health served directly by the gateway (http/server.rs)
//! ```
//!
//! # Design Decisions
//! - The probe is diagnostic only: dispatch never waits on it
//! - Stops on the first fully-resolvable round, on timeout, or on shutdown

pub mod probe;

pub use probe::DnsProbe;
