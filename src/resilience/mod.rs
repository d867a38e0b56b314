//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to a downstream service:
//!     → dispatcher.rs (method check, candidate ordering, retry loop)
//!     → retries.rs (attempt bound, per-call deadline, retry delay)
//!     → upstream transport (one call, one deadline)
//!     → outcome.rs (normalize body or classify exhaustion)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Callers never see partial state, only a final response or error
//! - A failed dispatch affects one inbound request, never the process

pub mod dispatcher;
pub mod outcome;
pub mod retries;

pub use dispatcher::{candidate_order, Dispatcher};
pub use outcome::{DispatchError, ProxyOutcome, ProxyRequest, ProxyResponse};
pub use retries::RetryPolicy;
