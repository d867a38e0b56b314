//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, CORS, guards)
//!     → request.rs (read JSON body, select forwarded headers)
//!     → [dispatcher tries primary/alternate candidates]
//!     → response.rs / resilience outcome (JSON body + status)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, GatewayServer};
