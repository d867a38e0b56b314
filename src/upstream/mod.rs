//! Upstream transport subsystem.
//!
//! The [`Transport`] trait is the seam between the dispatcher's retry policy
//! and the network, so the policy can be driven by a scripted transport in tests.

pub mod client;

pub use client::{HyperTransport, Transport, TransportError, UpstreamRequest, UpstreamResponse};
