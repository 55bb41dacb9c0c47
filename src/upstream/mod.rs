//! Downstream service subsystem.
//!
//! # Data Flow
//! ```text
//! FormPayload (raw multipart bytes + Content-Type)
//!     → client.rs (one POST, optional connect/request timeouts)
//!     → response body parsed as JSON
//!     → UpstreamReply { status, body } or RelayError
//! ```
//!
//! # Design Decisions
//! - No retries: the form is forwarded exactly once
//! - No timeout unless configured; the call waits for the downstream
//! - Transport errors are classified (timeout, connect, other) for status mapping

pub mod client;

pub use client::{UpstreamBuildError, UpstreamClient, UpstreamReply};
