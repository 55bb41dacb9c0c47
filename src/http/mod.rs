//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span, body limit)
//!     → forward.rs (forwarding handler)
//!         → request.rs (buffer multipart body)
//!         → [upstream client]
//!         → response.rs (JSON reply or JSON error)
//!     → Send to client
//! ```

pub mod forward;
pub mod health;
pub mod request;
pub mod response;
pub mod server;

pub use request::{FormPayload, RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use response::ErrorBody;
pub use server::{AppState, HttpServer};
