//! Multipart form relay.
//!
//! Accepts `POST /api/process` with a `multipart/form-data` body, forwards
//! the body unchanged to a fixed downstream service and answers with the
//! downstream's JSON.
//!
//! ```text
//!     Client ──POST multipart──▶ http::server ──▶ http::forward
//!                                                    │
//!                                                    ▼
//!                                              upstream::client ──POST──▶ Downstream
//!                                                    │                   (localhost:8000)
//!     Client ◀──────JSON──────── http::response ◀────┘
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::RelayConfig;
pub use error::RelayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
