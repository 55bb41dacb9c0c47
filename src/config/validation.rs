//! Configuration validation.
//!
//! Serde handles syntax; this module checks values: addresses parse, the
//! upstream URL is absolute HTTP(S), timeouts and limits are non-zero.
//! All problems are collected so one run reports every mistake.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// Path reserved for the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.route_path `{0}` must start with `/` and must not be `/health`")]
    InvalidRoutePath(String),

    #[error("upstream.url `{url}` is invalid: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("upstream.url scheme `{0}` is not supported (expected http or https)")]
    UnsupportedUpstreamScheme(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("observability.log_level `{0}` is not a valid level")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let listener = &config.listener;
    if listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(listener.bind_address.clone()));
    }
    if !listener.route_path.starts_with('/') || listener.route_path == HEALTH_PATH {
        errors.push(ValidationError::InvalidRoutePath(listener.route_path.clone()));
    }

    let upstream = &config.upstream;
    match Url::parse(&upstream.url) {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(ValidationError::UnsupportedUpstreamScheme(url.scheme().to_string()));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl {
            url: upstream.url.clone(),
            reason: e.to_string(),
        }),
    }
    if upstream.connect_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroValue("upstream.connect_timeout_secs"));
    }
    if upstream.request_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroValue("upstream.request_timeout_secs"));
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("limits.max_body_size"));
    }

    let observability = &config.observability;
    if observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
