//! Failure taxonomy for a single relayed request.
//!
//! Every variant aborts the in-flight request; nothing is retried. The HTTP
//! mapping lives in [`crate::http::response`].

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Why a relayed request failed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound body missing, interrupted or not well-formed multipart.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// Inbound `Content-Type` is not `multipart/form-data` with a boundary.
    #[error("unsupported content type `{0}`")]
    UnsupportedContentType(String),

    /// Inbound body exceeds the configured limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The downstream service could not be connected to.
    #[error("upstream {url} is unreachable")]
    UpstreamUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A connect or request timeout elapsed.
    #[error("upstream {url} {phase} timed out{}", describe_limit(.timeout))]
    UpstreamTimeout {
        url: String,
        phase: TimeoutPhase,
        /// The configured limit for `phase`, if one was set.
        timeout: Option<Duration>,
        #[source]
        source: reqwest::Error,
    },

    /// Any other transport failure, such as the connection dropping mid-response.
    #[error("upstream request to {url} failed")]
    Upstream {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The downstream body is not valid JSON.
    #[error("upstream response is not valid JSON")]
    UpstreamResponseParse(#[source] serde_json::Error),
}

/// Which stage of the upstream exchange ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    Connect,
    Request,
}

impl std::fmt::Display for TimeoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutPhase::Connect => write!(f, "connect"),
            TimeoutPhase::Request => write!(f, "request"),
        }
    }
}

fn describe_limit(timeout: &Option<Duration>) -> String {
    match timeout {
        Some(limit) => format!(" after {:?}", limit),
        None => String::new(),
    }
}

impl RelayError {
    /// Status code returned to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::BodyRead(_) => StatusCode::BAD_REQUEST,
            RelayError::UnsupportedContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RelayError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
            RelayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            RelayError::UpstreamResponseParse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable machine-readable name, used in error bodies and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::BodyRead(_) => "body_read",
            RelayError::UnsupportedContentType(_) => "unsupported_content_type",
            RelayError::BodyTooLarge { .. } => "body_too_large",
            RelayError::UpstreamUnreachable { .. } => "upstream_unreachable",
            RelayError::UpstreamTimeout { .. } => "upstream_timeout",
            RelayError::Upstream { .. } => "upstream_error",
            RelayError::UpstreamResponseParse(_) => "upstream_response_parse",
        }
    }

    /// Message safe to show the caller. Addresses and source errors stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::BodyRead(reason) => format!("Failed to read multipart body: {}", reason),
            RelayError::UnsupportedContentType(_) => {
                "Expected a multipart/form-data body with a boundary".to_string()
            }
            RelayError::BodyTooLarge { limit } => {
                format!("Request body exceeds the {} byte limit", limit)
            }
            RelayError::UpstreamUnreachable { .. } => "Upstream service is unreachable".to_string(),
            RelayError::UpstreamTimeout { .. } => "Upstream service timed out".to_string(),
            RelayError::Upstream { .. } => "Upstream request failed".to_string(),
            RelayError::UpstreamResponseParse(_) => {
                "Upstream service returned an invalid JSON response".to_string()
            }
        }
    }

    /// True when the caller sent something we could not accept.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_errors_are_client_errors() {
        let errors = [
            RelayError::BodyRead("empty".into()),
            RelayError::UnsupportedContentType("text/plain".into()),
            RelayError::BodyTooLarge { limit: 10 },
        ];
        for err in errors {
            assert!(err.is_client_error(), "{} should be a client error", err.kind());
        }
    }

    #[test]
    fn test_parse_error_is_gateway_error() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = RelayError::UpstreamResponseParse(source);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.kind(), "upstream_response_parse");
        assert!(!err.public_message().contains("<html>"));
    }

    fn builder_error() -> reqwest::Error {
        reqwest::Client::new().get("not a url").build().unwrap_err()
    }

    #[test]
    fn test_timeout_message_names_phase_and_limit() {
        let err = RelayError::UpstreamTimeout {
            url: "http://localhost:8000/api/process".into(),
            phase: TimeoutPhase::Connect,
            timeout: Some(Duration::from_secs(5)),
            source: builder_error(),
        };
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            err.to_string(),
            "upstream http://localhost:8000/api/process connect timed out after 5s"
        );

        let err = RelayError::UpstreamTimeout {
            url: "http://localhost:8000/api/process".into(),
            phase: TimeoutPhase::Request,
            timeout: None,
            source: builder_error(),
        };
        assert_eq!(
            err.to_string(),
            "upstream http://localhost:8000/api/process request timed out"
        );
    }

    #[test]
    fn test_body_too_large_message_names_limit() {
        let err = RelayError::BodyTooLarge { limit: 1024 };
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.public_message().contains("1024"));
    }
}
