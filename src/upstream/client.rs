//! Outbound client for the downstream service.

use std::time::Duration;

use axum::http::{header, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{RelayError, TimeoutPhase};
use crate::http::request::{FormPayload, X_REQUEST_ID};

/// Error raised while building the client at startup.
#[derive(Debug, Error)]
pub enum UpstreamBuildError {
    #[error("invalid upstream url `{url}`: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build upstream http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Parsed downstream answer.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Forwards form payloads to one fixed downstream URL.
///
/// Cloning is cheap: the inner `reqwest::Client` is reference counted and
/// keeps its connection pool across clones.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    url: Url,
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl UpstreamClient {
    /// Build the client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamBuildError> {
        let url = Url::parse(&config.url).map_err(|source| UpstreamBuildError::Url {
            url: config.url.clone(),
            source,
        })?;

        // Redirects are relayed to the caller, never followed: one inbound
        // request makes exactly one outbound call.
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        let connect_timeout = config.connect_timeout_secs.map(Duration::from_secs);
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let request_timeout = config.request_timeout_secs.map(Duration::from_secs);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            url,
            connect_timeout,
            request_timeout,
        })
    }

    /// The downstream URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST the payload unchanged and parse the reply as JSON.
    ///
    /// The body and `Content-Type` (with its boundary) are sent exactly as
    /// received. Exactly one request is made; failures are never retried.
    pub async fn forward(
        &self,
        payload: FormPayload,
        request_id: &str,
    ) -> Result<UpstreamReply, RelayError> {
        let (content_type, body) = payload.into_parts();

        let response = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, content_type)
            .header(X_REQUEST_ID, request_id)
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;

        tracing::debug!(
            request_id = %request_id,
            status = %status,
            response_bytes = bytes.len(),
            "Upstream responded"
        );

        let body = serde_json::from_slice(&bytes).map_err(RelayError::UpstreamResponseParse)?;
        Ok(UpstreamReply { status, body })
    }

    /// Map a transport error onto the relay taxonomy.
    fn classify(&self, source: reqwest::Error) -> RelayError {
        let url = self.url.to_string();
        if source.is_timeout() {
            let phase = timeout_phase(source.is_connect());
            RelayError::UpstreamTimeout {
                url,
                phase,
                timeout: self.timeout_for(phase),
                source,
            }
        } else if source.is_connect() {
            RelayError::UpstreamUnreachable { url, source }
        } else {
            RelayError::Upstream { url, source }
        }
    }

    /// The configured limit for a phase.
    fn timeout_for(&self, phase: TimeoutPhase) -> Option<Duration> {
        match phase {
            TimeoutPhase::Connect => self.connect_timeout,
            TimeoutPhase::Request => self.request_timeout,
        }
    }
}

/// A timeout raised while connecting is a connect timeout; anything later
/// is the overall request deadline.
fn timeout_phase(during_connect: bool) -> TimeoutPhase {
    if during_connect {
        TimeoutPhase::Connect
    } else {
        TimeoutPhase::Request
    }
}
