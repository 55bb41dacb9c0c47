//! The forwarding handler.
//!
//! ```text
//! inbound POST (multipart)
//!     → FormPayload::extract (buffer, check structure)
//!     → UpstreamClient::forward (one POST, same bytes, same boundary)
//!     → relay_response (downstream JSON, re-serialized)
//! ```

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Extensions, HeaderMap},
    response::{IntoResponse, Response},
};

use crate::error::RelayError;
use crate::http::request::{FormPayload, RequestIdExt};
use crate::http::response::relay_response;
use crate::http::server::AppState;
use crate::observability::{logging::error_chain, metrics};

/// Relay a multipart form to the downstream service and return its JSON.
pub async fn forward_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start_time = Instant::now();
    let request_id = headers.request_id().unwrap_or("unknown").to_string();

    match relay(&state, &headers, extensions, body, &request_id).await {
        Ok(response) => {
            let status = response.status();
            tracing::info!(
                request_id = %request_id,
                status = %status,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Form relayed"
            );
            metrics::record_request(status.as_u16(), "relayed", start_time);
            response
        }
        Err(err) => {
            let status = err.status_code();
            if err.is_client_error() {
                tracing::warn!(
                    request_id = %request_id,
                    status = %status,
                    kind = err.kind(),
                    error = %error_chain(&err),
                    "Rejected inbound form"
                );
            } else {
                tracing::error!(
                    request_id = %request_id,
                    status = %status,
                    kind = err.kind(),
                    error = %error_chain(&err),
                    "Upstream exchange failed"
                );
            }
            metrics::record_request(status.as_u16(), err.kind(), start_time);
            err.into_response()
        }
    }
}

async fn relay(
    state: &AppState,
    headers: &HeaderMap,
    extensions: Extensions,
    body: Result<Bytes, BytesRejection>,
    request_id: &str,
) -> Result<Response, RelayError> {
    let payload = FormPayload::extract(headers, extensions, body, state.max_body_size).await?;

    tracing::debug!(
        request_id = %request_id,
        body_bytes = payload.body_len(),
        upstream = %state.upstream.url(),
        "Forwarding form"
    );

    let reply = state.upstream.forward(payload, request_id).await?;
    Ok(relay_response(reply, state.propagate_status))
}
