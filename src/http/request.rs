//! Request handling.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the caller sent none
//! - Read the request ID back out of headers for logging and forwarding
//! - Extract the inbound multipart body as an opaque [`FormPayload`]
//!
//! # Design Decisions
//! - The body is buffered once and forwarded byte-for-byte
//! - Multipart structure is checked on a copy; fields are never rewritten

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, FromRequest, Multipart, Request},
    http::{header, Extensions, HeaderMap, HeaderValue, StatusCode},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::RelayError;

/// Header carrying the correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read access to the correlation ID.
pub trait RequestIdExt {
    /// The `x-request-id` value, if present and valid UTF-8.
    fn request_id(&self) -> Option<&str>;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> Option<&str> {
        self.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }
}

/// An inbound `multipart/form-data` body, held opaquely.
#[derive(Debug, Clone)]
pub struct FormPayload {
    content_type: HeaderValue,
    body: Bytes,
}

impl FormPayload {
    /// Build a payload from the buffered body of an inbound request.
    ///
    /// `extensions` must be the inbound request's extensions so the multipart
    /// check sees the same body limit the buffering did.
    pub async fn extract(
        headers: &HeaderMap,
        extensions: Extensions,
        body: Result<Bytes, BytesRejection>,
        limit: usize,
    ) -> Result<Self, RelayError> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .cloned()
            .ok_or_else(|| RelayError::UnsupportedContentType("<none>".to_string()))?;
        if !is_multipart_form(&content_type) {
            return Err(RelayError::UnsupportedContentType(
                String::from_utf8_lossy(content_type.as_bytes()).into_owned(),
            ));
        }

        let body = body.map_err(|rejection| match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => RelayError::BodyTooLarge { limit },
            _ => RelayError::BodyRead(rejection.body_text()),
        })?;

        if body.is_empty() {
            return Err(RelayError::BodyRead("request body is empty".to_string()));
        }

        check_multipart(&content_type, extensions, body.clone()).await?;

        Ok(Self { content_type, body })
    }

    /// Size of the body in bytes.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// The `Content-Type` header (boundary included) and the raw body.
    pub fn into_parts(self) -> (HeaderValue, Bytes) {
        (self.content_type, self.body)
    }
}

/// `multipart/form-data` with a non-empty `boundary` parameter.
fn is_multipart_form(content_type: &HeaderValue) -> bool {
    let Ok(value) = content_type.to_str() else {
        return false;
    };
    let mut params = value.split(';');
    let essence = params.next().unwrap_or_default().trim();
    if !essence.eq_ignore_ascii_case("multipart/form-data") {
        return false;
    }
    params.any(|param| match param.trim().split_once('=') {
        Some((name, boundary)) => {
            name.trim().eq_ignore_ascii_case("boundary")
                && !boundary.trim().trim_matches('"').is_empty()
        }
        None => false,
    })
}

/// Walk every field of the body so truncated or garbled input is rejected
/// before anything goes upstream.
async fn check_multipart(
    content_type: &HeaderValue,
    extensions: Extensions,
    body: Bytes,
) -> Result<(), RelayError> {
    let mut request = Request::new(Body::from(body));
    *request.extensions_mut() = extensions;
    request
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type.clone());

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| RelayError::BodyRead(rejection.body_text()))?;

    let mut fields = 0usize;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::BodyRead(e.body_text()))?
    {
        field
            .bytes()
            .await
            .map_err(|e| RelayError::BodyRead(e.body_text()))?;
        fields += 1;
    }

    tracing::trace!(fields, "Multipart body is well-formed");
    Ok(())
}
