//! Response construction.
//!
//! # Responsibilities
//! - Turn the downstream JSON into the handler's own JSON response
//! - Map [`RelayError`] to a status code and a JSON error body
//!
//! # Design Decisions
//! - The downstream value is re-serialized, so whitespace is not preserved
//! - Error bodies carry a fixed public message; details go to the log

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::upstream::UpstreamReply;

/// JSON body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<&RelayError> for ErrorBody {
    fn from(err: &RelayError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.public_message(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::from(&self))).into_response()
    }
}

/// Build the caller's response from the downstream reply.
///
/// With `propagate_status` off the caller always sees 200, whatever the
/// downstream answered.
pub fn relay_response(reply: UpstreamReply, propagate_status: bool) -> Response {
    let status = if propagate_status {
        reply.status
    } else {
        StatusCode::OK
    };
    (status, Json(reply.body)).into_response()
}
