//! HTTP API handlers for frameline-api

pub mod payments;
pub mod projects;
pub mod review;
pub mod server;
pub mod users;

use axum::{http::StatusCode, Json};
use frameline_common::Error;
use serde::Serialize;

/// JSON error body returned by every failing handler
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler-level error: status code plus structured JSON body
pub type ApiError = (StatusCode, Json<ErrorBody>);

/// Convert a domain error into the boundary JSON response.
///
/// 400 validation, 401 signature, 404 missing, 409 duplicate, 502 gateway,
/// 500 anything unexpected. Nothing here is allowed to crash the process.
pub fn error_response(err: Error) -> ApiError {
    let status = match &err {
        Error::InvalidInput(_) | Error::InvalidTransition(_) => StatusCode::BAD_REQUEST,
        Error::SignatureMismatch => StatusCode::UNAUTHORIZED,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Conflict(_) => StatusCode::CONFLICT,
        Error::Gateway(_) => StatusCode::BAD_GATEWAY,
        // Config problems are server faults and must never fail open
        Error::Config(_) | Error::Database(_) | Error::Io(_) | Error::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

/// Shorthand for a 400 validation rejection
pub fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}
