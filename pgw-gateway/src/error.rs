//! Error types for pgw-gateway
//!
//! [`ApiError`] is the only error rendered to HTTP clients. Every response body
//! is `{error, message}` with a stable code; internal detail goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pgw_common::api::ErrorBody;
use pgw_common::{ErrorClass, UpstreamError};
use std::any::Any;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::auth_gate::AuthRejection;
use crate::services::enrichment::EnrichmentError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed caller input (400)
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed or invalid credentials (401)
    #[error(transparent)]
    Auth(#[from] AuthRejection),

    /// Backing service unreachable, slow or failing (503)
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// Backing service answered with a 4xx; status passes through
    #[error("{message}")]
    UpstreamRejected { status: u16, message: String },

    /// Unanticipated failure (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn from_class(class: ErrorClass, message: String) -> Self {
        match class {
            ErrorClass::Validation => ApiError::Validation(message),
            ErrorClass::Unavailable => ApiError::UpstreamUnavailable(message),
            ErrorClass::Rejected(status) => ApiError::UpstreamRejected { status, message },
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::from_class(err.class(), err.to_string())
    }
}

impl From<EnrichmentError> for ApiError {
    fn from(err: EnrichmentError) -> Self {
        ApiError::from_class(err.class(), err.to_string())
    }
}

/// Response for a handler that panicked
///
/// Installed through `CatchPanicLayer::custom`; the panic payload is logged,
/// never rendered.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(format!("Handler panicked: {}", detail)).into_response()
}

/// Error code for an upstream status passed through to the client
pub fn error_code_for_status(status: u16) -> &'static str {
    match status {
        400 => "bad_request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not_found",
        _ => "upstream_error",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "invalid_parameters", msg),
            ApiError::Auth(rejection) => (
                StatusCode::UNAUTHORIZED,
                rejection.code(),
                rejection.to_string(),
            ),
            ApiError::UpstreamUnavailable(msg) => {
                warn!(error = %msg, "Backend service unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
            ApiError::UpstreamRejected { status, message } => {
                warn!(status, error = %message, "Backend error response");
                let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (code, error_code_for_status(status), message)
            }
            ApiError::Internal(detail) => {
                error!(error = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            error: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
