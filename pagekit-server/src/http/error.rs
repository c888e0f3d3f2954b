//! Response mapper
//!
//! Every failure leaves the server as
//! `{"error": {"code": "...", "message": "..."}}`. Status and code come
//! from the [`ErrorKind`], never from the concrete variant.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::decode::DecodeError;
use crate::error::{Error, ErrorKind};
use crate::models::ValidationError;

/// Message shown for every server fault; details stay in the logs
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Response extension marking a server fault.
///
/// Carries the real error text to
/// [`log_server_faults`](super::middleware::log_server_faults), which logs it
/// with the request method and path.
#[derive(Debug, Clone)]
pub struct ServerFault(pub String);

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Any classified domain error
    Domain(Error),

    /// No route matches the path (404)
    RouteNotFound,

    /// Route exists but not for this method (405)
    MethodNotAllowed(Method),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Domain(e) => match e.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict | ErrorKind::InvariantViolation => StatusCode::CONFLICT,
                ErrorKind::Transient | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain(e) => match e.kind() {
                ErrorKind::Validation => "VALIDATION_ERROR",
                ErrorKind::NotFound => "NOT_FOUND",
                ErrorKind::Conflict | ErrorKind::InvariantViolation => "CONFLICT",
                ErrorKind::Transient | ErrorKind::Internal => "SERVER_ERROR",
            },
            Self::RouteNotFound => "NOT_FOUND",
            Self::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Domain(e) if e.kind().is_server_fault() => SERVER_ERROR_MESSAGE.to_owned(),
            Self::Domain(e) => e.to_string(),
            Self::RouteNotFound => "the requested resource could not be found".to_owned(),
            Self::MethodNotAllowed(method) => {
                format!("the {method} method is not supported for this resource")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.message(),
            }
        });

        let mut response = (status, Json(body)).into_response();

        match &self {
            Self::Domain(e) if e.kind().is_server_fault() => {
                response.extensions_mut().insert(ServerFault(e.to_string()));
            }
            Self::Domain(e) => tracing::debug!(kind = ?e.kind(), error = %e, "request rejected"),
            _ => {}
        }

        response
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::Domain(e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Domain(e.into())
    }
}

impl From<DecodeError> for ApiError {
    fn from(e: DecodeError) -> Self {
        Self::Domain(e.into())
    }
}
