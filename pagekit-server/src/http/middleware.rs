//! Fault logging and panic recovery

use std::any::Any;

use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::{ApiError, ServerFault};
use crate::error::Error;

/// Log server faults with the request method and path.
///
/// Caller-correctable failures carry no [`ServerFault`] and are not logged
/// here.
pub async fn log_server_faults(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;

    if let Some(ServerFault(detail)) = response.extensions().get::<ServerFault>() {
        tracing::error!(
            %method,
            %path,
            status = response.status().as_u16(),
            error = %detail,
            "request failed"
        );
    }

    response
}

/// `CatchPanicLayer` handler: the panic becomes a `SERVER_ERROR` envelope.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "unknown panic payload".to_owned()
    };

    ApiError::from(Error::internal(format!("handler panicked: {detail}"))).into_response()
}

/// Router fallback for unmatched paths
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Router fallback for a known path with an unsupported method
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn panic_becomes_server_error() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let fault = response.extensions().get::<ServerFault>().unwrap();
        assert!(fault.0.contains("boom"));
    }

    #[test]
    fn owned_panic_message_is_kept() {
        let response = panic_response(Box::new(String::from("index out of bounds")));
        let fault = response.extensions().get::<ServerFault>().unwrap();
        assert!(fault.0.contains("index out of bounds"));
    }
}
