//! Liveness and readiness
//!
//! `/health` answers without touching storage. `/health/ready` also
//! round-trips to Postgres and fails with the usual error envelope.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db::Deadline;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    fn with_status(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// GET /health
async fn live() -> Json<HealthResponse> {
    Json(HealthResponse::with_status("ok"))
}

/// GET /health/ready
async fn ready(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
) -> Result<Json<HealthResponse>, ApiError> {
    state.engine.ping(&deadline).await?;
    Ok(Json(HealthResponse::with_status("ready")))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(live))
        .route("/health/ready", get(ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::routes::test_support::send;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn liveness_needs_no_database() {
        let (status, body) = send(Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn health_is_read_only() {
        let (status, body) = send(Method::POST, "/health", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
    }
}
