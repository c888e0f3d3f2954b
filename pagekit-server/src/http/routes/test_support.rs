//! Router harness for handler tests that never reach the database

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use crate::db::pool::{create_lazy_pool, PoolConfig};
use crate::http::server::{build_router, AppState, ServerConfig};

/// Router over a pool that would only connect on first use.
pub(crate) fn app() -> Router {
    let pool = create_lazy_pool("postgres://pagekit@localhost:5432/pagekit_test", &PoolConfig::default())
        .expect("lazy pool");
    build_router(AppState::new(pool, ServerConfig::default()))
}

/// Send one request and return the status and the JSON body (Null if empty).
pub(crate) async fn send(method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_owned())).unwrap_or_else(Body::empty))
        .expect("request");

    let response = app().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };

    (status, json)
}
