//! End-to-end HTTP scenarios against a real database

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pagekit_server::{build_router, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let engine = common::engine().await;
    let state = pagekit_server::http::AppState::new(engine.pool().clone(), ServerConfig::default());
    build_router(state)
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: Value,
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Reply {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_owned());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    Reply {
        status,
        location,
        body,
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn second_home_page_takes_over() {
    let app = app().await;
    let slug = common::unique_slug("shop");

    let store = call(&app, Method::POST, "/stores", Some(json!({"name": "Shop", "slug": slug}))).await;
    assert_eq!(store.status, StatusCode::CREATED);
    let store_id = store.body["id"].as_str().unwrap().to_owned();
    assert_eq!(store.location.as_deref(), Some(format!("/stores/{store_id}").as_str()));

    let pages_uri = format!("/stores/{store_id}/pages");
    let home = call(
        &app,
        Method::POST,
        &pages_uri,
        Some(json!({"name": "Home", "route": "/", "is_home": true})),
    )
    .await;
    assert_eq!(home.status, StatusCode::CREATED);
    assert_eq!(home.body["is_home"], json!(true));
    let home_uri = home.location.unwrap();

    let about = call(
        &app,
        Method::POST,
        &pages_uri,
        Some(json!({"name": "About", "route": "/about", "is_home": true})),
    )
    .await;
    assert_eq!(about.status, StatusCode::CREATED);
    assert_eq!(about.body["is_home"], json!(true));

    let first = call(&app, Method::GET, &home_uri, None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["is_home"], json!(false));
    assert_eq!(first.body["widgets"], json!([]));

    // the old home page can now be deleted, the new one cannot
    let deleted = call(&app, Method::DELETE, &home_uri, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let about_uri = about.location.unwrap();
    let refused = call(&app, Method::DELETE, &about_uri, None).await;
    assert_eq!(refused.status, StatusCode::CONFLICT);
    assert_eq!(refused.body["error"]["code"], "CONFLICT");
    assert_eq!(refused.body["error"]["message"], "cannot delete home page");
}

#[tokio::test]
#[ignore = "requires database"]
async fn widget_lifecycle_over_http() {
    let app = app().await;
    let slug = common::unique_slug("widgets");

    let store = call(&app, Method::POST, "/stores", Some(json!({"name": "W", "slug": slug}))).await;
    let store_id = store.body["id"].as_str().unwrap().to_owned();
    let page = call(
        &app,
        Method::POST,
        &format!("/stores/{store_id}/pages"),
        Some(json!({"name": "Landing", "route": "/landing"})),
    )
    .await;
    let page_id = page.body["id"].as_str().unwrap().to_owned();
    let widgets_uri = format!("/pages/{page_id}/widgets");

    let mut ids = Vec::new();
    for kind in ["banner", "text", "image"] {
        let created = call(
            &app,
            Method::POST,
            &widgets_uri,
            Some(json!({"type": kind, "config": {"title": kind}})),
        )
        .await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(created.body["position"], json!(ids.len()));
        ids.push(created.body["id"].as_str().unwrap().to_owned());
    }

    let reordered = call(
        &app,
        Method::POST,
        &format!("{widgets_uri}/reorder"),
        Some(json!({"widget_ids": [ids[2], ids[0], ids[1]]})),
    )
    .await;
    assert_eq!(reordered.status, StatusCode::OK);
    let order: Vec<&str> = reordered
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec![ids[2].as_str(), ids[0].as_str(), ids[1].as_str()]);

    let subset = call(
        &app,
        Method::POST,
        &format!("{widgets_uri}/reorder"),
        Some(json!({"widget_ids": [ids[0]]})),
    )
    .await;
    assert_eq!(subset.status, StatusCode::CONFLICT);

    let patched = call(
        &app,
        Method::PATCH,
        &format!("/widgets/{}", ids[0]),
        Some(json!({"config": null})),
    )
    .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.body["config"], Value::Null);
    assert_eq!(patched.body["type"], json!("banner"));

    let gone = call(&app, Method::DELETE, &format!("/widgets/{}", ids[2]), None).await;
    assert_eq!(gone.status, StatusCode::NO_CONTENT);

    let listed = call(&app, Method::GET, &widgets_uri, None).await;
    let positions: Vec<i64> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![0, 1]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_slug_is_409() {
    let app = app().await;
    let slug = common::unique_slug("dup");

    let first = call(&app, Method::POST, "/stores", Some(json!({"name": "A", "slug": slug}))).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = call(&app, Method::POST, "/stores", Some(json!({"name": "B", "slug": slug}))).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"]["message"], "store slug already exists");
}

#[tokio::test]
#[ignore = "requires database"]
async fn missing_store_is_404() {
    let app = app().await;
    let uri = format!("/stores/{}", uuid::Uuid::new_v4());

    let reply = call(&app, Method::GET, &uri, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["error"]["message"], "store not found");
}

#[tokio::test]
#[ignore = "requires database"]
async fn readiness_reaches_the_database() {
    let app = app().await;

    let reply = call(&app, Method::GET, "/health/ready", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "ready");
}
