// tests/common/mod.rs
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use catalog_api::{config::Config, server::create_app};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use tower::ServiceExt;

/// Config over a private in-memory SQLite database, logging to stdout only
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = HashMap::from([
        ("DB_DRIVER".to_string(), "sqlite".to_string()),
        ("DB_DSN".to_string(), "sqlite::memory:".to_string()),
        ("LOG_TO_FILE".to_string(), "false".to_string()),
    ]);
    for (key, value) in overrides {
        env.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| env.get(key).cloned()).expect("test config")
}

pub async fn test_app(overrides: &[(&str, &str)]) -> Router {
    create_app(&test_config(overrides)).await.expect("app starts")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Value::Null` when empty
    pub body: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    TestResponse { status, headers, body }
}

/// For non-JSON responses such as the docs UI
pub async fn get_text(app: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(request(Method::GET, uri, None))
        .await
        .expect("infallible router");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}

pub fn request(method: Method, uri: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Attach a peer address the way `into_make_service_with_connect_info` does
pub fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, request(Method::GET, uri, None)).await
}

pub async fn post(app: &Router, uri: &str, body: &Value) -> TestResponse {
    send(app, request(Method::POST, uri, Some(body))).await
}

pub async fn put(app: &Router, uri: &str, body: &Value) -> TestResponse {
    send(app, request(Method::PUT, uri, Some(body))).await
}

pub async fn delete(app: &Router, uri: &str) -> TestResponse {
    send(app, request(Method::DELETE, uri, None)).await
}

/// Create a brand and a category, returning their ids
pub async fn seed_relations(app: &Router) -> (i64, i64) {
    let brand = post(
        app,
        "/api/v1/brands",
        &serde_json::json!({ "name": "Acme", "cover_image": "https://x.test/a.png" }),
    )
    .await;
    let category = post(
        app,
        "/api/v1/categories",
        &serde_json::json!({ "title": "Anvils", "cover_image": "https://x.test/c.png" }),
    )
    .await;
    (
        brand.body["data"]["id"].as_i64().expect("brand id"),
        category.body["data"]["id"].as_i64().expect("category id"),
    )
}
