//! Common test utilities

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

use fintrack::api::{build_router, AppState};
use fintrack::auth::JwtService;
use fintrack::db;

pub const TEST_JWT_SECRET: &str = "test-secret-not-for-production";

/// Build an application instance over a fresh in-memory database.
///
/// The pool is capped at one connection; a second connection would see
/// its own empty in-memory database.
pub async fn spawn_app() -> Router {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("failed to open in-memory database");
    db::init_schema(&pool)
        .await
        .expect("failed to create schema");

    let jwt = JwtService::new(TEST_JWT_SECRET, 900, 604800);
    build_router(AppState { pool, jwt })
}

/// Build a JSON request, optionally with a bearer token.
pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

/// Build a request with no body.
pub fn bare_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("failed to build request")
}

/// Run one request through the app and parse the response as JSON.
/// Empty bodies come back as `Value::Null`.
pub async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body was not valid JSON")
    };
    (status, json)
}

/// Like `call` but keeps the raw headers and body text, for the export
/// endpoints.
pub async fn call_raw(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let text = String::from_utf8(bytes.to_vec()).expect("body was not UTF-8");
    (status, headers, text)
}

/// Register a user, returning its id.
pub async fn register_user(app: &Router, username: &str, password: &str) -> i64 {
    let (status, body) = call(
        app,
        json_request(
            Method::POST,
            "/api/users",
            None,
            &serde_json::json!({"username": username, "password": password}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
    body["id"].as_i64().expect("user id missing")
}

/// Log in, returning (access, refresh).
pub async fn login(app: &Router, username: &str, password: &str) -> (String, String) {
    let (status, body) = call(
        app,
        json_request(
            Method::POST,
            "/api/token",
            None,
            &serde_json::json!({"username": username, "password": password}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let access = body["access"].as_str().expect("access token missing");
    let refresh = body["refresh"].as_str().expect("refresh token missing");
    (access.to_string(), refresh.to_string())
}

/// Register and log in a fresh user, returning an access token.
pub async fn authenticate(app: &Router, username: &str) -> String {
    register_user(app, username, "password123").await;
    let (access, _refresh) = login(app, username, "password123").await;
    access
}
