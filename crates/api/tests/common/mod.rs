#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use socialmap_api::auth::jwt::generate_session_token;
use socialmap_api::config::{AuthConfig, ServerConfig};
use socialmap_api::router::build_app_router;
use socialmap_api::state::AppState;

pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";

/// Build a test `ServerConfig` with safe defaults and a plaintext password.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_reads: false,
        auth: AuthConfig {
            password_hash: None,
            plain_password: Some(TEST_PASSWORD.to_string()),
            jwt_secret: "integration-test-secret".to_string(),
            session_ttl_hours: 12,
            secure_cookie: false,
        },
    }
}

/// Build the full application router, exactly as `main.rs` does.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    build_test_app_with_shutdown(pool, config, CancellationToken::new())
}

pub fn build_test_app_with_shutdown(
    pool: PgPool,
    config: ServerConfig,
    shutdown: CancellationToken,
) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        shutdown,
    };
    build_app_router(state, &config)
}

/// A valid session token for [`test_config`].
pub fn token() -> String {
    let (token, _) = generate_session_token(&test_config().auth).unwrap();
    token
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, Some(&token())).await
}

/// Unauthenticated JSON POST.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body), Some(&token())).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body), Some(&token())).await
}

pub async fn delete_auth(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None, Some(&token())).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an idea over HTTP and return its id.
pub async fn create_idea(app: Router, title: &str, platform: &str) -> i64 {
    let response = post_json_auth(
        app,
        "/ideas",
        serde_json::json!({ "title": title, "platform": platform }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}
