//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use hookrelay_api::config::ServerConfig;
use hookrelay_api::router::build_app_router;
use hookrelay_api::state::AppState;
use hookrelay_db::MemoryWebhookStore;
use hookrelay_engine::{EngineConfig, WebhookEngine};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and small retry parameters so delivery tests finish quickly.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        webhook_max_retries: 1,
        webhook_base_delay_ms: 10,
        webhook_timeout_secs: 5,
        webhook_signature_header: "X-Webhook-Signature".to_string(),
    }
}

/// Build the full application router backed by an in-memory store.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout,
/// tracing, panic recovery) that production uses. The engine handle is
/// returned too so tests can await delivery outcomes.
pub fn build_test_app() -> (Router, Arc<WebhookEngine>) {
    let config = test_config();
    let store = Arc::new(MemoryWebhookStore::new());

    let engine = Arc::new(WebhookEngine::new(
        store,
        EngineConfig {
            max_retries: config.webhook_max_retries,
            base_delay: Duration::from_millis(config.webhook_base_delay_ms),
            request_timeout: Duration::from_secs(config.webhook_timeout_secs),
            ..EngineConfig::default()
        },
    ));

    let state = AppState {
        engine: Arc::clone(&engine),
        config: Arc::new(config.clone()),
    };

    (build_app_router(state, &config), engine)
}

/// Send a request with an optional JSON body and return the response.
pub async fn request(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    request(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    request(app, Method::POST, uri, Some(body)).await
}

pub async fn patch(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    request(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    request(app, Method::DELETE, uri, None).await
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
