//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use readlater_proxy::{HttpServer, ProxyConfig};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FALLBACK_TOKEN: &str = "fallback-token";

/// Proxy configuration pointing at the mock backend.
pub fn proxy_config(backend: &MockServer) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.backend.api_url = format!("{}/api/graphql", backend.uri());
    config.backend.timeout_secs = 5;
    config.backend.page_size = 2;
    config.auth.fallback_token = FALLBACK_TOKEN.to_string();
    config
}

/// Router for a proxy in front of `backend`.
pub fn proxy_app(backend: &MockServer) -> Router {
    HttpServer::new(proxy_config(backend)).router()
}

/// Expect exactly `times` session creations for `token`.
pub async fn mount_viewer(backend: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(header("authorization", token))
        .and(body_string_contains("query Viewer"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "me": { "id": format!("user-{token}") } } })),
        )
        .expect(times)
        .mount(backend)
        .await;
}

/// A backend search result node.
pub fn article_node(id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Article {id}"),
        "url": format!("https://example.com/{id}"),
        "savedAt": "2024-01-01T12:00:00.000Z",
        "description": format!("About {id}"),
        "isArchived": false
    })
}

/// A single-page search response.
pub fn search_response(nodes: Vec<Value>) -> ResponseTemplate {
    let edges: Vec<Value> = nodes.into_iter().map(|node| json!({ "node": node })).collect();
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "search": {
            "edges": edges,
            "pageInfo": { "hasNextPage": false, "endCursor": null }
        } }
    }))
}

/// POST a JSON body to the proxy.
pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Vec<u8>) {
    post_raw(app, path, "application/json", &body.to_string()).await
}

/// POST a raw body with an explicit content type.
pub async fn post_raw(
    app: &Router,
    path: &str,
    content_type: &str,
    body: &str,
) -> (StatusCode, Vec<u8>) {
    let request = Request::post(path)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

pub fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("response body is JSON")
}
