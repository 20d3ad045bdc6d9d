//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use fake_api_server::catalog::{CatalogFile, InMemoryStore};
use fake_api_server::{HttpServer, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "test-admin-key";

/// Two tenants, one of them on a custom domain, with endpoints covering
/// body, query and path bindings.
pub fn catalog() -> CatalogFile {
    serde_json::from_value(json!({
        "tenants": [
            {"id": "acme", "name": "Acme", "customDomain": "api.acme.test"},
            {"id": "globex", "name": "Globex"}
        ],
        "endpoints": [
            {
                "id": "echo",
                "tenantId": "acme",
                "method": "POST",
                "pathTemplate": "/echo",
                "responseTemplate": {"id": "", "echo": {}},
                "dynamicFields": {"echo": {"source": "body", "path": "msg"}}
            },
            {
                "id": "user-by-id",
                "tenantId": "acme",
                "method": "GET",
                "pathTemplate": "/users/:id",
                "responseTemplate": {"user": {"id": null}},
                "dynamicFields": {"user.id": {"source": "params", "path": "id"}}
            },
            {
                "id": "items-any",
                "tenantId": "acme",
                "method": "ANY",
                "pathTemplate": "/items",
                "responseTemplate": {"handler": "any"}
            },
            {
                "id": "items-get",
                "tenantId": "acme",
                "method": "GET",
                "pathTemplate": "/items",
                "responseTemplate": {"handler": "get"},
                "headers": {"content-type": "application/hal+json", "x-fake": "yes"}
            },
            {
                "id": "search",
                "tenantId": "acme",
                "method": "GET",
                "pathTemplate": "/search",
                "responseTemplate": {"filter": null, "results": []},
                "dynamicFields": {"filter": {"source": "query", "path": "filter"}}
            },
            {
                "id": "globex-orders",
                "tenantId": "globex",
                "method": "GET",
                "pathTemplate": "/orders/{orderId}",
                "responseTemplate": {"order": {"id": null, "lines": []}},
                "dynamicFields": {"order.id": {"source": "params", "path": "orderId"}}
            }
        ]
    }))
    .unwrap()
}

pub fn config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.latency.enabled = false;
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    config
}

pub fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::with_catalog(catalog(), 100).unwrap())
}

pub fn router_with(config: ServerConfig) -> Router {
    HttpServer::new(config, store()).router()
}

pub fn router() -> Router {
    router_with(config())
}

/// Drive one request through the router and decode the JSON body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn admin(method: &str, uri: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {ADMIN_KEY}"));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
