//! Management API: auth, catalog edits and webhook listing.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{admin, get, json_request, router, send};

#[tokio::test]
async fn rejects_missing_or_wrong_key() {
    let router = router();

    let (status, _, _) = send(&router, get("/admin/status")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = axum::http::Request::get("/admin/status")
        .header("authorization", "Bearer wrong")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn status() {
    let (status, _, body) = send(&router(), admin("GET", "/admin/status", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
    assert_eq!(body["matching"], "strict");
}

#[tokio::test]
async fn create_endpoint_then_serve_it() {
    let router = router();
    let definition = json!({
        "tenantId": "globex",
        "method": "GET",
        "path": "/ping",
        "responseTemplate": {"pong": true}
    });

    let (status, _, created) = send(&router, admin("POST", "/admin/endpoints", Some(&definition))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let (status, _, body) = send(&router, get("/api/globex/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"pong": true}));

    let (status, _, listed) = send(&router, admin("GET", "/admin/tenants/globex/endpoints", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let uri = format!("/admin/endpoints/{id}");
    let (status, _, _) = send(&router, admin("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&router, admin("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&router, get("/api/globex/ping")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_route_conflicts() {
    let definition = json!({
        "tenantId": "acme",
        "method": "GET",
        "pathTemplate": "/users/{userId}",
        "responseTemplate": {}
    });
    let (status, _, body) = send(&router(), admin("POST", "/admin/endpoints", Some(&definition))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn invalid_definition_is_bad_request() {
    let definition = json!({
        "tenantId": "acme",
        "method": "GET",
        "pathTemplate": "/a/:x/:x",
        "responseTemplate": {}
    });
    let (status, _, _) = send(&router(), admin("POST", "/admin/endpoints", Some(&definition))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let orphan = json!({
        "tenantId": "nobody",
        "method": "GET",
        "pathTemplate": "/a",
        "responseTemplate": {}
    });
    let (status, _, _) = send(&router(), admin("POST", "/admin/endpoints", Some(&orphan))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tenant_lifecycle() {
    let router = router();

    let tenant = json!({"id": "initech", "name": "Initech", "customDomain": "api.initech.test"});
    let (status, _, body) = send(&router, admin("PUT", "/admin/tenants", Some(&tenant))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "initech");

    let (status, _, listed) = send(&router, admin("GET", "/admin/tenants/initech/endpoints", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, _, _) = send(&router, admin("DELETE", "/admin/tenants/acme", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&router, get("/api/acme/users/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Project not found"}));

    let (status, _, _) = send(&router, admin("GET", "/admin/tenants/acme/endpoints", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_tenant_id_is_rejected() {
    let tenant = json!({"id": " ", "name": "Blank"});
    let (status, _, _) = send(&router(), admin("PUT", "/admin/tenants", Some(&tenant))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhooks_newest_first() {
    let router = router();
    for n in 0..3 {
        send(&router, json_request("POST", "/api/webhook", &json!({"n": n}))).await;
    }

    let (status, _, body) = send(&router, admin("GET", "/admin/webhooks?limit=2", None)).await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["body"], json!({"n": 2}));
    assert_eq!(records[1]["body"], json!({"n": 1}));

    let id = records[1]["id"].as_str().unwrap();
    let (status, _, body) = send(&router, admin("GET", &format!("/admin/webhooks/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, records[1]);

    let unknown = "/admin/webhooks/00000000-0000-0000-0000-000000000000";
    let (status, _, _) = send(&router, admin("GET", unknown, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&router, admin("GET", "/admin/webhooks/latest", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn custom_domain_conflict() {
    let router = router();

    let tenant = json!({"id": "initech", "customDomain": "API.acme.test"});
    let (status, _, body) = send(&router, admin("PUT", "/admin/tenants", Some(&tenant))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("acme"));

    let request = axum::http::Request::get("/users/3")
        .header("host", "api.acme.test")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"user": {"id": "3"}}));
}
