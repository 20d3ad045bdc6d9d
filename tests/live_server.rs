//! A real listener driven over TCP.

use std::time::Duration;

use fake_api_server::lifecycle::Shutdown;
use fake_api_server::HttpServer;
use serde_json::{json, Value};
use tokio::net::TcpListener;

mod common;

#[tokio::test]
async fn serves_over_tcp_and_shuts_down() {
    let mut config = common::config();
    config.latency.enabled = true;
    config.latency.min_ms = 5;
    config.latency.max_ms = 20;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, common::store());
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .post(format!("http://{addr}/api/acme/echo"))
        .json(&json!({"msg": "over the wire"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"id": "", "echo": "over the wire"}));

    let res = client
        .get(format!("http://{addr}/api/acme/search"))
        .query(&[("filter", "active")])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["filter"], "active");

    shutdown.trigger();
    let stopped = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(matches!(stopped, Ok(Ok(Ok(())))));
}
