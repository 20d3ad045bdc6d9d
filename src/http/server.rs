//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, panic recovery)
//! - Mount the management API when enabled
//! - Bind server to listener and stop on the shutdown broadcast
//!
//! # Route Table
//! ```text
//! POST /api/webhook      → webhook capture
//! ANY  /api/{*path}      → dispatcher
//! /admin/...             → management API (optional, bearer auth)
//! anything else          → dispatcher (custom-domain hosts, else 404)
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::{any, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::catalog::EndpointStore;
use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::into_inbound;
use crate::http::response::{panic_response, timeout_response};
use crate::http::webhook::webhook_handler;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub store: Arc<dyn EndpointStore>,
    pub config: Arc<ServerConfig>,
    pub started_at: Instant,
}

/// HTTP server for the fake API.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server over the given endpoint store.
    pub fn new(config: ServerConfig, store: Arc<dyn EndpointStore>) -> Self {
        let state = AppState {
            dispatcher: Dispatcher::new(store.clone(), &config),
            store,
            config: Arc::new(config.clone()),
            started_at: Instant::now(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let mut app = Router::new()
            .route("/api/webhook", post(webhook_handler))
            .route("/api/{*path}", any(fake_api_handler))
            .fallback(fake_api_handler);

        if config.admin.enabled {
            app = app.merge(setup_admin_router(state.clone()));
        }

        app.with_state(state)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(map_response(timeout_response))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            matching = ?self.config.routing.matching,
            admin = self.config.admin.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Serves every fake API request through the dispatcher.
async fn fake_api_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let inbound = into_inbound(request, state.config.security.max_body_size).await;

    match state.dispatcher.dispatch(&inbound).await {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EndpointDefinition, InMemoryStore, Tenant};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut config = ServerConfig::default();
        config.latency.enabled = false;
        HttpServer::new(config, Arc::new(InMemoryStore::default()))
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = server()
            .router()
            .oneshot(Request::get("/api/nobody/x").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_admin_routes_absent_when_disabled() {
        let response = server()
            .router()
            .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // falls through to the dispatcher, which has no custom domain for this host
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(server().run(listener, rx));

        tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }

    #[tokio::test]
    async fn test_timeout_has_json_body() {
        let mut config = ServerConfig::default();
        config.timeouts.request_secs = 1;
        config.latency.enabled = true;
        config.latency.min_ms = 1500;
        config.latency.max_ms = 1600;

        let store = InMemoryStore::default();
        store
            .put_tenant(Tenant { id: "slow".into(), name: "Slow".into(), custom_domain: None })
            .await
            .unwrap();
        let definition: EndpointDefinition = serde_json::from_value(serde_json::json!({
            "id": "ping",
            "tenantId": "slow",
            "method": "GET",
            "path": "/ping",
            "responseTemplate": {"pong": true}
        }))
        .unwrap();
        store.put_endpoint(definition).await.unwrap();

        let response = HttpServer::new(config, Arc::new(store))
            .router()
            .oneshot(Request::get("/api/slow/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Request timeout"}));
    }
}
