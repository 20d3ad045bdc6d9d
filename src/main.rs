//! Multi-tenant fake API server.
//!
//! Serves user-defined JSON endpoints under `/api/{tenant}/...`,
//! `/api/fake/{endpointId}/...` and tenant custom domains, filling response
//! templates from the request's path captures, query string and body.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http server ──▶ dispatch ──▶ routing ──▶ catalog store
//!                     (tower-http)       │          (matcher)    (tenants,
//!                                        │                        endpoints)
//!                                        ▼
//!     Client Response               template
//!     ◀─────────────── http response ◀── (extract + materialize)
//!
//!     Cross-cutting: config, observability, lifecycle, admin API
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use fake_api_server::catalog::EndpointStore;
use fake_api_server::config::{load_config, ServerConfig};
use fake_api_server::lifecycle::signals::spawn_signal_handler;
use fake_api_server::lifecycle::startup::{bind_listener, build_store, start_catalog_watcher};
use fake_api_server::lifecycle::Shutdown;
use fake_api_server::observability::{logging, metrics};
use fake_api_server::HttpServer;

#[derive(Parser)]
#[command(name = "fake-api-server", version, about = "Multi-tenant fake API server")]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "FAKEAPI_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fake-api-server starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        matching = ?config.routing.matching,
        latency_enabled = config.latency.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = build_store(&config.catalog)?;
    let store: Arc<dyn EndpointStore> = store;
    let _watcher = start_catalog_watcher(&config.catalog, store.clone())?;

    let listener = bind_listener(&config).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    HttpServer::new(config, store).run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
