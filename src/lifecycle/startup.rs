//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the endpoint catalog into the store
//! - Start the catalog watcher when hot reload is enabled
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Without a catalog path the server starts empty (admin API can fill it)

use std::path::Path;
use std::sync::Arc;

use notify::RecommendedWatcher;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::catalog::loader::CatalogError;
use crate::catalog::watcher::{apply_updates, CatalogWatcher};
use crate::catalog::{load_catalog, CatalogFile, EndpointStore, InMemoryStore, StoreError};
use crate::config::{CatalogConfig, ServerConfig};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("catalog rejected: {0}")]
    Store(#[from] StoreError),

    #[error("failed to watch catalog: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// Build the in-memory store from the configured catalog file.
pub fn build_store(config: &CatalogConfig) -> Result<Arc<InMemoryStore>, StartupError> {
    let catalog = match &config.path {
        Some(path) => load_catalog(Path::new(path))?,
        None => {
            tracing::warn!("No catalog configured, starting with an empty store");
            CatalogFile::default()
        }
    };

    let tenants = catalog.tenants.len();
    let endpoints = catalog.endpoints.len();
    let store = InMemoryStore::with_catalog(catalog, config.webhook_capacity)?;
    tracing::info!(tenants, endpoints, "Catalog loaded");

    Ok(Arc::new(store))
}

/// Start hot reload of the catalog file, if configured.
///
/// The returned watcher must be kept alive for reloads to continue.
pub fn start_catalog_watcher(
    config: &CatalogConfig,
    store: Arc<dyn EndpointStore>,
) -> Result<Option<RecommendedWatcher>, StartupError> {
    let Some(path) = config.path.as_deref().filter(|_| config.watch) else {
        return Ok(None);
    };

    let (watcher, updates) = CatalogWatcher::new(Path::new(path));
    let handle = watcher.run()?;
    tokio::spawn(apply_updates(store, updates));
    Ok(Some(handle))
}

pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener, StartupError> {
    let address = config.listener.bind_address.clone();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}
