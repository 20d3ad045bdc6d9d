//! Catalog file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::catalog::loader::{load_catalog, CatalogFile};
use crate::catalog::store::EndpointStore;

/// Watches the catalog file and pushes freshly parsed catalogs to the store.
pub struct CatalogWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<CatalogFile>,
}

impl CatalogWatcher {
    /// Create a new CatalogWatcher.
    ///
    /// Returns the watcher and a receiver for parsed catalogs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<CatalogFile>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Catalog file change detected, reloading...");
                        match load_catalog(&path) {
                            Ok(catalog) => {
                                let _ = tx.send(catalog);
                            }
                            Err(e) => {
                                tracing::error!("Failed to reload catalog: {}. Keeping current catalog.", e);
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Catalog watcher started");
        Ok(watcher)
    }
}

/// Apply reloaded catalogs to the store until the channel closes.
pub async fn apply_updates(store: Arc<dyn EndpointStore>, mut updates: mpsc::UnboundedReceiver<CatalogFile>) {
    while let Some(catalog) = updates.recv().await {
        if let Err(e) = store.replace_catalog(catalog).await {
            tracing::error!(error = %e, "Reloaded catalog rejected. Keeping current catalog.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::InMemoryStore;
    use crate::catalog::types::Tenant;

    #[tokio::test]
    async fn test_apply_updates_swaps_catalog() {
        let store = Arc::new(InMemoryStore::default());
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(CatalogFile {
            tenants: vec![Tenant {
                id: "acme".into(),
                name: "Acme".into(),
                custom_domain: None,
            }],
            endpoints: vec![],
        })
        .unwrap();
        drop(tx);

        apply_updates(store.clone(), rx).await;
        assert!(store.tenant("acme").await.unwrap().is_some());
    }
}
