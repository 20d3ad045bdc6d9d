//! In-memory catalog.
//!
//! Tenants and definitions live in an immutable snapshot behind an
//! `ArcSwap`: readers never block, writers build a new snapshot and swap it
//! in. Webhook records are kept in a `DashMap` by id, bounded through an
//! arrival-order queue.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::catalog::loader::CatalogFile;
use crate::catalog::store::{EndpointStore, StoreError, StoreResult};
use crate::catalog::types::{EndpointDefinition, Tenant, WebhookRecord};
use crate::observability::metrics;
use crate::routing::PathPattern;

/// Default number of webhook records retained.
pub const DEFAULT_WEBHOOK_CAPACITY: usize = 1_000;

#[derive(Debug, Clone, Default)]
struct Snapshot {
    tenants: HashMap<String, Tenant>,
    /// Lowercased custom domain -> tenant id.
    domains: HashMap<String, String>,
    /// Definitions in insertion order.
    endpoints: Vec<Arc<EndpointDefinition>>,
}

impl Snapshot {
    fn build(catalog: CatalogFile) -> StoreResult<Self> {
        let mut snapshot = Snapshot::default();
        for tenant in catalog.tenants {
            snapshot.insert_tenant(tenant)?;
        }
        for definition in catalog.endpoints {
            snapshot.insert_endpoint(definition.with_generated_id())?;
        }
        Ok(snapshot)
    }

    fn insert_tenant(&mut self, tenant: Tenant) -> StoreResult<()> {
        let domain = tenant.custom_domain.as_ref().map(|d| d.to_lowercase());
        if let Some(domain) = &domain {
            if let Some(owner) = self.domains.get(domain).filter(|owner| **owner != tenant.id) {
                return Err(StoreError::DomainTaken {
                    domain: domain.clone(),
                    owner: owner.clone(),
                });
            }
        }

        self.domains.retain(|_, id| *id != tenant.id);
        if let Some(domain) = domain {
            self.domains.insert(domain, tenant.id.clone());
        }
        self.tenants.insert(tenant.id.clone(), tenant);
        Ok(())
    }

    fn insert_endpoint(&mut self, definition: EndpointDefinition) -> StoreResult<Arc<EndpointDefinition>> {
        let pattern = definition.validate()?;

        if !self.tenants.contains_key(&definition.tenant_id) {
            return Err(StoreError::UnknownTenant(definition.tenant_id.clone()));
        }

        let route_key = pattern.route_key();
        let duplicate = self.endpoints.iter().any(|existing| {
            existing.id != definition.id
                && existing.tenant_id == definition.tenant_id
                && existing.method == definition.method
                && PathPattern::parse(&existing.path_template)
                    .map(|p| p.route_key() == route_key)
                    .unwrap_or(false)
        });
        if duplicate {
            return Err(StoreError::Duplicate {
                tenant: definition.tenant_id.clone(),
                method: definition.method,
                path: pattern.normalized(),
            });
        }

        let definition = Arc::new(definition);
        match self.endpoints.iter_mut().find(|e| e.id == definition.id) {
            Some(slot) => *slot = definition.clone(),
            None => self.endpoints.push(definition.clone()),
        }
        Ok(definition)
    }
}

/// Catalog held entirely in memory.
pub struct InMemoryStore {
    catalog: ArcSwap<Snapshot>,
    /// Serializes writers; readers go through `catalog` only.
    write_lock: Mutex<()>,
    webhooks: DashMap<Uuid, WebhookRecord>,
    /// Record ids, oldest first.
    webhook_order: Mutex<VecDeque<Uuid>>,
    webhook_capacity: usize,
}

impl InMemoryStore {
    pub fn new(webhook_capacity: usize) -> Self {
        Self {
            catalog: ArcSwap::from_pointee(Snapshot::default()),
            write_lock: Mutex::new(()),
            webhooks: DashMap::new(),
            webhook_order: Mutex::new(VecDeque::new()),
            webhook_capacity: webhook_capacity.max(1),
        }
    }

    /// Build a store pre-populated from a catalog file.
    pub fn with_catalog(catalog: CatalogFile, webhook_capacity: usize) -> StoreResult<Self> {
        let store = Self::new(webhook_capacity);
        store.catalog.store(Arc::new(Snapshot::build(catalog)?));
        Ok(store)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Snapshot) -> StoreResult<T>) -> StoreResult<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Backend("catalog writer lock poisoned".into()))?;
        let mut next = Snapshot::clone(&self.catalog.load());
        let out = f(&mut next)?;
        self.catalog.store(Arc::new(next));
        Ok(out)
    }

    fn webhook_order(&self) -> StoreResult<std::sync::MutexGuard<'_, VecDeque<Uuid>>> {
        self.webhook_order
            .lock()
            .map_err(|_| StoreError::Backend("webhook log lock poisoned".into()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_WEBHOOK_CAPACITY)
    }
}

#[async_trait]
impl EndpointStore for InMemoryStore {
    async fn tenant(&self, id: &str) -> StoreResult<Option<Tenant>> {
        Ok(self.catalog.load().tenants.get(id).cloned())
    }

    async fn tenant_by_domain(&self, host: &str) -> StoreResult<Option<Tenant>> {
        let catalog = self.catalog.load();
        Ok(catalog
            .domains
            .get(&host.to_lowercase())
            .and_then(|id| catalog.tenants.get(id))
            .cloned())
    }

    async fn endpoints_for_tenant(&self, tenant_id: &str) -> StoreResult<Vec<Arc<EndpointDefinition>>> {
        Ok(self
            .catalog
            .load()
            .endpoints
            .iter()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn endpoint(&self, id: &str) -> StoreResult<Option<Arc<EndpointDefinition>>> {
        Ok(self
            .catalog
            .load()
            .endpoints
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn put_tenant(&self, tenant: Tenant) -> StoreResult<()> {
        let (id, domain) = (tenant.id.clone(), tenant.custom_domain.clone());
        self.write(|snapshot| snapshot.insert_tenant(tenant))?;
        tracing::info!(tenant = %id, domain = ?domain, "Tenant stored");
        Ok(())
    }

    async fn delete_tenant(&self, id: &str) -> StoreResult<bool> {
        let removed = self.write(|snapshot| {
            let existed = snapshot.tenants.remove(id).is_some();
            snapshot.domains.retain(|_, tenant| tenant.as_str() != id);
            snapshot.endpoints.retain(|e| e.tenant_id != id);
            Ok(existed)
        })?;
        if removed {
            tracing::info!(tenant = %id, "Tenant deleted with its endpoints");
        }
        Ok(removed)
    }

    async fn put_endpoint(&self, definition: EndpointDefinition) -> StoreResult<Arc<EndpointDefinition>> {
        let stored = self.write(|snapshot| snapshot.insert_endpoint(definition))?;
        tracing::info!(
            endpoint = %stored.id,
            tenant = %stored.tenant_id,
            method = %stored.method,
            path = %stored.path_template,
            "Endpoint stored"
        );
        Ok(stored)
    }

    async fn delete_endpoint(&self, id: &str) -> StoreResult<bool> {
        self.write(|snapshot| {
            let before = snapshot.endpoints.len();
            snapshot.endpoints.retain(|e| e.id != id);
            Ok(snapshot.endpoints.len() != before)
        })
    }

    async fn replace_catalog(&self, catalog: CatalogFile) -> StoreResult<()> {
        let snapshot = Snapshot::build(catalog)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Backend("catalog writer lock poisoned".into()))?;
        tracing::info!(
            tenants = snapshot.tenants.len(),
            endpoints = snapshot.endpoints.len(),
            "Catalog replaced"
        );
        self.catalog.store(Arc::new(snapshot));
        Ok(())
    }

    async fn record_webhook(&self, record: WebhookRecord) -> StoreResult<()> {
        let mut order = self.webhook_order()?;
        order.push_back(record.id);
        self.webhooks.insert(record.id, record);
        while order.len() > self.webhook_capacity {
            if let Some(oldest) = order.pop_front() {
                self.webhooks.remove(&oldest);
            }
        }
        metrics::record_webhook();
        Ok(())
    }

    async fn recent_webhooks(&self, limit: usize) -> StoreResult<Vec<WebhookRecord>> {
        let order = self.webhook_order()?;
        Ok(order
            .iter()
            .rev()
            .filter_map(|id| self.webhooks.get(id).map(|r| r.value().clone()))
            .take(limit)
            .collect())
    }

    async fn webhook(&self, id: Uuid) -> StoreResult<Option<WebhookRecord>> {
        Ok(self.webhooks.get(&id).map(|r| r.value().clone()))
    }
}
