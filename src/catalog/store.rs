//! Storage collaborator interface.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::loader::CatalogFile;
use crate::catalog::types::{EndpointDefinition, EndpointMethod, Tenant, ValidationError, WebhookRecord};

/// Errors returned by an [`EndpointStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid endpoint definition: {0}")]
    Invalid(#[from] ValidationError),

    #[error("{method} {path} is already defined for tenant `{tenant}`")]
    Duplicate {
        tenant: String,
        method: EndpointMethod,
        path: String,
    },

    #[error("custom domain `{domain}` already belongs to tenant `{owner}`")]
    DomainTaken { domain: String, owner: String },

    #[error("unknown tenant `{0}`")]
    UnknownTenant(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read/write access to tenants, endpoint definitions and webhook logs.
///
/// The engine only reads definitions; the write side serves the management
/// API and catalog reloads.
#[async_trait]
pub trait EndpointStore: Send + Sync {
    async fn tenant(&self, id: &str) -> StoreResult<Option<Tenant>>;

    /// Tenant whose custom domain equals `host` (case-insensitive).
    async fn tenant_by_domain(&self, host: &str) -> StoreResult<Option<Tenant>>;

    /// All definitions owned by a tenant, in the order they were stored.
    async fn endpoints_for_tenant(&self, tenant_id: &str) -> StoreResult<Vec<Arc<EndpointDefinition>>>;

    async fn endpoint(&self, id: &str) -> StoreResult<Option<Arc<EndpointDefinition>>>;

    /// Insert or replace a tenant. A custom domain owned by another tenant is refused.
    async fn put_tenant(&self, tenant: Tenant) -> StoreResult<()>;

    /// Delete a tenant together with its endpoints. Returns whether it existed.
    async fn delete_tenant(&self, id: &str) -> StoreResult<bool>;

    /// Validate and insert or replace (by id) a definition.
    async fn put_endpoint(&self, definition: EndpointDefinition) -> StoreResult<Arc<EndpointDefinition>>;

    async fn delete_endpoint(&self, id: &str) -> StoreResult<bool>;

    /// Atomically replace every tenant and definition.
    async fn replace_catalog(&self, catalog: CatalogFile) -> StoreResult<()>;

    async fn record_webhook(&self, record: WebhookRecord) -> StoreResult<()>;

    /// Most recent webhook records, newest first.
    async fn recent_webhooks(&self, limit: usize) -> StoreResult<Vec<WebhookRecord>>;

    /// A retained webhook record by id.
    async fn webhook(&self, id: Uuid) -> StoreResult<Option<WebhookRecord>>;
}
