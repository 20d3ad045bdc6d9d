use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{EndpointDefinition, StoreError, Tenant, WebhookRecord};
use crate::http::response::error_response;
use crate::http::server::AppState;
use crate::routing::MatchMode;

/// Webhook listing size when `limit` is absent.
pub const DEFAULT_WEBHOOK_LIMIT: usize = 10;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub matching: MatchMode,
}

#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    pub limit: Option<usize>,
}

/// Management API failures.
#[derive(Debug)]
pub enum AdminError {
    BadRequest(String),
    NotFound(String),
    Store(StoreError),
}

impl From<StoreError> for AdminError {
    fn from(e: StoreError) -> Self {
        AdminError::Store(e)
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        match self {
            AdminError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, msg),
            AdminError::NotFound(msg) => error_response(StatusCode::NOT_FOUND, msg),
            AdminError::Store(e @ (StoreError::Invalid(_) | StoreError::UnknownTenant(_))) => {
                error_response(StatusCode::BAD_REQUEST, e.to_string())
            }
            AdminError::Store(e @ (StoreError::Duplicate { .. } | StoreError::DomainTaken { .. })) => {
                error_response(StatusCode::CONFLICT, e.to_string())
            }
            AdminError::Store(StoreError::Backend(detail)) => {
                tracing::error!(error = %detail, "Admin store operation failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
        matching: state.config.routing.matching,
    })
}

pub async fn put_tenant(
    State(state): State<AppState>,
    Json(tenant): Json<Tenant>,
) -> Result<Json<Tenant>, AdminError> {
    if tenant.id.trim().is_empty() {
        return Err(AdminError::BadRequest("tenant id must not be empty".into()));
    }
    state.store.put_tenant(tenant.clone()).await?;
    Ok(Json(tenant))
}

pub async fn delete_tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AdminError> {
    if state.store.delete_tenant(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdminError::NotFound(format!("tenant {id} not found")))
    }
}

pub async fn list_endpoints(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EndpointDefinition>>, AdminError> {
    if state.store.tenant(&id).await?.is_none() {
        return Err(AdminError::NotFound(format!("tenant {id} not found")));
    }
    let endpoints = state.store.endpoints_for_tenant(&id).await?;
    Ok(Json(endpoints.iter().map(|e| EndpointDefinition::clone(e)).collect()))
}

pub async fn create_endpoint(
    State(state): State<AppState>,
    Json(definition): Json<EndpointDefinition>,
) -> Result<(StatusCode, Json<EndpointDefinition>), AdminError> {
    let stored = state.store.put_endpoint(definition.with_generated_id()).await?;
    Ok((StatusCode::CREATED, Json(EndpointDefinition::clone(&stored))))
}

pub async fn delete_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AdminError> {
    if state.store.delete_endpoint(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdminError::NotFound(format!("endpoint {id} not found")))
    }
}

pub async fn list_webhooks(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
) -> Result<Json<Vec<WebhookRecord>>, AdminError> {
    let limit = query.limit.unwrap_or(DEFAULT_WEBHOOK_LIMIT);
    Ok(Json(state.store.recent_webhooks(limit).await?))
}

pub async fn get_webhook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WebhookRecord>, AdminError> {
    let uuid = Uuid::parse_str(&id)
        .map_err(|_| AdminError::BadRequest(format!("`{id}` is not a webhook id")))?;
    state
        .store
        .webhook(uuid)
        .await?
        .map(Json)
        .ok_or_else(|| AdminError::NotFound(format!("webhook {id} not found")))
}
