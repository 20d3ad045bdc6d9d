//! Request dispatcher.
//!
//! Drives one request through
//! `Received → Resolving → Matched → Materializing → Responding`.
//! Any failure leaves the machine with a [`DispatchError`] and the stage it
//! happened in is logged.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use rand::Rng;
use serde_json::Value;

use crate::catalog::store::EndpointStore;
use crate::catalog::types::{EndpointDefinition, Tenant};
use crate::config::{LatencyConfig, ServerConfig};
use crate::dispatch::error::DispatchError;
use crate::dispatch::request::InboundRequest;
use crate::observability::metrics;
use crate::routing::matcher::{split_segments, MatchMode, PathParams, PathPattern};
use crate::routing::router::{Resolved, Resolver};
use crate::template::extract::ParameterBag;
use crate::template::materialize::materialize;

/// Dispatch state machine stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Resolving,
    Matched,
    Materializing,
    Responding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Received => "received",
            Stage::Resolving => "resolving",
            Stage::Matched => "matched",
            Stage::Materializing => "materializing",
            Stage::Responding => "responding",
        };
        f.write_str(s)
    }
}

/// How the request addresses its endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    /// `/api/{tenantIdOrHost}/{path..}`
    TenantPath { identifier: String, path: String },
    /// `/api/fake/{endpointId}/{path..}`
    DirectId { endpoint_id: String, path: String },
    /// Any other path, served only on a tenant's custom domain.
    CustomDomain { path: String },
}

impl Addressing {
    pub fn classify(path: &str) -> Result<Self, DispatchError> {
        let segments: Vec<&str> = split_segments(path).collect();

        match segments.split_first() {
            Some((&"api", rest)) => match rest {
                ["fake", id, tail @ ..] => Ok(Addressing::DirectId {
                    endpoint_id: id.to_string(),
                    path: join(tail),
                }),
                [identifier, tail @ ..] if !tail.is_empty() => Ok(Addressing::TenantPath {
                    identifier: identifier.to_string(),
                    path: join(tail),
                }),
                _ => Err(DispatchError::InvalidPath),
            },
            _ => Ok(Addressing::CustomDomain {
                path: join(&segments),
            }),
        }
    }

    /// Metrics label.
    pub fn scheme(&self) -> &'static str {
        match self {
            Addressing::TenantPath { .. } => "tenant_path",
            Addressing::DirectId { .. } => "direct_id",
            Addressing::CustomDomain { .. } => "custom_domain",
        }
    }
}

fn join(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

/// A materialized fake response.
#[derive(Debug, Clone)]
pub struct DispatchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Top-level request orchestrator.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn EndpointStore>,
    resolver: Resolver,
    latency: LatencyConfig,
    app_domain: Option<String>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn EndpointStore>, config: &ServerConfig) -> Self {
        Self {
            resolver: Resolver::new(store.clone(), config.routing.matching),
            store,
            latency: config.latency.clone(),
            app_domain: config.routing.app_domain.as_ref().map(|d| d.to_lowercase()),
        }
    }

    pub fn store(&self) -> &Arc<dyn EndpointStore> {
        &self.store
    }

    /// Serve one request.
    pub async fn dispatch(&self, request: &InboundRequest) -> Result<DispatchResponse, DispatchError> {
        let start = Instant::now();
        let mut stage = Stage::Received;
        let result = self.run(request, &mut stage).await;

        let scheme = Addressing::classify(&request.path).map_or("invalid", |a| a.scheme());
        let status = match &result {
            Ok(response) => response.status,
            Err(e) => e.status(),
        };
        metrics::record_request(scheme, request.method.as_str(), status.as_u16(), start);

        match &result {
            Ok(response) => tracing::debug!(
                request_id = %request.request_id,
                status = %response.status,
                "Fake response ready"
            ),
            Err(DispatchError::Internal(detail)) => tracing::error!(
                request_id = %request.request_id,
                stage = %stage,
                error = %detail,
                "Dispatch failed"
            ),
            Err(e) => tracing::info!(
                request_id = %request.request_id,
                stage = %stage,
                method = %request.method,
                path = %request.path,
                reason = %e,
                "Request not served"
            ),
        }

        result
    }

    async fn run(&self, request: &InboundRequest, stage: &mut Stage) -> Result<DispatchResponse, DispatchError> {
        let addressing = Addressing::classify(&request.path)?;
        let bag = ParameterBag::new()
            .with_query(request.query_pairs())
            .with_body(request.parse_body());

        *stage = Stage::Resolving;
        tracing::debug!(request_id = %request.request_id, scheme = addressing.scheme(), "Resolving endpoint");
        let Resolved { endpoint, params } = match &addressing {
            Addressing::TenantPath { identifier, path } => {
                let tenant = self.resolve_tenant(Some(identifier.as_str()), request).await?;
                self.resolve_in_tenant(&tenant, path, request).await?
            }
            Addressing::CustomDomain { path } => {
                let tenant = self.resolve_tenant(None, request).await?;
                self.resolve_in_tenant(&tenant, path, request).await?
            }
            Addressing::DirectId { endpoint_id, path } => {
                self.resolve_direct(endpoint_id, path, request).await?
            }
        };

        *stage = Stage::Matched;
        tracing::debug!(
            request_id = %request.request_id,
            endpoint = %endpoint.id,
            params = ?params,
            "Endpoint matched"
        );
        let bag = bag.with_params(params);

        *stage = Stage::Materializing;
        let (body, stats) = materialize(&endpoint.response_template, &endpoint.dynamic_fields, &bag)?;
        metrics::record_bindings(stats.applied, stats.skipped);
        tracing::debug!(
            request_id = %request.request_id,
            applied = stats.applied,
            skipped = stats.skipped,
            "Template materialized"
        );

        *stage = Stage::Responding;
        let headers = response_headers(&endpoint);
        if let Some(delay) = self.simulated_latency() {
            tokio::time::sleep(delay).await;
        }

        Ok(DispatchResponse {
            status: StatusCode::OK,
            headers,
            body,
        })
    }

    /// Tenant from the custom-domain lookup, else from the path identifier.
    async fn resolve_tenant(&self, identifier: Option<&str>, request: &InboundRequest) -> Result<Tenant, DispatchError> {
        if let Some(host) = self.custom_host(request) {
            if let Some(tenant) = self.store.tenant_by_domain(host).await? {
                tracing::debug!(request_id = %request.request_id, host = %host, tenant = %tenant.id, "Tenant resolved by host");
                return Ok(tenant);
            }
        }

        let Some(identifier) = identifier else {
            return Err(DispatchError::NoRoute);
        };

        self.store
            .tenant(identifier)
            .await?
            .ok_or(DispatchError::TenantNotFound)
    }

    async fn resolve_in_tenant(
        &self,
        tenant: &Tenant,
        path: &str,
        request: &InboundRequest,
    ) -> Result<Resolved, DispatchError> {
        self.resolver
            .resolve(&tenant.id, path, &request.method)
            .await?
            .ok_or_else(|| DispatchError::EndpointNotFound {
                path: path.to_string(),
                method: request.method.to_string(),
            })
    }

    /// Direct-id addressing: the endpoint is known up front, the path only
    /// feeds captures.
    async fn resolve_direct(
        &self,
        endpoint_id: &str,
        remainder: &str,
        request: &InboundRequest,
    ) -> Result<Resolved, DispatchError> {
        let endpoint = self
            .store
            .endpoint(endpoint_id)
            .await?
            .ok_or_else(|| DispatchError::UnknownEndpoint {
                id: endpoint_id.to_string(),
            })?;

        if !endpoint.method.accepts(&request.method) {
            return Err(DispatchError::MethodNotAllowed(request.method.to_string()));
        }

        let mode = self.resolver.mode();
        let aligned = match mode {
            MatchMode::Strict => remainder.to_string(),
            // historical alignment: only `api/fake` is skipped
            MatchMode::Loose => {
                let tail: Vec<&str> = split_segments(&request.path).skip(2).collect();
                join(&tail)
            }
        };

        let params = match PathPattern::parse(&endpoint.path_template) {
            Ok(pattern) => pattern.match_path(&aligned, mode).unwrap_or_default(),
            Err(e) => {
                tracing::warn!(endpoint = %endpoint.id, error = %e, "Invalid path template, no captures");
                PathParams::new()
            }
        };

        Ok(Resolved { endpoint, params })
    }

    /// The request host, unless it is the server's own domain.
    fn custom_host<'a>(&self, request: &'a InboundRequest) -> Option<&'a str> {
        let host = request.host.as_deref()?;
        match &self.app_domain {
            Some(app) if host.eq_ignore_ascii_case(app) => None,
            _ => Some(host),
        }
    }

    /// Delay drawn uniformly from `[min_ms, max_ms)`.
    fn simulated_latency(&self) -> Option<Duration> {
        if !self.latency.enabled || self.latency.max_ms == 0 {
            return None;
        }
        let ms = if self.latency.max_ms > self.latency.min_ms {
            rand::thread_rng().gen_range(self.latency.min_ms..self.latency.max_ms)
        } else {
            self.latency.min_ms
        };
        Some(Duration::from_millis(ms))
    }
}

/// `Content-Type: application/json` overlaid with the endpoint's headers.
pub fn response_headers(endpoint: &EndpointDefinition) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in &endpoint.headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(endpoint = %endpoint.id, header = %name, "Skipping invalid response header"),
        }
    }

    headers
}
