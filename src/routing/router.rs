//! Endpoint resolution.
//!
//! # Responsibilities
//! - Load a tenant's definitions from the store
//! - Keep the ones whose path template matches and whose method accepts the request
//! - Pick exactly one, or report NoMatch
//!
//! # Design Decisions
//! - Exact method beats `ANY`, then more literal segments, then storage order
//! - Definitions whose template no longer parses are skipped with a warning
//! - Explicit NoMatch rather than silent default

use std::sync::Arc;

use axum::http::Method;

use crate::catalog::store::{EndpointStore, StoreResult};
use crate::catalog::types::EndpointDefinition;
use crate::routing::matcher::{MatchMode, PathParams, PathPattern};

/// A definition selected for a request, with its path captures.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub endpoint: Arc<EndpointDefinition>,
    pub params: PathParams,
}

/// Resolves {tenant, path, method} to a single definition.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn EndpointStore>,
    mode: MatchMode,
}

impl Resolver {
    pub fn new(store: Arc<dyn EndpointStore>, mode: MatchMode) -> Self {
        Self { store, mode }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Resolve a request within one tenant. `Ok(None)` means no definition matched.
    pub async fn resolve(
        &self,
        tenant_id: &str,
        path: &str,
        method: &Method,
    ) -> StoreResult<Option<Resolved>> {
        let candidates = self.store.endpoints_for_tenant(tenant_id).await?;
        let resolved = select_endpoint(&candidates, path, method, self.mode);

        match &resolved {
            Some(r) => tracing::debug!(
                tenant = %tenant_id,
                endpoint = %r.endpoint.id,
                template = %r.endpoint.path_template,
                candidates = candidates.len(),
                "Endpoint resolved"
            ),
            None => tracing::debug!(
                tenant = %tenant_id,
                path = %path,
                method = %method,
                candidates = candidates.len(),
                "No endpoint matched"
            ),
        }

        Ok(resolved)
    }
}

/// Pick the best matching definition among `candidates`.
pub fn select_endpoint(
    candidates: &[Arc<EndpointDefinition>],
    path: &str,
    method: &Method,
    mode: MatchMode,
) -> Option<Resolved> {
    let mut best: Option<((bool, usize), Resolved)> = None;

    for candidate in candidates {
        if !candidate.method.accepts(method) {
            continue;
        }

        let pattern = match PathPattern::parse(&candidate.path_template) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(endpoint = %candidate.id, error = %e, "Skipping endpoint with invalid path template");
                continue;
            }
        };

        let Some(params) = pattern.match_path(path, mode) else {
            continue;
        };

        let rank = (candidate.method.is(method), pattern.specificity());
        // strictly greater, so the earliest stored wins a tie
        if best.as_ref().map_or(true, |(current, _)| rank > *current) {
            best = Some((
                rank,
                Resolved {
                    endpoint: candidate.clone(),
                    params,
                },
            ));
        }
    }

    best.map(|(_, resolved)| resolved)
}
