//! Management API.
//!
//! Bearer-token protected routes for editing the catalog at runtime and
//! reading captured webhooks. Mounted only when `admin.enabled` is set.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/tenants", put(put_tenant))
        .route("/admin/tenants/{id}", delete(delete_tenant))
        .route("/admin/tenants/{id}/endpoints", get(list_endpoints))
        .route("/admin/endpoints", post(create_endpoint))
        .route("/admin/endpoints/{id}", delete(delete_endpoint))
        .route("/admin/webhooks", get(list_webhooks))
        .route("/admin/webhooks/{id}", get(get_webhook))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
