//! Request handling and transformation.
//!
//! # Responsibilities
//! - Read the request ID set by the request-id layer
//! - Determine the host the request arrived on, without port
//! - Buffer the body (bounded) and hand an `InboundRequest` to the dispatcher
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Oversized or unreadable bodies become empty, like unparseable ones

use axum::body::{Body, Bytes};
use axum::http::uri::Authority;
use axum::http::{header, HeaderMap, Method, Request};

use crate::dispatch::InboundRequest;

/// Correlation header set on every request and response.
pub const X_REQUEST_ID: &str = "x-request-id";

pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Buffer an axum request into the dispatcher's representation.
pub async fn into_inbound(request: Request<Body>, max_body_size: usize) -> InboundRequest {
    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers);

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.parse::<Authority>().ok())
        .or_else(|| parts.uri.authority().cloned())
        .map(|a| a.host().to_string());

    let body = if parts.method == Method::GET || parts.method == Method::HEAD {
        Bytes::new()
    } else {
        match axum::body::to_bytes(body, max_body_size).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Request body unreadable, treating as empty");
                Bytes::new()
            }
        }
    };

    InboundRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        host,
        headers: parts.headers,
        body,
        request_id,
    }
}
