//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn a `DispatchResponse` into an HTTP response (JSON body + headers)
//! - Map dispatch errors to status codes with a minimal `{"error": ...}` body
//! - Replace panics with the generic 500 body
//! - Give request timeouts the same `{"error": ...}` body
//!
//! # Design Decisions
//! - Internal error details go to the log only

use std::any::Any;

use axum::body::HttpBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::dispatch::{DispatchError, DispatchResponse};

/// `{"error": message}` with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for DispatchResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        for (name, value) in self.headers.iter() {
            response.headers_mut().insert(name.clone(), value.clone());
        }
        response
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.client_message())
    }
}

/// Response used by the panic-catching layer.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Rewrites the empty 408 produced by the timeout layer.
pub async fn timeout_response(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT && response.body().size_hint().exact() == Some(0) {
        tracing::warn!("Request timed out");
        return error_response(StatusCode::REQUEST_TIMEOUT, "Request timeout");
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_response_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/hal+json"));
        headers.insert("x-fake", HeaderValue::from_static("1"));

        let response = DispatchResponse {
            status: StatusCode::OK,
            headers,
            body: json!({"ok": true}),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/hal+json");
        assert_eq!(response.headers()["x-fake"], "1");
        assert_eq!(body_json(response).await, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response = DispatchError::Internal("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": "Internal server error"}));
    }

    #[tokio::test]
    async fn test_panic_response() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": "Internal server error"}));
    }

    #[tokio::test]
    async fn test_timeout_response() {
        let bare = StatusCode::REQUEST_TIMEOUT.into_response();
        let response = timeout_response(bare).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body_json(response).await, json!({"error": "Request timeout"}));

        let ok = timeout_response(Json(json!({"a": 1})).into_response()).await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(body_json(ok).await, json!({"a": 1}));
    }
}
