//! Webhook capture.
//!
//! Stores every delivery posted to `/api/webhook` as-is. No matching, no
//! templating.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::catalog::types::WebhookRecord;
use crate::http::response::error_response;
use crate::http::server::AppState;

pub async fn webhook_handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let record = capture(&headers, &body);
    let id = record.id;

    match state.store.record_webhook(record).await {
        Ok(()) => {
            tracing::info!(webhook = %id, bytes = body.len(), "Webhook received");
            Json(json!({
                "success": true,
                "message": "Webhook received",
                "id": id,
            }))
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store webhook");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process webhook")
        }
    }
}

/// Build a record from the raw delivery.
pub fn capture(headers: &HeaderMap, body: &[u8]) -> WebhookRecord {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let mut header_map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        header_map
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    let parsed = if content_type.contains("application/json") {
        serde_json::from_slice::<Value>(body).ok()
    } else {
        None
    };

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    WebhookRecord {
        id: Uuid::new_v4(),
        timestamp,
        headers: header_map,
        raw_body: String::from_utf8_lossy(body).into_owned(),
        body: parsed,
        content_type,
    }
}
