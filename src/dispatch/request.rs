//! Inbound request capture.
//!
//! # Responsibilities
//! - Hold everything the dispatcher needs from a transport request
//! - Parse the query string into a flat map (last duplicate wins)
//! - Parse JSON or form-encoded bodies, falling back to an empty bag
//!
//! # Design Decisions
//! - Body parse failures are swallowed, never surfaced
//! - GET and HEAD bodies are ignored

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method};
use serde_json::{Map, Value};

/// A fully buffered request, independent of the HTTP framework.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Raw path, without query string.
    pub path: String,
    pub query: Option<String>,
    /// Host the request arrived on (`Host` header or URI authority).
    pub host: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Correlation id (`x-request-id`), for logging.
    pub request_id: String,
}

impl InboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            host: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            request_id: "unknown".to_string(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_json_body(mut self, body: &Value) -> Self {
        self.headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        self.body = Bytes::from(body.to_string());
        self
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    /// Decoded query pairs in order of appearance.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match &self.query {
            Some(q) => url::form_urlencoded::parse(q.as_bytes()).into_owned().collect(),
            None => Vec::new(),
        }
    }

    /// Body parameters: parsed JSON, form fields, or an empty object.
    pub fn parse_body(&self) -> Value {
        if self.method == Method::GET || self.method == Method::HEAD {
            return empty();
        }

        let content_type = self.content_type().to_ascii_lowercase();
        if content_type.contains("application/json") {
            match serde_json::from_slice(&self.body) {
                Ok(value) => value,
                Err(e) => {
                    tracing::debug!(request_id = %self.request_id, error = %e, "Ignoring unparseable JSON body");
                    empty()
                }
            }
        } else if content_type.contains("application/x-www-form-urlencoded") {
            let map: Map<String, Value> = url::form_urlencoded::parse(&self.body)
                .into_owned()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            Value::Object(map)
        } else {
            empty()
        }
    }
}

fn empty() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_body(method: Method, content_type: &str, body: &'static str) -> InboundRequest {
        let mut request = InboundRequest::new(method, "/api/acme/x");
        request
            .headers
            .insert(header::CONTENT_TYPE, content_type.parse().unwrap());
        request.body = Bytes::from_static(body.as_bytes());
        request
    }

    #[test]
    fn test_query_pairs_are_decoded() {
        let request = InboundRequest::new(Method::GET, "/").with_query("filter=active&name=a%20b&x=1&x=2");
        assert_eq!(
            request.query_pairs(),
            vec![
                ("filter".to_string(), "active".to_string()),
                ("name".to_string(), "a b".to_string()),
                ("x".to_string(), "1".to_string()),
                ("x".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_json_body() {
        let request = with_body(Method::POST, "application/json; charset=utf-8", r#"{"msg":"hi"}"#);
        assert_eq!(request.parse_body(), json!({"msg": "hi"}));
    }

    #[test]
    fn test_form_body_last_duplicate_wins() {
        let request = with_body(Method::PUT, "application/x-www-form-urlencoded", "a=1&b=two&a=3");
        assert_eq!(request.parse_body(), json!({"a": "3", "b": "two"}));
    }

    #[test]
    fn test_invalid_json_is_empty() {
        let request = with_body(Method::POST, "application/json", "{not json");
        assert_eq!(request.parse_body(), json!({}));
    }

    #[test]
    fn test_get_body_is_ignored() {
        let request = with_body(Method::GET, "application/json", r#"{"msg":"hi"}"#);
        assert_eq!(request.parse_body(), json!({}));
    }

    #[test]
    fn test_other_content_type_is_empty() {
        let request = with_body(Method::POST, "text/plain", "msg=hi");
        assert_eq!(request.parse_body(), json!({}));
    }
}
