//! Catalog types: tenants, endpoint definitions, webhook records.

use std::collections::BTreeMap;
use std::fmt;

use axum::http::{HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::routing::matcher::{PathPattern, PatternError};
use crate::template::extract::Source;

/// A project owning a set of endpoint definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Host under which the tenant's endpoints are served without the
    /// `/api/{tenant}` prefix.
    #[serde(default)]
    pub custom_domain: Option<String>,
}

/// HTTP method an endpoint answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndpointMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    /// Wildcard, used as a fallback behind method-specific definitions.
    Any,
}

impl EndpointMethod {
    pub fn is_any(&self) -> bool {
        matches!(self, EndpointMethod::Any)
    }

    /// Exact method equality.
    pub fn is(&self, method: &Method) -> bool {
        match self {
            EndpointMethod::Get => method == Method::GET,
            EndpointMethod::Post => method == Method::POST,
            EndpointMethod::Put => method == Method::PUT,
            EndpointMethod::Patch => method == Method::PATCH,
            EndpointMethod::Delete => method == Method::DELETE,
            EndpointMethod::Head => method == Method::HEAD,
            EndpointMethod::Options => method == Method::OPTIONS,
            EndpointMethod::Any => false,
        }
    }

    /// Exact match or wildcard.
    pub fn accepts(&self, method: &Method) -> bool {
        self.is_any() || self.is(method)
    }
}

impl fmt::Display for EndpointMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndpointMethod::Get => "GET",
            EndpointMethod::Post => "POST",
            EndpointMethod::Put => "PUT",
            EndpointMethod::Patch => "PATCH",
            EndpointMethod::Delete => "DELETE",
            EndpointMethod::Head => "HEAD",
            EndpointMethod::Options => "OPTIONS",
            EndpointMethod::Any => "ANY",
        };
        f.write_str(s)
    }
}

/// Where a dynamic field takes its value from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub source: Source,
    pub path: String,
}

/// A registered fake endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDefinition {
    #[serde(default)]
    pub id: String,

    pub tenant_id: String,

    #[serde(default)]
    pub name: Option<String>,

    pub method: EndpointMethod,

    #[serde(alias = "path")]
    pub path_template: String,

    /// Response body skeleton. `null`, `false`, `0` and `""` are served as `{}`.
    #[serde(default)]
    pub response_template: Value,

    /// Response field path -> request binding.
    #[serde(default)]
    pub dynamic_fields: BTreeMap<String, Binding>,

    /// Extra response headers, merged over `Content-Type: application/json`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Reasons a definition is refused by the catalog.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("endpoint id is empty")]
    EmptyId,

    #[error("tenant id is empty")]
    EmptyTenant,

    #[error("invalid path template: {0}")]
    Pattern(#[from] PatternError),

    #[error("invalid response field path `{0}`")]
    FieldPath(String),

    #[error("invalid source path `{path}` for field `{field}`")]
    SourcePath { field: String, path: String },

    #[error("invalid header `{0}`")]
    Header(String),
}

impl EndpointDefinition {
    /// Assign a fresh id when none was supplied.
    pub fn with_generated_id(mut self) -> Self {
        if self.id.trim().is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
        self
    }

    /// Check the definition's invariants, returning its parsed path pattern.
    pub fn validate(&self) -> Result<PathPattern, ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.tenant_id.trim().is_empty() {
            return Err(ValidationError::EmptyTenant);
        }

        let pattern = PathPattern::parse(&self.path_template)?;

        for (field, binding) in &self.dynamic_fields {
            if !is_dotted_path(field) || has_oversized_index(field) {
                return Err(ValidationError::FieldPath(field.clone()));
            }
            if !is_dotted_path(&binding.path) {
                return Err(ValidationError::SourcePath {
                    field: field.clone(),
                    path: binding.path.clone(),
                });
            }
        }

        for (name, value) in &self.headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err()
                || HeaderValue::from_str(value).is_err()
            {
                return Err(ValidationError::Header(name.clone()));
            }
        }

        Ok(pattern)
    }
}

/// A dotted path is non-empty and has no empty segments.
pub fn is_dotted_path(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(|s| !s.trim().is_empty())
}

/// Largest numeric segment accepted in a response field path.
pub const MAX_FIELD_INDEX: u64 = u32::MAX as u64;

/// True when an all-digit segment is too large to be a sensible array index.
pub fn has_oversized_index(path: &str) -> bool {
    path.split('.').any(|segment| {
        !segment.is_empty()
            && segment.bytes().all(|b| b.is_ascii_digit())
            && segment.parse::<u64>().map_or(true, |n| n > MAX_FIELD_INDEX)
    })
}

/// A captured webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRecord {
    pub id: Uuid,

    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,

    pub headers: BTreeMap<String, String>,

    pub raw_body: String,

    /// Parsed body when the content type was JSON and parsing succeeded.
    pub body: Option<Value>,

    pub content_type: String,
}
