//! Dispatch error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

use crate::catalog::store::StoreError;
use crate::template::materialize::MaterializeError;

/// Errors that end a dispatch. `Display` is the client-facing message for
/// every variant except `Internal`, whose detail is only logged.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Malformed request addressing. Not raised by the current matcher.
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid API path")]
    InvalidPath,

    #[error("Project not found")]
    TenantNotFound,

    #[error("API not found for path: {path} and method: {method}")]
    EndpointNotFound { path: String, method: String },

    /// Direct-id addressing with an unknown id.
    #[error("API not found")]
    UnknownEndpoint { id: String },

    /// Direct-id addressing with a method the endpoint does not declare.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    /// Path outside `/api/` on a host that is not a custom domain.
    #[error("Not found")]
    NoRoute,

    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DispatchError::InvalidPath
            | DispatchError::TenantNotFound
            | DispatchError::EndpointNotFound { .. }
            | DispatchError::UnknownEndpoint { .. }
            | DispatchError::NoRoute => StatusCode::NOT_FOUND,
            DispatchError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the client.
    pub fn client_message(&self) -> String {
        match self {
            DispatchError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for DispatchError {
    fn from(e: StoreError) -> Self {
        DispatchError::Internal(e.to_string())
    }
}

impl From<MaterializeError> for DispatchError {
    fn from(e: MaterializeError) -> Self {
        DispatchError::Internal(e.to_string())
    }
}
