//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::MatchMode;

/// Root configuration for the fake API server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Artificial response latency.
    pub latency: LatencyConfig,

    /// Path matching and domain settings.
    pub routing: RoutingConfig,

    /// Endpoint catalog source.
    pub catalog: CatalogConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Management API settings.
    pub admin: AdminConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Simulated network latency added to every served fake response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub enabled: bool,

    /// Lower bound, inclusive, in milliseconds.
    pub min_ms: u64,

    /// Upper bound, exclusive, in milliseconds.
    pub max_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_ms: 100,
            max_ms: 300,
        }
    }
}

/// Routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// `strict` (literal segments and lengths must agree) or `loose`.
    pub matching: MatchMode,

    /// The server's own host name. Requests on this host never go through
    /// the custom-domain lookup.
    pub app_domain: Option<String>,
}

/// Catalog source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog loaded at startup.
    pub path: Option<String>,

    /// Reload the catalog when the file changes.
    pub watch: bool,

    /// Number of captured webhooks kept in memory.
    pub webhook_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            watch: false,
            webhook_capacity: 1_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Management API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the `/admin` routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes. Larger bodies are treated as empty.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [routing]
            matching = "loose"

            [latency]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.matching, MatchMode::Loose);
        assert!(!config.latency.enabled);
        assert_eq!(config.latency.min_ms, 100);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.security.max_body_size, 2 * 1024 * 1024);
    }
}
