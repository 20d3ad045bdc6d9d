//! Multi-tenant fake API server library.

pub mod admin;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod template;

pub use catalog::{EndpointStore, InMemoryStore};
pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
