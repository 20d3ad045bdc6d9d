//! Fake endpoint dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest (method, path, host, query, headers, body)
//!     → dispatcher.rs (classify addressing scheme, resolve tenant)
//!     → routing (select definition, extract captures)
//!     → template (build parameter bag, materialize body)
//!     → DispatchResponse (200 + headers + JSON) or DispatchError
//! ```
//!
//! # Design Decisions
//! - Transport-agnostic: the HTTP layer converts to and from these types
//! - No shared mutable state; every request runs independently
//! - Simulated latency is an async sleep, never a blocking one

pub mod dispatcher;
pub mod error;
pub mod request;

pub use dispatcher::{Addressing, DispatchResponse, Dispatcher, Stage};
pub use error::DispatchError;
pub use request::InboundRequest;
