//! Response template subsystem.
//!
//! # Data Flow
//! ```text
//! ParameterBag (body, query, params)
//!     → extract.rs (resolve one binding's source + dotted path)
//!     → materialize.rs (clone template, write resolved values)
//!     → response body
//! ```
//!
//! # Design Decisions
//! - Templates are `serde_json::Value` trees, cloned per request
//! - Unresolved bindings are skipped, never fatal
//! - No expressions, conditionals or loops: values are copied as-is

pub mod extract;
pub mod materialize;

pub use extract::{extract, ParameterBag, Source};
pub use materialize::{materialize, MaterializeError, MaterializeStats};
