//! Endpoint catalog subsystem (the storage collaborator).
//!
//! # Data Flow
//! ```text
//! catalog file (JSON)
//!     → loader.rs (parse & deserialize)
//!     → memory.rs (validate, build immutable snapshot, atomic swap)
//!     → read by routing + dispatch through the EndpointStore trait
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new catalog
//!     → store.replace_catalog (rejects invalid catalogs whole)
//! ```
//!
//! # Design Decisions
//! - The store is constructed explicitly and passed in; there is no global handle
//! - Definitions are handed out as `Arc` and never mutated after load
//! - No resolution cache: a swap is visible to the next request

pub mod loader;
pub mod memory;
pub mod store;
pub mod types;
pub mod watcher;

pub use loader::{load_catalog, CatalogFile};
pub use memory::InMemoryStore;
pub use store::{EndpointStore, StoreError, StoreResult};
pub use types::{Binding, EndpointDefinition, EndpointMethod, Tenant, WebhookRecord};
