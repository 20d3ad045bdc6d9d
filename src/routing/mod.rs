//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (tenant, concrete path, method)
//!     → router.rs (load tenant's definitions, rank candidates)
//!     → matcher.rs (match path template, extract captures)
//!     → Return: matched definition + captures, or NotFound
//! ```
//!
//! # Design Decisions
//! - Definitions are immutable; resolution needs no locks
//! - Method-specific definitions win over `ANY`
//! - Deterministic: same catalog and request always pick the same definition

pub mod matcher;
pub mod router;

pub use matcher::{MatchMode, PathParams, PathPattern};
pub use router::{Resolved, Resolver};
