//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route table)
//!     → request.rs (request ID, host, bounded body buffering)
//!     → dispatch (resolve + materialize)
//!     → response.rs (JSON body, endpoint headers, error mapping)
//!     → Send to client
//!
//! /api/webhook → webhook.rs (capture only)
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod webhook;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
