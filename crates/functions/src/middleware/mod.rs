//! HTTP middleware for the functions host.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Caller identity is read per route by the [`CallerAuth`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::CallerAuth;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
