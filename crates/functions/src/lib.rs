//! Wardrobe backend functions.
//!
//! Two event-driven functions over a per-user document store:
//!
//! - `recommendOutfits` - authenticated callable ranking a user's outfits for
//!   an occasion ([`handlers::recommend_outfits`])
//! - wear log fan-out - trigger on `users/{uid}/wearLogs/{logId}` creation
//!   that bumps usage counters on every referenced item
//!   ([`handlers::on_wear_log_create`])
//!
//! The library exposes the handlers, the store and the HTTP app so the binary,
//! the CLI and the integration tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use routes::app;
pub use state::AppState;
