//! Function handlers.
//!
//! Each handler is a plain async function over a [`DocumentStore`], with no
//! HTTP types in its signature. The routes in [`crate::routes`] adapt them to
//! the wire; the CLI calls them directly.
//!
//! - [`recommend::recommend_outfits`] - callable, read-only
//! - [`wear_log::on_wear_log_create`] - trigger on `users/{uid}/wearLogs/{logId}`
//!
//! [`DocumentStore`]: crate::store::DocumentStore

pub mod recommend;
pub mod wear_log;

pub use recommend::recommend_outfits;
pub use wear_log::{FanoutReport, WearLogEvent, on_wear_log_create, stage_fanout};
