//! Core types for the wardrobe document store.
//!
//! This module provides type-safe wrappers for ids and document paths, and
//! the write primitives shared by every store backend.

pub mod document;
pub mod id;
pub mod path;
pub mod write;

pub use document::{Document, Fields, counter_value, format_timestamp};
pub use id::*;
pub use path::{CollectionPath, DocumentPath, PathError, PathParams, PathPattern};
pub use write::{FieldUpdates, FieldValue, Write, WriteBatch};
