//! Wardrobe Core - Shared types library.
//!
//! This crate provides common types used across all wardrobe components:
//! - `functions` - Callable and trigger handlers plus their HTTP host
//! - `cli` - Command-line tools for migrations, seeding and manual invocation
//!
//! # Architecture
//!
//! The core crate contains only types and pure transformations - no I/O, no
//! database access, no HTTP clients. Document store backends live in the
//! `functions` crate and share the write semantics defined here.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, document paths, trigger path patterns and write batches
//! - [`wardrobe`] - Outfit, item and wear log documents and their store layout
//! - [`callable`] - Request/response schemas for the callable functions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod callable;
pub mod types;
pub mod wardrobe;

pub use types::*;
