//! Optica Core - Shared types library.
//!
//! This crate provides common types used across all Optica components:
//! - `storefront` - Public-facing eyewear and contact lens shop
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Opaque tokens, product references, collections, session state and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
