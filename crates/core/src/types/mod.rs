//! Core types for Optica.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod collection;
pub mod id;
pub mod price;
pub mod product;
pub mod session;

pub use collection::Collection;
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use product::ProductReference;
pub use session::SessionState;
