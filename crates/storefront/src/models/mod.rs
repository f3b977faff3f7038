//! Domain models for storefront.
//!
//! Types stored in the visitor's session and the fixed keys they live under.

pub mod session;

pub use session::{CurrentCustomer, session_keys};
