//! Wishlist state and persistence.
//!
//! The in-memory [`CollectionManager`] is authoritative for a request. It
//! writes through to exactly one adapter chosen by session state:
//!
//! | state             | adapter                                         |
//! |-------------------|-------------------------------------------------|
//! | `Loading`         | none                                            |
//! | `Unauthenticated` | [`SessionCollectionStore`] (visitor session)    |
//! | `Authenticated`   | [`AccountCollectionStore`] (`storefront.wishlist`) |

mod extract;
pub mod local;
pub mod manager;
pub mod remote;

use std::future::Future;

use thiserror::Error;

use optica_core::{CustomerId, ProductReference};

use crate::db::RepositoryError;

pub use local::SessionCollectionStore;
pub use manager::CollectionManager;
pub use remote::AccountCollectionStore;

/// The wishlist manager as wired into the server.
pub type Wishlist = CollectionManager<SessionCollectionStore, AccountCollectionStore>;

/// Persistence adapter failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Session record could not be read or written.
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Account store query failed.
    #[error("account store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Guest-side storage, scoped to one visitor.
pub trait LocalAdapter: Send + Sync {
    /// Read the stored collection. Missing data reads as empty.
    fn load(&self) -> impl Future<Output = Result<Vec<ProductReference>, StoreError>> + Send;

    /// Replace the stored collection with `items`.
    fn store(
        &self,
        items: &[ProductReference],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Account-side storage, keyed by customer.
///
/// Writes run on a spawned task, so implementations must be cheap to clone
/// and own everything they need.
pub trait RemoteAdapter: Clone + Send + Sync + 'static {
    /// Read the customer's collection. A customer with none reads as empty.
    fn load(
        &self,
        customer: &CustomerId,
    ) -> impl Future<Output = Result<Vec<ProductReference>, StoreError>> + Send;

    /// Replace the customer's collection with `items`.
    fn store(
        &self,
        customer: &CustomerId,
        items: Vec<ProductReference>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
