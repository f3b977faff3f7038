//! Guest wishlist kept in the visitor's session record.

use tower_sessions::Session;

use optica_core::ProductReference;

use super::{LocalAdapter, StoreError};
use crate::models::session_keys;

/// Stores the guest wishlist under [`session_keys::WISHLIST`] as a JSON array.
#[derive(Clone)]
pub struct SessionCollectionStore {
    session: Session,
}

impl SessionCollectionStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl LocalAdapter for SessionCollectionStore {
    async fn load(&self) -> Result<Vec<ProductReference>, StoreError> {
        Ok(self
            .session
            .get::<Vec<ProductReference>>(session_keys::WISHLIST)
            .await?
            .unwrap_or_default())
    }

    async fn store(&self, items: &[ProductReference]) -> Result<(), StoreError> {
        self.session.insert(session_keys::WISHLIST, items).await?;
        Ok(())
    }
}
