//! Customer wishlist kept in `PostgreSQL`.

use optica_core::{CustomerId, ProductReference};

use super::{RemoteAdapter, StoreError};
use crate::db::WishlistRepository;

/// Account store backed by [`WishlistRepository`].
#[derive(Clone)]
pub struct AccountCollectionStore {
    repository: WishlistRepository,
}

impl AccountCollectionStore {
    #[must_use]
    pub const fn new(repository: WishlistRepository) -> Self {
        Self { repository }
    }
}

impl RemoteAdapter for AccountCollectionStore {
    async fn load(&self, customer: &CustomerId) -> Result<Vec<ProductReference>, StoreError> {
        Ok(self.repository.get(customer).await?.unwrap_or_default())
    }

    async fn store(
        &self,
        customer: &CustomerId,
        items: Vec<ProductReference>,
    ) -> Result<(), StoreError> {
        self.repository.replace(customer, &items).await?;
        Ok(())
    }
}
