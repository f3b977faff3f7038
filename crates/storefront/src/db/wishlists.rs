//! Wishlist repository for authenticated customers.
//!
//! Each customer has at most one row holding the whole collection as a JSON
//! array. Writes replace the array wholesale; there is no per-item table.

use sqlx::PgPool;
use sqlx::types::Json;

use optica_core::{CustomerId, ProductReference};

use super::RepositoryError;

/// Repository for wishlist database operations.
#[derive(Clone)]
pub struct WishlistRepository {
    pool: PgPool,
}

impl WishlistRepository {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a customer's stored wishlist.
    ///
    /// Returns `None` if the customer has never saved one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored JSON is not a list of references.
    pub async fn get(
        &self,
        customer: &CustomerId,
    ) -> Result<Option<Vec<ProductReference>>, RepositoryError> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            r"
            SELECT items
            FROM storefront.wishlist
            WHERE customer_id = $1
            ",
        )
        .bind(customer)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(items,)| {
            serde_json::from_value(items).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid wishlist for {customer}: {e}"))
            })
        })
        .transpose()
    }

    /// Replace a customer's wishlist with `items`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn replace(
        &self,
        customer: &CustomerId,
        items: &[ProductReference],
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.wishlist (customer_id, items, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (customer_id)
            DO UPDATE SET items = EXCLUDED.items, updated_at = now()
            ",
        )
        .bind(customer)
        .bind(Json(items))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
