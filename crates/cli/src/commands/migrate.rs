//! Database migration commands.
//!
//! Storefront migrations live in `crates/storefront/migrations/` and create
//! the `storefront` schema with the session and wishlist tables.

use super::{CommandError, connect_storefront};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn storefront() -> Result<(), CommandError> {
    let pool = connect_storefront().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}
