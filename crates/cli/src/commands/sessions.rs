//! Session store maintenance.
//!
//! The storefront purges expired sessions on a timer while it runs; this is
//! for deployments where it has been down for a while.

use tower_sessions::ExpiredDeletion;

use optica_storefront::middleware::session_store;

use super::{CommandError, connect_storefront};

/// Delete expired session records.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the delete fails.
pub async fn purge() -> Result<(), CommandError> {
    let pool = connect_storefront().await?;

    session_store(&pool).delete_expired().await?;

    tracing::info!("Expired sessions deleted");
    Ok(())
}
