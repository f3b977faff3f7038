//! Shopify-backed cart provider and replayer.

use std::time::Duration;

use moka::future::Cache;
use tower_sessions::Session;
use tracing::instrument;

use optica_core::CartIdentity;

use super::{CartProvider, CartReplayer, ReorderError, ReplayOutcome};
use crate::models::session_keys;
use crate::shopify::{CartLine, StorefrontClient};

/// Most (source, destination) pairs remembered for deduplication.
const DEDUPE_CAPACITY: u64 = 10_000;

/// Replays cart lines through the Storefront API.
///
/// Each (source, destination) pair is replayed at most once per dedupe
/// window, so a prefetch followed by a click adds the lines once.
#[derive(Clone)]
pub struct ShopifyCartReplayer {
    storefront: StorefrontClient,
    recent: Cache<(CartIdentity, CartIdentity), ()>,
}

impl ShopifyCartReplayer {
    #[must_use]
    pub fn new(storefront: StorefrontClient, dedupe_window: Duration) -> Self {
        let recent = Cache::builder()
            .max_capacity(DEDUPE_CAPACITY)
            .time_to_live(dedupe_window)
            .build();

        Self { storefront, recent }
    }

    async fn copy_lines(
        &self,
        source: &CartIdentity,
        destination: &CartIdentity,
    ) -> Result<ReplayOutcome, ReorderError> {
        let previous = self.storefront.get_cart(source.as_str()).await?;
        if previous.lines.is_empty() {
            return Ok(ReplayOutcome::EmptySource);
        }

        let lines: Vec<_> = previous.lines.iter().map(CartLine::to_input).collect();
        let count = lines.len();
        self.storefront
            .add_to_cart(destination.as_str(), lines)
            .await?;

        Ok(ReplayOutcome::Replayed { lines: count })
    }
}

impl CartReplayer for ShopifyCartReplayer {
    #[instrument(skip(self), fields(source = %source, destination = %destination))]
    async fn replay(
        &self,
        source: &CartIdentity,
        destination: &CartIdentity,
    ) -> Result<ReplayOutcome, ReorderError> {
        let key = (source.clone(), destination.clone());
        let entry = self.recent.entry(key.clone()).or_insert(()).await;
        if !entry.is_fresh() {
            tracing::info!("Skipping duplicate reorder replay");
            return Ok(ReplayOutcome::Duplicate);
        }

        let outcome = self.copy_lines(source, destination).await;
        if outcome.is_err() {
            // Nothing was replayed, so the next attempt must not count as a duplicate
            self.recent.invalidate(&key).await;
        }
        outcome
    }
}

/// The visitor's cart as remembered in their session.
#[derive(Clone)]
pub struct SessionCartProvider {
    session: Session,
    storefront: StorefrontClient,
}

impl SessionCartProvider {
    #[must_use]
    pub const fn new(session: Session, storefront: StorefrontClient) -> Self {
        Self {
            session,
            storefront,
        }
    }
}

impl CartProvider for SessionCartProvider {
    async fn current(&self) -> Result<Option<CartIdentity>, ReorderError> {
        let stored: Option<String> = self.session.get(session_keys::CART_ID).await?;
        // A blank stored id is treated as no cart
        Ok(stored.and_then(|id| CartIdentity::parse(id).ok()))
    }

    #[instrument(skip(self))]
    async fn provision(&self) -> Result<CartIdentity, ReorderError> {
        let cart = self.storefront.create_cart(None).await?;
        let identity = CartIdentity::parse(cart.id)?;
        self.session
            .insert(session_keys::CART_ID, identity.as_str())
            .await?;
        Ok(identity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::ShopifyStorefrontConfig;

    /// A client for a store nothing listens on; every request fails fast.
    fn unreachable_storefront() -> StorefrontClient {
        StorefrontClient::new(&ShopifyStorefrontConfig {
            store: "127.0.0.1:9".to_string(),
            api_version: "2026-01".to_string(),
            storefront_private_token: SecretString::from("token"),
            customer_shop_id: "1".to_string(),
            customer_client_id: "client".to_string(),
            customer_client_secret: SecretString::from("secret"),
        })
    }

    fn replayer() -> ShopifyCartReplayer {
        ShopifyCartReplayer::new(unreachable_storefront(), Duration::from_secs(30))
    }

    fn cart(id: &str) -> CartIdentity {
        CartIdentity::parse(format!("gid://shopify/Cart/{id}")).unwrap()
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_repeated_pair_is_skipped() {
        let replayer = replayer();
        replayer.recent.insert((cart("old"), cart("new")), ()).await;

        // The store is unreachable, so only a skipped replay can succeed
        let outcome = replayer.replay(&cart("old"), &cart("new")).await.unwrap();
        assert_eq!(outcome, ReplayOutcome::Duplicate);
    }

    #[tokio::test]
    async fn test_other_destination_is_not_a_duplicate() {
        let replayer = replayer();
        replayer.recent.insert((cart("old"), cart("new")), ()).await;

        assert!(replayer.replay(&cart("old"), &cart("other")).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_replay_does_not_block_retry() {
        let replayer = replayer();

        assert!(replayer.replay(&cart("old"), &cart("new")).await.is_err());
        // A retry is attempted again and fails the same way
        let retry = replayer.replay(&cart("old"), &cart("new")).await;
        assert!(matches!(retry, Err(ReorderError::Shopify(_))));
        assert!(!replayer.recent.contains_key(&(cart("old"), cart("new"))));
    }

    #[tokio::test]
    async fn test_current_cart_from_session() {
        let session = session();
        let provider = SessionCartProvider::new(session.clone(), unreachable_storefront());
        assert!(provider.current().await.unwrap().is_none());

        session
            .insert(session_keys::CART_ID, "gid://shopify/Cart/c1")
            .await
            .unwrap();
        assert_eq!(provider.current().await.unwrap(), Some(cart("c1")));
    }

    #[tokio::test]
    async fn test_blank_stored_cart_is_no_cart() {
        let session = session();
        session.insert(session_keys::CART_ID, "  ").await.unwrap();

        let provider = SessionCartProvider::new(session, unreachable_storefront());
        assert!(provider.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_provision_stores_nothing() {
        let session = session();
        let provider = SessionCartProvider::new(session.clone(), unreachable_storefront());

        assert!(provider.provision().await.is_err());
        let stored: Option<String> = session.get(session_keys::CART_ID).await.unwrap();
        assert!(stored.is_none());
    }
}
