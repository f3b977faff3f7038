//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::reorder::ShopifyCartReplayer;
use crate::shopify::{CustomerClient, StorefrontClient};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    storefront: StorefrontClient,
    customer: CustomerClient,
    replayer: ShopifyCartReplayer,
}

impl AppState {
    /// Create the application state and its Shopify clients.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let storefront = StorefrontClient::new(&config.shopify);
        let customer = CustomerClient::new(&config.shopify);
        let replayer = ShopifyCartReplayer::new(storefront.clone(), config.reorder_dedupe);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storefront,
                customer,
                replayer,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Shopify Storefront API client (carts).
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Shopify Customer Account API client (login).
    #[must_use]
    pub fn customer(&self) -> &CustomerClient {
        &self.inner.customer
    }

    /// Shared reorder replayer; its dedupe window spans requests.
    #[must_use]
    pub fn replayer(&self) -> &ShopifyCartReplayer {
        &self.inner.replayer
    }
}
