//! Session-related types.
//!
//! Everything the storefront remembers about a visitor lives in one
//! `tower-sessions` record: identity, cart, guest wishlist, and UI flags.

use serde::{Deserialize, Serialize};

use optica_core::{CustomerId, SessionState};

use crate::shopify::CustomerAccessToken;

/// Session-stored customer identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Shopify customer GID.
    pub id: CustomerId,
    /// Customer email, if Shopify returned one.
    pub email: Option<String>,
    /// Customer Account API tokens.
    pub token: CustomerAccessToken,
}

impl CurrentCustomer {
    /// The session state this identity stands for.
    ///
    /// An expired access token no longer authenticates the visitor.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        if self.token.is_expired() {
            SessionState::Unauthenticated
        } else {
            SessionState::Authenticated(self.id.clone())
        }
    }
}

/// Fixed session keys.
pub mod session_keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for storing the Shopify cart ID.
    pub const CART_ID: &str = "cart_id";

    /// Key for the guest wishlist (JSON array of product references).
    pub const WISHLIST: &str = "wishlist";

    /// Key for the label of the last observed session state.
    pub const LAST_SESSION_STATE: &str = "last_session_state";

    /// Key for Shopify OAuth state (CSRF protection).
    pub const SHOPIFY_OAUTH_STATE: &str = "shopify_oauth_state";

    /// Key for Shopify OAuth nonce (`OpenID` Connect replay protection).
    pub const SHOPIFY_OAUTH_NONCE: &str = "shopify_oauth_nonce";

    /// Key for the promotional banner dismissal flag.
    pub const PROMO_BANNER_DISMISSED: &str = "promo_banner_dismissed";

    /// Every session-scoped dismissal flag. Cleared on each authentication transition.
    pub const DISMISSAL_FLAGS: &[&str] = &[PROMO_BANNER_DISMISSED];
}
