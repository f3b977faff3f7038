//! Session layer configuration.
//!
//! Every visitor gets a signed `tower-sessions` cookie. The record holds the
//! guest wishlist, the cart id, the customer identity and UI flags.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore, cookie::Key, cookie::SameSite,
    service::SignedCookie,
};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "optica_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// `PostgreSQL` session store in `storefront.session`.
///
/// The table is created by the storefront migrations.
#[must_use]
pub fn session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
        .with_schema_name("storefront")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name")
}

/// Create the session layer over `store`.
///
/// The cookie is signed with the configured session secret, which config
/// validation guarantees is at least 64 bytes.
#[must_use]
pub fn create_session_layer<S>(
    store: S,
    config: &StorefrontConfig,
) -> SessionManagerLayer<S, SignedCookie>
where
    S: SessionStore + Clone,
{
    let key = Key::from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
