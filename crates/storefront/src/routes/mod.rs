//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Cart
//! GET  /cart                   - Cart view
//! GET  /cart?reorder=<ref>     - Rewritten to /cart/reorder before routing
//! GET  /cart/reorder           - Replay a historical cart, then redirect to /cart
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Update quantity
//! POST /cart/remove            - Remove line
//! GET  /cart/count             - Cart count
//! GET  /checkout               - Redirect to Shopify checkout
//!
//! # Wishlist
//! GET  /wishlist               - Wishlist view
//! POST /wishlist/add           - Add a product
//! POST /wishlist/remove        - Remove a product
//! GET  /wishlist/contains/:id  - Presence check
//!
//! # API (rate limited)
//! GET  /api/wishlist           - Whole collection
//! PUT  /api/wishlist           - Replace collection
//! POST /api/cart/reorder       - Replay one cart into another
//! GET  /api/banner             - Promo banner state
//! POST /api/banner/dismiss     - Dismiss promo banner
//!
//! # Shopify Customer OAuth (rate limited)
//! GET  /auth/shopify/login     - Redirect to Shopify OAuth
//! GET  /auth/shopify/callback  - Handle OAuth callback
//! POST /auth/shopify/logout    - Logout
//! ```

pub mod api;
pub mod cart;
pub mod reorder;
pub mod shopify_auth;
pub mod wishlist;

use axum::{
    Router,
    extract::{OriginalUri, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/shopify/login", get(shopify_auth::login))
        .route("/shopify/callback", get(shopify_auth::callback))
        .route("/shopify/logout", post(shopify_auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/wishlist", get(api::get_wishlist).put(api::put_wishlist))
        .route("/cart/reorder", post(reorder::replay))
        .route("/banner", get(api::banner))
        .route("/banner/dismiss", post(api::dismiss_banner))
        .layer(api_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .route("/reorder", get(reorder::entry))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/contains/{id}", get(wishlist::contains))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout))
        .nest("/wishlist", wishlist_routes())
        .nest("/api", api_routes())
        .nest("/auth", auth_routes())
        .fallback(not_found)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
