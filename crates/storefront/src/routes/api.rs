//! JSON API handlers.
//!
//! `/api/wishlist` is the collection endpoint: reads return the whole list
//! and writes replace it. `/api/banner` exposes the promo banner dismissal.

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use optica_core::{Collection, ProductReference};

use crate::collection::Wishlist;
use crate::dismissals;
use crate::error::Result;
use crate::models::session_keys;

// =============================================================================
// Wishlist
// =============================================================================

/// Collection endpoint payload.
#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub items: Collection,
    pub authenticated: bool,
}

impl From<&Wishlist> for CollectionResponse {
    fn from(wishlist: &Wishlist) -> Self {
        Self {
            items: wishlist.items().clone(),
            authenticated: wishlist.session_state().is_authenticated(),
        }
    }
}

/// Full replacement body.
#[derive(Debug, Deserialize)]
pub struct ReplaceRequest {
    pub items: Vec<ProductReference>,
}

/// Read the visitor's whole collection.
///
/// # Route
///
/// `GET /api/wishlist`
#[instrument(skip_all)]
pub async fn get_wishlist(wishlist: Wishlist) -> Json<CollectionResponse> {
    Json(CollectionResponse::from(&wishlist))
}

/// Replace the visitor's whole collection.
///
/// # Route
///
/// `PUT /api/wishlist`
#[instrument(skip_all, fields(items = body.items.len()))]
pub async fn put_wishlist(
    mut wishlist: Wishlist,
    Json(body): Json<ReplaceRequest>,
) -> Json<CollectionResponse> {
    wishlist.replace(body.items).await;
    Json(CollectionResponse::from(&wishlist))
}

// =============================================================================
// Banner
// =============================================================================

/// Promo banner dismissal state.
#[derive(Debug, Serialize)]
pub struct BannerState {
    pub dismissed: bool,
}

/// Whether the promo banner is dismissed for this session state.
///
/// # Route
///
/// `GET /api/banner`
///
/// # Errors
///
/// Returns `AppError::Session` if the session cannot be read.
#[instrument(skip_all)]
pub async fn banner(session: Session) -> Result<Json<BannerState>> {
    let dismissed = dismissals::is_dismissed(&session, session_keys::PROMO_BANNER_DISMISSED).await?;
    Ok(Json(BannerState { dismissed }))
}

/// Dismiss the promo banner until the session state next changes.
///
/// # Route
///
/// `POST /api/banner/dismiss`
///
/// # Errors
///
/// Returns `AppError::Session` if the session cannot be written.
#[instrument(skip_all)]
pub async fn dismiss_banner(session: Session) -> Result<StatusCode> {
    dismissals::dismiss(&session, session_keys::PROMO_BANNER_DISMISSED).await?;
    Ok(StatusCode::NO_CONTENT)
}
