//! Wishlist route handlers.
//!
//! Each handler receives a hydrated [`Wishlist`] and answers from its
//! in-memory collection. Persistence happens behind the response and its
//! failures are only logged.

use axum::{Json, extract::Path};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use optica_core::{Collection, ProductRefId, ProductReference};

use crate::collection::Wishlist;
use crate::error::{AppError, Result, add_breadcrumb};

/// Wishlist as shown to the visitor.
#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub items: Collection,
    pub count: usize,
}

impl From<&Wishlist> for WishlistView {
    fn from(wishlist: &Wishlist) -> Self {
        Self {
            items: wishlist.items().clone(),
            count: wishlist.items().len(),
        }
    }
}

/// Result of an add or remove.
#[derive(Debug, Serialize)]
pub struct WishlistChange {
    pub changed: bool,
    pub count: usize,
}

/// Remove request body.
#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub id: ProductRefId,
}

/// Membership answer.
#[derive(Debug, Serialize)]
pub struct Presence {
    pub present: bool,
}

/// Show the wishlist.
///
/// # Route
///
/// `GET /wishlist`
#[instrument(skip_all)]
pub async fn show(wishlist: Wishlist) -> Json<WishlistView> {
    Json(WishlistView::from(&wishlist))
}

/// Add a product reference. Adding one already present changes nothing.
///
/// # Route
///
/// `POST /wishlist/add`
#[instrument(skip_all, fields(product_id = %item.id))]
pub async fn add(mut wishlist: Wishlist, Json(item): Json<ProductReference>) -> Json<WishlistChange> {
    add_breadcrumb("wishlist", "Added to wishlist", Some(&[("product_id", item.id.as_str())]));
    let changed = wishlist.add(item).await;

    Json(WishlistChange {
        changed,
        count: wishlist.items().len(),
    })
}

/// Remove a product reference by id. Removing one not present changes nothing.
///
/// # Route
///
/// `POST /wishlist/remove`
#[instrument(skip_all, fields(product_id = %body.id))]
pub async fn remove(mut wishlist: Wishlist, Json(body): Json<RemoveRequest>) -> Json<WishlistChange> {
    add_breadcrumb("wishlist", "Removed from wishlist", Some(&[("product_id", body.id.as_str())]));
    let changed = wishlist.remove(&body.id).await;

    Json(WishlistChange {
        changed,
        count: wishlist.items().len(),
    })
}

/// Whether a product is in the wishlist.
///
/// # Route
///
/// `GET /wishlist/contains/{id}`
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a blank id.
#[instrument(skip(wishlist))]
pub async fn contains(wishlist: Wishlist, Path(id): Path<String>) -> Result<Json<Presence>> {
    let id = ProductRefId::parse(id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(Json(Presence {
        present: wishlist.is_present(&id),
    }))
}
