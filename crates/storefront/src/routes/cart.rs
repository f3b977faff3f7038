//! Cart route handlers.
//!
//! The cart lives in Shopify; the session only remembers its id. Handlers
//! answer with JSON views built from the Storefront API cart.

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::models::session_keys;
use crate::reorder::ReorderController;
use crate::shopify::types::{Cart as ShopifyCart, CartLine, CartLineInput, CartLineUpdateInput};
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Cart line as shown to the visitor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: Option<String>,
    /// Present when the line is a subscription.
    pub selling_plan_id: Option<String>,
}

/// Cart as shown to the visitor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&ShopifyCart> for CartView {
    fn from(cart: &ShopifyCart) -> Self {
        Self {
            items: cart.lines.iter().map(CartItemView::from).collect(),
            subtotal: cart.cost.subtotal.display(),
            item_count: u32::try_from(cart.total_quantity).unwrap_or(0),
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.clone(),
            handle: line.merchandise.product.handle.clone(),
            title: line.merchandise.product.title.clone(),
            variant_title: (line.merchandise.title != "Default Title")
                .then(|| line.merchandise.title.clone()),
            quantity: u32::try_from(line.quantity).unwrap_or(1),
            price: line.cost.amount_per_quantity.display(),
            line_price: line.cost.total_amount.display(),
            image_url: line.merchandise.image.as_ref().map(|img| img.url.clone()),
            selling_plan_id: line
                .selling_plan_allocation
                .as_ref()
                .map(|a| a.selling_plan.id.clone()),
        }
    }
}

/// Cart count badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session.
async fn get_cart_id(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::CART_ID)
        .await
        .ok()
        .flatten()
}

/// Set the cart ID in the session.
async fn set_cart_id(
    session: &Session,
    cart_id: &str,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART_ID, cart_id).await
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: String,
    pub quantity: Option<u32>,
    pub selling_plan_id: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
///
/// `/cart?reorder=<ref>` never reaches this handler; the rewrite gate sends
/// it to `/cart/reorder`.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Json<CartView> {
    let cart = match get_cart_id(&session).await {
        Some(cart_id) => match state.storefront().get_cart(&cart_id).await {
            Ok(shopify_cart) => CartView::from(&shopify_cart),
            Err(e) => {
                tracing::warn!(cart_id = %cart_id, error = %e, "Failed to fetch cart");
                CartView::empty()
            }
        },
        None => CartView::empty(),
    };

    Json(cart)
}

/// Add item to cart, creating the cart if needed.
///
/// # Errors
///
/// Returns `AppError::Shopify` if the Storefront API rejects the line.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Json<CartCount>> {
    let line = CartLineInput {
        merchandise_id: form.variant_id,
        quantity: i64::from(form.quantity.unwrap_or(1)),
        attributes: None,
        selling_plan_id: form.selling_plan_id,
    };

    let cart = match get_cart_id(&session).await {
        Some(cart_id) => state.storefront().add_to_cart(&cart_id, vec![line]).await?,
        None => state.storefront().create_cart(Some(vec![line])).await?,
    };

    if let Err(e) = set_cart_id(&session, &cart.id).await {
        tracing::error!(error = %e, "Failed to save cart ID to session");
    }

    Ok(Json(CartCount {
        count: u32::try_from(cart.total_quantity).unwrap_or(0),
    }))
}

/// Update cart item quantity.
///
/// # Errors
///
/// Returns `AppError::Shopify` if the update fails.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Json<CartView>> {
    let Some(cart_id) = get_cart_id(&session).await else {
        return Ok(Json(CartView::empty()));
    };

    let line_update = CartLineUpdateInput {
        id: form.line_id,
        quantity: Some(i64::from(form.quantity)),
    };

    let cart = state
        .storefront()
        .update_cart(&cart_id, vec![line_update])
        .await?;

    Ok(Json(CartView::from(&cart)))
}

/// Remove item from cart.
///
/// # Errors
///
/// Returns `AppError::Shopify` if the removal fails.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Json<CartView>> {
    let Some(cart_id) = get_cart_id(&session).await else {
        return Ok(Json(CartView::empty()));
    };

    let cart = state
        .storefront()
        .remove_from_cart(&cart_id, vec![form.line_id])
        .await?;

    Ok(Json(CartView::from(&cart)))
}

/// Cart count badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Json<CartCount> {
    let count = match get_cart_id(&session).await {
        Some(cart_id) => state
            .storefront()
            .get_cart(&cart_id)
            .await
            .map(|cart| u32::try_from(cart.total_quantity).unwrap_or(0))
            .unwrap_or(0),
        None => 0,
    };

    Json(CartCount { count })
}

/// Redirect to Shopify checkout.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Response {
    let Some(cart_id) = get_cart_id(&session).await else {
        return Redirect::to(ReorderController::REDIRECT_TARGET).into_response();
    };

    match state.storefront().get_cart(&cart_id).await {
        Ok(cart) => Redirect::to(&cart.checkout_url).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get cart for checkout");
            Redirect::to(ReorderController::REDIRECT_TARGET).into_response()
        }
    }
}
