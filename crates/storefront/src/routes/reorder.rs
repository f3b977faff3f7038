//! Reorder route handlers.

use axum::{
    Json,
    extract::{OriginalUri, State},
    http::{StatusCode, Uri},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use optica_core::{CartIdentity, ReorderReference};

use crate::error::{AppError, Result};
use crate::middleware::reorder_rewrite::REORDER_PARAM;
use crate::reorder::{CartReplayer, ReorderController, SessionCartProvider, run_reorder};
use crate::state::AppState;

/// First non-blank `reorder` parameter of `uri`.
fn reorder_reference(uri: &Uri) -> Option<ReorderReference> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == REORDER_PARAM)
        .find_map(|(_, value)| ReorderReference::parse(value).ok())
}

/// Internal reorder entry point, reached through the rewrite gate.
///
/// Replays the referenced cart into the visitor's cart, then sends the
/// visitor to the cart view. Always answers `303 See Other` to `/cart`.
///
/// # Route
///
/// `GET /cart/reorder`
#[instrument(skip_all, fields(requested = %original))]
pub async fn entry(
    State(state): State<AppState>,
    session: Session,
    OriginalUri(original): OriginalUri,
    uri: Uri,
) -> Redirect {
    let mut controller = ReorderController::new(reorder_reference(&uri));
    let carts = SessionCartProvider::new(session, state.storefront().clone());

    let target = run_reorder(&mut controller, &carts, state.replayer()).await;
    Redirect::to(target)
}

/// Body of a direct replay request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayRequest {
    pub source_cart_reference: String,
    pub destination_cart_identity: String,
}

/// Replay a cart into another cart.
///
/// # Route
///
/// `POST /api/cart/reorder`
///
/// # Errors
///
/// Returns `AppError::BadRequest` for blank identifiers and
/// `AppError::Shopify` (502) if the replay fails.
#[instrument(skip_all)]
pub async fn replay(
    State(state): State<AppState>,
    Json(body): Json<ReplayRequest>,
) -> Result<StatusCode> {
    let source = ReorderReference::parse(&body.source_cart_reference)
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .to_cart_identity();
    let destination = CartIdentity::parse(&body.destination_cart_identity)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let outcome = state.replayer().replay(&source, &destination).await?;
    tracing::info!(?outcome, "Cart replayed");

    Ok(StatusCode::NO_CONTENT)
}
