//! Optica storefront library.
//!
//! Wishlist reconciliation across guest and customer sessions, and reorder
//! links that replay a historical cart. The binary in `main.rs` only loads
//! configuration and serves [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod collection;
pub mod config;
pub mod db;
pub mod dismissals;
pub mod error;
pub mod middleware;
pub mod models;
pub mod reorder;
pub mod routes;
pub mod session_status;
pub mod shopify;
pub mod state;

use axum::Router;
use tower::Layer;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use crate::middleware::{
    create_session_layer, make_request_span, reorder_rewrite_middleware, request_id_middleware,
};
use crate::session_status::session_status_middleware;
use crate::state::AppState;

/// Build the storefront application.
///
/// The reorder rewrite wraps the routed application as a whole, so a
/// rewritten URI is routed like any other request. Sentry layers are added by
/// the caller.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config());

    let routed = routes::routes()
        .layer(axum::middleware::from_fn(session_status_middleware))
        .layer(session_layer)
        .with_state(state);

    let gated = axum::middleware::from_fn(reorder_rewrite_middleware).layer(routed);

    Router::new()
        .fallback_service(gated)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(axum::middleware::from_fn(request_id_middleware))
}
