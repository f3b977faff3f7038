//! Reorder: copy a historical cart's lines into the visitor's cart.
//!
//! A link such as `/cart?reorder=<ref>` reaches the handler through the
//! rewrite gate. The handler builds a [`ReorderController`] and hands it to
//! [`run_reorder`], which performs the I/O the controller asks for and always
//! ends on the cart view. Failures are logged and never shown.

mod controller;
mod shopify;

use std::future::Future;

use thiserror::Error;

use optica_core::{CartIdentity, TokenError};

use crate::shopify::ShopifyError;

pub use controller::{ReorderAction, ReorderController, ReorderState, ReplayOutcome};
pub use shopify::{SessionCartProvider, ShopifyCartReplayer};

/// Reorder failure.
#[derive(Debug, Error)]
pub enum ReorderError {
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("invalid cart identity: {0}")]
    InvalidCart(#[from] TokenError),
}

/// Source of the visitor's cart.
pub trait CartProvider: Send + Sync {
    /// The visitor's cart, if one exists yet.
    fn current(&self) -> impl Future<Output = Result<Option<CartIdentity>, ReorderError>> + Send;

    /// Create a cart for the visitor and remember it.
    fn provision(&self) -> impl Future<Output = Result<CartIdentity, ReorderError>> + Send;
}

/// Copies cart lines between carts.
pub trait CartReplayer: Send + Sync {
    fn replay(
        &self,
        source: &CartIdentity,
        destination: &CartIdentity,
    ) -> impl Future<Output = Result<ReplayOutcome, ReorderError>> + Send;
}

/// Run `controller` to completion and return where to redirect.
pub async fn run_reorder<C, R>(
    controller: &mut ReorderController,
    carts: &C,
    replayer: &R,
) -> &'static str
where
    C: CartProvider,
    R: CartReplayer,
{
    let mut cart = match carts.current().await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read cart for reorder");
            None
        }
    };

    loop {
        match controller.advance(cart.as_ref()) {
            ReorderAction::ProvisionCart => match carts.provision().await {
                Ok(provisioned) => cart = Some(provisioned),
                Err(e) => controller.abandon(&format!("cart could not be created: {e}")),
            },
            ReorderAction::Replay {
                source,
                destination,
            } => {
                let outcome = replayer.replay(&source, &destination).await;
                controller.complete(outcome);
            }
            // Provisioning is awaited inline, so waiting cannot make progress
            ReorderAction::Wait => controller.abandon("no cart identity available"),
            ReorderAction::Redirect => return controller.redirect_target(),
        }
    }
}
