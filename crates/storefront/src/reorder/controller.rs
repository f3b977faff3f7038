//! Reorder replay state machine.
//!
//! ```text
//! Idle ──no reference──────────────────────────────► Redirecting
//!  │                                                     ▲
//!  ├─reference, no cart─► AwaitingCartIdentity ──cart─┐  │
//!  │                                                  ▼  │
//!  └─reference, cart─────────────────────────────► Replaying ──complete
//! ```
//!
//! The controller owns no I/O. It tells the driver what to do next and is
//! one-shot: once `Replaying`, further advances never replay again.

use std::fmt::Display;

use optica_core::{CartIdentity, ReorderReference};

/// Where the replay currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderState {
    Idle,
    AwaitingCartIdentity,
    Replaying,
    Redirecting,
}

/// What the driver should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderAction {
    /// Create a cart for the visitor, then advance again.
    ProvisionCart,
    /// Copy the lines of `source` into `destination`, then `complete`.
    Replay {
        source: CartIdentity,
        destination: CartIdentity,
    },
    /// Nothing to do until something changes.
    Wait,
    /// Send the visitor to the cart view.
    Redirect,
}

/// Outcome of a replay, reported to [`ReorderController::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Lines were added to the destination cart.
    Replayed { lines: usize },
    /// The source cart had no lines.
    EmptySource,
    /// The same pair was replayed moments ago.
    Duplicate,
}

/// Drives one reorder request from reference to redirect.
#[derive(Debug)]
pub struct ReorderController {
    reference: Option<ReorderReference>,
    state: ReorderState,
}

impl ReorderController {
    /// Cart view the visitor ends up on. Never carries the reorder parameter.
    pub const REDIRECT_TARGET: &'static str = "/cart";

    #[must_use]
    pub const fn new(reference: Option<ReorderReference>) -> Self {
        Self {
            reference,
            state: ReorderState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ReorderState {
        self.state
    }

    #[must_use]
    pub const fn reference(&self) -> Option<&ReorderReference> {
        self.reference.as_ref()
    }

    /// Advance given the visitor's current cart, if any.
    pub fn advance(&mut self, cart: Option<&CartIdentity>) -> ReorderAction {
        match (self.state, self.reference.as_ref(), cart) {
            (ReorderState::Idle, None, _) | (ReorderState::Redirecting, _, _) => {
                self.state = ReorderState::Redirecting;
                ReorderAction::Redirect
            }
            (ReorderState::Idle, Some(_), None) => {
                self.state = ReorderState::AwaitingCartIdentity;
                ReorderAction::ProvisionCart
            }
            (ReorderState::Idle | ReorderState::AwaitingCartIdentity, Some(reference), Some(cart)) => {
                self.state = ReorderState::Replaying;
                ReorderAction::Replay {
                    source: reference.to_cart_identity(),
                    destination: cart.clone(),
                }
            }
            (ReorderState::AwaitingCartIdentity | ReorderState::Replaying, _, _) => {
                ReorderAction::Wait
            }
        }
    }

    /// Record the replay outcome and move on to the redirect.
    ///
    /// A failed replay is logged; the visitor is redirected either way.
    pub fn complete<E: Display>(&mut self, outcome: Result<ReplayOutcome, E>) {
        match outcome {
            Ok(outcome) => tracing::info!(?outcome, "Reorder replay finished"),
            Err(e) => tracing::warn!(error = %e, "Reorder replay failed"),
        }
        self.state = ReorderState::Redirecting;
    }

    /// Give up on the replay and redirect.
    pub fn abandon(&mut self, reason: &str) {
        tracing::warn!(reason, state = ?self.state, "Reorder abandoned");
        self.state = ReorderState::Redirecting;
    }

    #[must_use]
    pub const fn redirect_target(&self) -> &'static str {
        Self::REDIRECT_TARGET
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reference() -> Option<ReorderReference> {
        Some(ReorderReference::parse("old123").unwrap())
    }

    fn cart() -> CartIdentity {
        CartIdentity::parse("gid://shopify/Cart/new456").unwrap()
    }

    #[test]
    fn test_no_reference_redirects() {
        let mut controller = ReorderController::new(None);
        assert_eq!(controller.advance(Some(&cart())), ReorderAction::Redirect);
        assert_eq!(controller.state(), ReorderState::Redirecting);
    }

    #[test]
    fn test_reference_without_cart_provisions() {
        let mut controller = ReorderController::new(reference());
        assert_eq!(controller.advance(None), ReorderAction::ProvisionCart);
        assert_eq!(controller.state(), ReorderState::AwaitingCartIdentity);

        assert_eq!(controller.advance(None), ReorderAction::Wait);
        assert_eq!(controller.state(), ReorderState::AwaitingCartIdentity);

        let action = controller.advance(Some(&cart()));
        assert_eq!(
            action,
            ReorderAction::Replay {
                source: CartIdentity::parse("gid://shopify/Cart/old123").unwrap(),
                destination: cart(),
            }
        );
    }

    #[test]
    fn test_replay_is_one_shot() {
        let mut controller = ReorderController::new(reference());
        let cart = cart();

        let actions: Vec<_> = (0..3).map(|_| controller.advance(Some(&cart))).collect();

        let replays = actions
            .iter()
            .filter(|a| matches!(a, ReorderAction::Replay { .. }))
            .count();
        assert_eq!(replays, 1);
        assert_eq!(actions.get(1), Some(&ReorderAction::Wait));
        assert_eq!(controller.state(), ReorderState::Replaying);
    }

    #[test]
    fn test_complete_redirects_even_on_error() {
        let mut controller = ReorderController::new(reference());
        controller.advance(Some(&cart()));

        controller.complete::<String>(Err("Shopify unavailable".to_string()));

        assert_eq!(controller.state(), ReorderState::Redirecting);
        assert_eq!(controller.advance(None), ReorderAction::Redirect);
        assert_eq!(controller.redirect_target(), "/cart");
    }

    #[test]
    fn test_abandon_from_any_state() {
        let mut controller = ReorderController::new(reference());
        controller.advance(None);
        controller.abandon("cart could not be created");
        assert_eq!(controller.advance(Some(&cart())), ReorderAction::Redirect);
    }
}
