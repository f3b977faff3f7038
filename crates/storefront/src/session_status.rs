//! Visitor authentication status and its transitions.
//!
//! [`SessionObserver`] derives the visitor's [`SessionState`] from the
//! session record and dispatches every change to a [`SessionListener`]. The
//! wishlist manager is the listener that matters: a transition makes it
//! switch adapters and re-fetch.
//!
//! Status can also change without any handler asking for it (an access token
//! expires between requests). [`session_status_middleware`] catches those by
//! comparing against the last-observed label kept in the session.

use std::future::Future;

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

use optica_core::SessionState;

use crate::dismissals;
use crate::error::AppError;
use crate::models::{CurrentCustomer, session_keys};

/// A change of session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTransition {
    pub from: SessionState,
    pub to: SessionState,
}

impl SessionTransition {
    /// Guest (or unresolved) visitor became a customer.
    #[must_use]
    pub const fn is_login(&self) -> bool {
        !self.from.is_authenticated() && self.to.is_authenticated()
    }

    /// Customer became a guest.
    #[must_use]
    pub const fn is_logout(&self) -> bool {
        self.from.is_authenticated() && matches!(self.to, SessionState::Unauthenticated)
    }
}

/// Receives session state changes.
pub trait SessionListener: Send {
    fn on_transition(&mut self, transition: &SessionTransition) -> impl Future<Output = ()> + Send;
}

/// Session state observer bound to one visitor's session.
#[derive(Clone)]
pub struct SessionObserver {
    session: Session,
    state: SessionState,
}

impl SessionObserver {
    /// Derive the current state from the stored customer.
    ///
    /// A customer whose access token has expired is removed from the session
    /// and the visitor resolves as unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn resolve(session: Session) -> Result<Self, tower_sessions::session::Error> {
        let customer: Option<CurrentCustomer> =
            session.get(session_keys::CURRENT_CUSTOMER).await?;

        let state = match customer {
            Some(customer) => {
                let state = customer.session_state();
                if !state.is_authenticated() {
                    tracing::info!(customer_id = %customer.id, "Customer access token expired");
                    session
                        .remove_value(session_keys::CURRENT_CUSTOMER)
                        .await?;
                }
                state
            }
            None => SessionState::Unauthenticated,
        };

        Ok(Self { session, state })
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Replay the initial `Loading -> state` hydration to a freshly built listener.
    ///
    /// Hydration is not an authentication change, so dismissal flags are untouched.
    pub async fn attach<L: SessionListener>(&self, listener: &mut L) {
        listener
            .on_transition(&SessionTransition {
                from: SessionState::Loading,
                to: self.state.clone(),
            })
            .await;
    }

    /// Move to `next`, notifying `listener` if that is a change.
    ///
    /// Every change clears the dismissal flags and records the new label.
    /// Returns `None` when `next` equals the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written. The listener is not
    /// notified in that case.
    pub async fn transition<L: SessionListener>(
        &mut self,
        next: SessionState,
        listener: &mut L,
    ) -> Result<Option<SessionTransition>, tower_sessions::session::Error> {
        if next == self.state {
            return Ok(None);
        }

        let transition = SessionTransition {
            from: std::mem::replace(&mut self.state, next),
            to: self.state.clone(),
        };

        let (from, to) = (transition.from.label(), transition.to.label());
        if transition.is_login() {
            tracing::info!(from, to, "Session authenticated");
        } else if transition.is_logout() {
            tracing::info!(from, to, "Session signed out");
        } else {
            tracing::info!(from, to, "Session state changed");
        }

        dismissals::clear_all(&self.session).await?;
        record_label(&self.session, &self.state).await?;

        listener.on_transition(&transition).await;
        Ok(Some(transition))
    }
}

impl<S> FromRequestParts<S> for SessionObserver
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        Ok(Self::resolve(session).await?)
    }
}

async fn record_label(
    session: &Session,
    state: &SessionState,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::LAST_SESSION_STATE, state.label())
        .await
}

/// Reconcile the session's last-observed state with the current one.
///
/// Runs on every request. Failures are logged and the request proceeds.
pub async fn session_status_middleware(session: Session, request: Request, next: Next) -> Response {
    if let Err(e) = reconcile(&session).await {
        tracing::warn!(error = %e, "Failed to reconcile session status");
    }
    next.run(request).await
}

async fn reconcile(session: &Session) -> Result<(), tower_sessions::session::Error> {
    let observer = SessionObserver::resolve(session.clone()).await?;
    let current = observer.state().label();
    let last: Option<String> = session.get(session_keys::LAST_SESSION_STATE).await?;

    match last.as_deref() {
        Some(last) if last == current => {}
        Some(last) => {
            tracing::info!(from = last, to = current, "Session state changed between requests");
            dismissals::clear_all(session).await?;
            record_label(session, observer.state()).await?;
        }
        // Guests stay unlabelled until something else starts their session
        None if !observer.state().is_authenticated() => {}
        None => record_label(session, observer.state()).await?,
    }

    Ok(())
}
