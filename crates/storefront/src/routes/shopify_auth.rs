//! Shopify Customer Account OAuth route handlers.
//!
//! - Login: redirect to Shopify's authorization page
//! - Callback: exchange the code, store the customer, run the login transition
//! - Logout: forget the customer, run the logout transition
//!
//! The transitions are what switch the wishlist between the session copy and
//! the account copy.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use optica_core::SessionState;

use crate::collection::Wishlist;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentCustomer, session_keys};
use crate::session_status::SessionObserver;
use crate::state::AppState;

/// Query parameters from Shopify OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Generate a random alphanumeric string.
fn generate_random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Send the visitor home with a login error code.
fn login_failed(reason: &str) -> Response {
    Redirect::to(&format!("/?login_error={reason}")).into_response()
}

fn callback_uri(state: &AppState) -> String {
    format!("{}/auth/shopify/callback", state.config().base_url)
}

/// Initiate Shopify Customer Account OAuth login.
///
/// # Route
///
/// `GET /auth/shopify/login`
#[instrument(skip_all)]
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_random_string(32);
    let nonce = generate_random_string(32);

    for (key, value) in [
        (session_keys::SHOPIFY_OAUTH_STATE, &oauth_state),
        (session_keys::SHOPIFY_OAUTH_NONCE, &nonce),
    ] {
        if let Err(e) = session.insert(key, value).await {
            tracing::error!(error = %e, key, "Failed to store OAuth parameter in session");
            return login_failed("session");
        }
    }

    let auth_url = state
        .customer()
        .authorization_url(&callback_uri(&state), &oauth_state, &nonce);

    Redirect::to(&auth_url).into_response()
}

/// Handle Shopify OAuth callback.
///
/// On success the customer is stored in the session and the visitor moves
/// to `Authenticated`; the wishlist then re-fetches the account copy. The
/// guest copy is left in the session untouched.
///
/// # Route
///
/// `GET /auth/shopify/callback`
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    mut observer: SessionObserver,
    mut wishlist: Wishlist,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let session = observer.session().clone();

    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!(error, description, "Shopify OAuth error");
        return login_failed("shopify_denied");
    }

    let Some(code) = query.code else {
        tracing::warn!("Shopify OAuth callback missing code");
        return login_failed("missing_code");
    };

    let Some(returned_state) = query.state else {
        tracing::warn!("Shopify OAuth callback missing state");
        return login_failed("missing_state");
    };

    let stored_state: Option<String> = session
        .get(session_keys::SHOPIFY_OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("Shopify OAuth state mismatch");
        return login_failed("invalid_state");
    }

    // One-time use
    for key in [session_keys::SHOPIFY_OAUTH_STATE, session_keys::SHOPIFY_OAUTH_NONCE] {
        if let Err(e) = session.remove_value(key).await {
            tracing::warn!(error = %e, key, "Failed to clear OAuth parameter");
        }
    }

    let token = match state.customer().exchange_code(&code, &callback_uri(&state)).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to exchange Shopify OAuth code");
            return login_failed("token_exchange");
        }
    };

    let identity = match state.customer().get_customer_identity(&token.access_token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch customer identity");
            return login_failed("customer");
        }
    };

    let customer = CurrentCustomer {
        id: identity.id,
        email: identity.email,
        token,
    };

    // New identity, new session id
    if let Err(e) = session.cycle_id().await {
        tracing::error!(error = %e, "Failed to cycle session id");
        return login_failed("session");
    }
    if let Err(e) = session.insert(session_keys::CURRENT_CUSTOMER, &customer).await {
        tracing::error!(error = %e, "Failed to store customer in session");
        return login_failed("session");
    }

    set_sentry_user(&customer.id, customer.email.as_deref());

    if let Err(e) = observer
        .transition(SessionState::Authenticated(customer.id.clone()), &mut wishlist)
        .await
    {
        tracing::warn!(error = %e, "Failed to record login transition");
    }

    tracing::info!(customer_id = %customer.id, items = wishlist.items().len(), "Customer logged in");

    Redirect::to("/").into_response()
}

/// Logout from Shopify Customer Account.
///
/// Forgets the customer and moves the visitor to `Unauthenticated`, which
/// brings back the guest wishlist kept in the session. Redirects through
/// Shopify's logout when an ID token is available.
///
/// # Route
///
/// `POST /auth/shopify/logout`
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    mut observer: SessionObserver,
    mut wishlist: Wishlist,
) -> Response {
    let session = observer.session().clone();

    let customer: Option<CurrentCustomer> = match session
        .remove(session_keys::CURRENT_CUSTOMER)
        .await
    {
        Ok(customer) => customer,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to clear customer from session");
            None
        }
    };

    if let Err(e) = observer
        .transition(SessionState::Unauthenticated, &mut wishlist)
        .await
    {
        tracing::warn!(error = %e, "Failed to record logout transition");
    }
    clear_sentry_user();

    if let Some(id_token) = customer.and_then(|c| c.token.id_token) {
        let post_logout_uri = format!("{}/", state.config().base_url);
        let logout_url = state.customer().logout_url(&id_token, &post_logout_uri);
        return Redirect::to(&logout_url).into_response();
    }

    Redirect::to("/").into_response()
}
