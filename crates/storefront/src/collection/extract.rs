//! Request extractor for the wishlist manager.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AccountCollectionStore, SessionCollectionStore, Wishlist};
use crate::db::WishlistRepository;
use crate::error::AppError;
use crate::session_status::SessionObserver;
use crate::state::AppState;

/// Builds a [`Wishlist`] for the visitor and hydrates it.
///
/// The manager starts `Loading`; the observer's resolved state is then
/// applied, which performs the first fetch.
impl FromRequestParts<AppState> for Wishlist {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let observer = SessionObserver::from_request_parts(parts, state).await?;

        let mut wishlist = Self::new(
            SessionCollectionStore::new(observer.session().clone()),
            AccountCollectionStore::new(WishlistRepository::new(state.pool().clone())),
        );
        observer.attach(&mut wishlist).await;

        Ok(wishlist)
    }
}
