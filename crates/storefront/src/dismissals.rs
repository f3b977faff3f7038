//! Session-scoped UI dismissal flags.
//!
//! A dismissal lasts until the visitor's authentication status changes, at
//! which point every flag in [`session_keys::DISMISSAL_FLAGS`] is cleared.

use tower_sessions::Session;

use crate::models::session_keys;

/// Mark the flag at `key` as dismissed.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn dismiss(session: &Session, key: &str) -> Result<(), tower_sessions::session::Error> {
    session.insert(key, true).await
}

/// Whether the flag at `key` has been dismissed.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn is_dismissed(
    session: &Session,
    key: &str,
) -> Result<bool, tower_sessions::session::Error> {
    Ok(session.get::<bool>(key).await?.unwrap_or(false))
}

/// Clear every dismissal flag.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn clear_all(session: &Session) -> Result<(), tower_sessions::session::Error> {
    for key in session_keys::DISMISSAL_FLAGS {
        session.remove_value(key).await?;
    }
    Ok(())
}
