//! Visitor session state.

use serde::{Deserialize, Serialize};

use super::id::CustomerId;

/// Authentication status of the current visitor.
///
/// Decides which persistence adapter is authoritative: none while loading,
/// the session store for guests, the account store for customers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "customer_id", rename_all = "snake_case")]
pub enum SessionState {
    /// Not resolved yet.
    #[default]
    Loading,
    /// Guest visitor.
    Unauthenticated,
    /// Logged-in customer.
    Authenticated(CustomerId),
}

impl SessionState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub const fn customer_id(&self) -> Option<&CustomerId> {
        match self {
            Self::Authenticated(id) => Some(id),
            _ => None,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated(_) => "authenticated",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_loading() {
        assert_eq!(SessionState::default(), SessionState::Loading);
    }

    #[test]
    fn test_customer_id() {
        let id = CustomerId::parse("gid://shopify/Customer/7").unwrap();
        let state = SessionState::Authenticated(id.clone());
        assert!(state.is_authenticated());
        assert_eq!(state.customer_id(), Some(&id));
        assert_eq!(SessionState::Unauthenticated.customer_id(), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let state = SessionState::Authenticated(CustomerId::parse("c-1").unwrap());
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"status":"authenticated","customer_id":"c-1"}"#);
        assert_eq!(serde_json::from_str::<SessionState>(&json).unwrap(), state);

        let guest = serde_json::to_string(&SessionState::Unauthenticated).unwrap();
        assert_eq!(guest, r#"{"status":"unauthenticated"}"#);
    }
}
