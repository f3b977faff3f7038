//! Shopify clients for carts and customer accounts.
//!
//! `StorefrontClient` reads carts and replays their lines for reorder.
//! `CustomerClient` runs the Customer Account OAuth flow that identifies the
//! owner of a wishlist. Shopify owns both; nothing here is cached locally
//! apart from the reorder dedupe window.

mod customer;
mod storefront;
pub mod types;

pub use customer::{CustomerAccessToken, CustomerClient, CustomerIdentity};
pub use storefront::StorefrontClient;
pub use types::*;

use std::fmt;

use thiserror::Error;

/// Failure talking to Shopify.
#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The cart is unknown or expired.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Shopify throttled the call; seconds until a retry is worthwhile.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A cart mutation reported `userErrors` (sold out, invalid merchandise).
    #[error("User error: {0}")]
    UserError(String),

    /// The Customer Account OAuth flow or its API refused the request.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLError {
    pub message: String,
    /// Response path, e.g. `cartLinesAdd.lines.0`.
    pub path: Vec<String>,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.message.is_empty(), self.path.is_empty()) {
            (_, true) => f.write_str(&self.message),
            (true, false) => write!(f, "at {}", self.path.join(".")),
            (false, false) => write!(f, "{} (at {})", self.message, self.path.join(".")),
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .filter(|e| !e.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    if joined.is_empty() {
        "no details".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(message: &str, path: &[&str]) -> GraphQLError {
        GraphQLError {
            message: message.to_string(),
            path: path.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_cart_mutation_error_names_its_path() {
        let err = ShopifyError::GraphQL(vec![error(
            "Merchandise does not exist",
            &["cartLinesAdd", "lines", "0"],
        )]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Merchandise does not exist (at cartLinesAdd.lines.0)"
        );
    }

    #[test]
    fn test_errors_without_details() {
        let err = ShopifyError::GraphQL(vec![error("", &[])]);
        assert_eq!(err.to_string(), "GraphQL errors: no details");

        let err = ShopifyError::GraphQL(vec![error("", &["cart"]), error("Throttled", &[])]);
        assert_eq!(err.to_string(), "GraphQL errors: at cart; Throttled");
    }

    #[test]
    fn test_missing_cart_display() {
        let err = ShopifyError::NotFound("Cart not found: gid://shopify/Cart/c1".to_string());
        assert_eq!(err.to_string(), "Not found: Cart not found: gid://shopify/Cart/c1");
    }
}
