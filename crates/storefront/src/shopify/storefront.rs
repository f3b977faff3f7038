//! Shopify Storefront API client implementation.
//!
//! Posts raw GraphQL documents with `reqwest` and decodes the responses into
//! the cart types in [`super::types`]. Carts are mutable state, so nothing
//! here is cached.

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::instrument;

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{Cart, CartLineInput, CartLineUpdateInput, CartUserError};
use crate::shopify::{GraphQLError, ShopifyError};

// =============================================================================
// GraphQL Documents
// =============================================================================

const CART_FRAGMENT: &str = r"
fragment CartFields on Cart {
  id
  checkoutUrl
  totalQuantity
  cost {
    subtotalAmount { amount currencyCode }
    totalAmount { amount currencyCode }
  }
  lines(first: 100) {
    nodes {
      id
      quantity
      attributes { key value }
      cost {
        amountPerQuantity { amount currencyCode }
        totalAmount { amount currencyCode }
      }
      merchandise {
        ... on ProductVariant {
          id
          title
          image { url altText }
          product { handle title }
        }
      }
      sellingPlanAllocation { sellingPlan { id } }
    }
  }
}
";

const GET_CART: &str = r"
query GetCart($cartId: ID!) {
  cart(id: $cartId) { ...CartFields }
}
";

const CREATE_CART: &str = r"
mutation CreateCart($input: CartInput!) {
  cartCreate(input: $input) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
";

const ADD_TO_CART: &str = r"
mutation AddToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
";

const UPDATE_CART_LINES: &str = r"
mutation UpdateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
";

const REMOVE_FROM_CART: &str = r"
mutation RemoveFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...CartFields }
    userErrors { code field message }
  }
}
";

/// Append the cart fragment to an operation.
fn with_cart_fields(operation: &str) -> String {
    format!("{operation}{CART_FRAGMENT}")
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<WireError>>,
}

#[derive(Deserialize)]
struct WireError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

impl From<WireError> for GraphQLError {
    fn from(e: WireError) -> Self {
        let path = e
            .path
            .into_iter()
            .map(|segment| match segment {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        Self {
            message: e.message,
            path,
        }
    }
}

#[derive(Deserialize)]
struct GetCartData {
    cart: Option<Cart>,
}

/// Payload shared by every cart mutation.
#[derive(Deserialize)]
struct CartPayload {
    cart: Option<Cart>,
    #[serde(rename = "userErrors", default)]
    user_errors: Vec<CartUserError>,
}

fn missing_data(message: &str) -> ShopifyError {
    ShopifyError::GraphQL(vec![GraphQLError {
        message: message.to_string(),
        path: vec![],
    }])
}

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API cart operations.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let endpoint = format!(
            "https://{}/api/{}/graphql.json",
            config.store, config.api_version
        );

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint,
                access_token: config.storefront_private_token.expose_secret().to_string(),
            }),
        }
    }

    /// Execute a GraphQL document.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            .header(
                "Shopify-Storefront-Private-Token",
                &self.inner.access_token,
            )
            .json(&GraphQLRequest { query, variables })
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let body = response.text().await?;
        let snippet = || body.chars().take(500).collect::<String>();

        if !status.is_success() {
            tracing::error!(status = %status, body = %snippet(), "Shopify API returned non-success status");
            return Err(missing_data(&format!(
                "HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let response: GraphQLResponse<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %snippet(), "Failed to parse Shopify GraphQL response");
            ShopifyError::Parse(e)
        })?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(GraphQLError::from).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(body = %snippet(), "Shopify GraphQL response has no data and no errors");
            missing_data("No data in response")
        })
    }

    /// Run a cart mutation and unwrap its payload under `field`.
    async fn mutate_cart(
        &self,
        operation: &str,
        field: &str,
        variables: serde_json::Value,
    ) -> Result<Cart, ShopifyError> {
        let mut data: HashMap<String, Option<CartPayload>> = self
            .execute(&with_cart_fields(operation), variables)
            .await?;

        let payload = data
            .remove(field)
            .flatten()
            .ok_or_else(|| missing_data(&format!("{field} returned no payload")))?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(
                payload
                    .user_errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            ));
        }

        payload
            .cart
            .ok_or_else(|| missing_data(&format!("{field} returned no cart")))
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Create a new cart, optionally with initial lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self, lines))]
    pub async fn create_cart(
        &self,
        lines: Option<Vec<CartLineInput>>,
    ) -> Result<Cart, ShopifyError> {
        let input = lines.map_or_else(|| json!({}), |lines| json!({ "lines": lines }));
        self.mutate_cart(CREATE_CART, "cartCreate", json!({ "input": input }))
            .await
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the cart does not exist (or expired),
    /// or an error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &str) -> Result<Cart, ShopifyError> {
        let data: GetCartData = self
            .execute(&with_cart_fields(GET_CART), json!({ "cartId": cart_id }))
            .await?;

        data.cart
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    pub async fn add_to_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate_cart(
            ADD_TO_CART,
            "cartLinesAdd",
            json!({ "cartId": cart_id, "lines": lines }),
        )
        .await
    }

    /// Update cart line quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_cart(
        &self,
        cart_id: &str,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate_cart(
            UPDATE_CART_LINES,
            "cartLinesUpdate",
            json!({ "cartId": cart_id, "lines": lines }),
        )
        .await
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &str,
        line_ids: Vec<String>,
    ) -> Result<Cart, ShopifyError> {
        self.mutate_cart(
            REMOVE_FROM_CART,
            "cartLinesRemove",
            json!({ "cartId": cart_id, "lineIds": line_ids }),
        )
        .await
    }
}
