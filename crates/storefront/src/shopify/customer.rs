//! Shopify Customer Account API client.
//!
//! Only the pieces the storefront needs to know *who* is signed in: the
//! OAuth code exchange, the logout URL, and a customer identity query.
//!
//! # OAuth Flow
//!
//! 1. Redirect to `authorization_url()` with a random state and nonce
//! 2. Shopify redirects back with an authorization code
//! 3. `exchange_code()` turns the code into a [`CustomerAccessToken`]
//! 4. `get_customer_identity()` resolves the token to a [`CustomerIdentity`]

use std::sync::Arc;

use chrono::Utc;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use optica_core::CustomerId;

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::ShopifyError;

// =============================================================================
// Tokens
// =============================================================================

/// Customer access token obtained via OAuth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerAccessToken {
    /// The access token for API requests.
    pub access_token: String,
    /// The ID token (`OpenID` Connect), needed for the logout redirect.
    pub id_token: Option<String>,
    /// Token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

impl CustomerAccessToken {
    /// Check if the access token is expired (with 60s buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_in.is_some_and(|expires_in| {
            let now = Utc::now().timestamp();
            now >= self.obtained_at + expires_in - 60
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: Option<String>,
    expires_in: Option<i64>,
}

/// The signed-in customer as reported by Shopify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerIdentity {
    pub id: CustomerId,
    pub email: Option<String>,
}

// =============================================================================
// GraphQL Types
// =============================================================================

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Deserialize)]
struct GraphQLErrorResponse {
    message: String,
}

impl<T> GraphQLResponse<T> {
    fn into_result(self) -> Result<T, ShopifyError> {
        if let Some(errors) = self.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ShopifyError::OAuth(messages.join("; ")));
        }

        self.data
            .ok_or_else(|| ShopifyError::OAuth("No data in response".to_string()))
    }
}

#[derive(Deserialize)]
struct IdentityData {
    customer: IdentityNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityNode {
    id: String,
    email_address: Option<EmailAddress>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email_address: Option<String>,
}

impl IdentityNode {
    fn into_identity(self) -> Result<CustomerIdentity, ShopifyError> {
        let id = CustomerId::parse(&self.id)
            .map_err(|e| ShopifyError::OAuth(format!("Customer query returned {e}")))?;
        Ok(CustomerIdentity {
            id,
            email: self.email_address.and_then(|e| e.email_address),
        })
    }
}

const CUSTOMER_IDENTITY: &str = r"
query CustomerIdentity {
  customer {
    id
    emailAddress { emailAddress }
  }
}
";

// =============================================================================
// CustomerClient
// =============================================================================

/// Client for the Shopify Customer Account API.
#[derive(Clone)]
pub struct CustomerClient {
    inner: Arc<CustomerClientInner>,
}

struct CustomerClientInner {
    client: reqwest::Client,
    shop_id: String,
    api_version: String,
    client_id: String,
    client_secret: String,
}

impl CustomerClient {
    /// Create a new Customer Account API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        Self {
            inner: Arc::new(CustomerClientInner {
                client: reqwest::Client::new(),
                shop_id: config.customer_shop_id.clone(),
                api_version: config.api_version.clone(),
                client_id: config.customer_client_id.clone(),
                client_secret: config.customer_client_secret.expose_secret().to_string(),
            }),
        }
    }

    /// Authorization URL to redirect the customer to for login.
    ///
    /// `state` guards against CSRF and is checked on callback. `nonce` is
    /// bound into the ID token Shopify issues.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
        format!(
            "https://shopify.com/{}/auth/oauth/authorize?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20customer-account-api:full&\
            state={}&\
            nonce={}",
            self.inner.shop_id,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
            urlencoding::encode(nonce)
        )
    }

    /// Shopify logout URL that ends the customer's Shopify session too.
    #[must_use]
    pub fn logout_url(&self, id_token: &str, post_logout_redirect_uri: &str) -> String {
        format!(
            "https://shopify.com/{}/auth/oauth/logout?\
            id_token_hint={}&\
            post_logout_redirect_uri={}",
            self.inner.shop_id,
            urlencoding::encode(id_token),
            urlencoding::encode(post_logout_redirect_uri)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::OAuth` if Shopify rejects the code.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        let url = format!("https://shopify.com/{}/auth/oauth/token", self.inner.shop_id);

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ShopifyError::OAuth(format!("Token exchange failed: {text}")));
        }

        let token: TokenResponse = response.json().await?;

        Ok(CustomerAccessToken {
            access_token: token.access_token,
            id_token: token.id_token,
            expires_in: token.expires_in,
            obtained_at: Utc::now().timestamp(),
        })
    }

    /// Resolve an access token to the customer it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::OAuth` if the API rejects the token or returns
    /// a blank customer id.
    #[instrument(skip_all)]
    pub async fn get_customer_identity(
        &self,
        access_token: &str,
    ) -> Result<CustomerIdentity, ShopifyError> {
        let url = format!(
            "https://shopify.com/{}/account/customer/api/{}/graphql",
            self.inner.shop_id, self.inner.api_version
        );

        let response = self
            .inner
            .client
            .post(&url)
            .header("Authorization", access_token)
            .json(&GraphQLRequest {
                query: CUSTOMER_IDENTITY,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ShopifyError::OAuth(format!(
                "Customer API request failed ({status}): {text}"
            )));
        }

        let data: IdentityData = response.json::<GraphQLResponse<_>>().await?.into_result()?;
        data.customer.into_identity()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client() -> CustomerClient {
        CustomerClient::new(&ShopifyStorefrontConfig {
            store: "optica.myshopify.com".to_string(),
            api_version: "2025-07".to_string(),
            storefront_private_token: SecretString::from("shpat_test"),
            customer_shop_id: "12345".to_string(),
            customer_client_id: "client id".to_string(),
            customer_client_secret: SecretString::from("secret"),
        })
    }

    #[test]
    fn test_authorization_url_encodes_params() {
        let url = client().authorization_url("https://optica.example/auth/shopify/callback", "s t", "n");
        assert!(url.starts_with("https://shopify.com/12345/auth/oauth/authorize?"));
        assert!(url.contains("client_id=client%20id"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Foptica.example%2Fauth%2Fshopify%2Fcallback"));
        assert!(url.contains("state=s%20t"));
        assert!(url.contains("nonce=n"));
    }

    #[test]
    fn test_logout_url() {
        let url = client().logout_url("idtok", "https://optica.example/");
        assert_eq!(
            url,
            "https://shopify.com/12345/auth/oauth/logout?id_token_hint=idtok&post_logout_redirect_uri=https%3A%2F%2Foptica.example%2F"
        );
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now().timestamp();
        let fresh = CustomerAccessToken {
            access_token: "a".to_string(),
            id_token: None,
            expires_in: Some(3600),
            obtained_at: now,
        };
        assert!(!fresh.is_expired());

        let stale = CustomerAccessToken {
            obtained_at: now - 3600,
            ..fresh.clone()
        };
        assert!(stale.is_expired());

        let unbounded = CustomerAccessToken {
            expires_in: None,
            ..stale
        };
        assert!(!unbounded.is_expired());
    }

    #[test]
    fn test_identity_response() {
        let json = r#"{
            "data": { "customer": {
                "id": "gid://shopify/Customer/7",
                "emailAddress": { "emailAddress": "ada@example.com" }
            }}
        }"#;
        let response: GraphQLResponse<IdentityData> = serde_json::from_str(json).unwrap();
        let identity = response.into_result().unwrap().customer.into_identity().unwrap();
        assert_eq!(identity.id.as_str(), "gid://shopify/Customer/7");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_identity_errors() {
        let json = r#"{ "data": null, "errors": [{ "message": "Unauthorized" }] }"#;
        let response: GraphQLResponse<IdentityData> = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_result(), Err(ShopifyError::OAuth(m)) if m == "Unauthorized"));

        let blank = IdentityNode {
            id: "  ".to_string(),
            email_address: None,
        };
        assert!(blank.into_identity().is_err());
    }
}
