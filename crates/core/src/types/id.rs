//! Opaque string tokens for type-safe references.
//!
//! Every identifier in the storefront is owned by someone else: product
//! references come from the catalog, customer and cart ids from Shopify.
//! Use the `define_token!` macro to create wrappers that keep them apart.

use thiserror::Error;

/// Error parsing an opaque token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The value was empty or whitespace only.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Macro to define a type-safe opaque token wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `parse()`, `as_str()`, `into_inner()`
/// - `Display` and `AsRef<str>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use optica_core::define_token;
/// define_token!(OrderRef);
/// define_token!(GiftCardRef);
///
/// let order = OrderRef::parse("A-100").unwrap();
/// assert_eq!(order.as_str(), "A-100");
///
/// // These are different types, so this won't compile:
/// // let _: GiftCardRef = order;
/// ```
#[macro_export]
macro_rules! define_token {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse a token, rejecting empty values. Surrounding whitespace is trimmed.
            ///
            /// # Errors
            ///
            /// Returns `TokenError::Empty` if the value is empty after trimming.
            pub fn parse(value: impl AsRef<str>) -> ::core::result::Result<Self, $crate::TokenError> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err($crate::TokenError::Empty(stringify!($name)));
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the token and return the owned string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let value = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(value))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_token!(ProductRefId);
define_token!(CustomerId);
define_token!(CartIdentity);
define_token!(ReorderReference);

/// Prefix of Shopify cart GIDs.
const CART_GID_PREFIX: &str = "gid://shopify/Cart/";

impl ReorderReference {
    /// The cart this reference names.
    ///
    /// Reorder links carry either a full cart GID or just its trailing token.
    #[must_use]
    pub fn to_cart_identity(&self) -> CartIdentity {
        if self.0.starts_with("gid://") {
            CartIdentity(self.0.clone())
        } else {
            CartIdentity(format!("{CART_GID_PREFIX}{}", self.0))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = ProductRefId::parse("  frame-042 ").unwrap();
        assert_eq!(id.as_str(), "frame-042");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(
            CustomerId::parse("   ").unwrap_err(),
            TokenError::Empty("CustomerId")
        );
    }

    #[test]
    fn test_serde_transparent() {
        let id = CartIdentity::parse("gid://shopify/Cart/abc").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"gid://shopify/Cart/abc\"");

        let back: CartIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_reorder_reference_bare_token() {
        let reference = ReorderReference::parse("c1-9f8e?key=abc").unwrap();
        assert_eq!(
            reference.to_cart_identity().as_str(),
            "gid://shopify/Cart/c1-9f8e?key=abc"
        );
    }

    #[test]
    fn test_reorder_reference_full_gid() {
        let reference = ReorderReference::parse("gid://shopify/Cart/c1-9f8e").unwrap();
        assert_eq!(
            reference.to_cart_identity().as_str(),
            "gid://shopify/Cart/c1-9f8e"
        );
    }
}
