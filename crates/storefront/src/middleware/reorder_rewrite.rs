//! Pre-routing rewrite of reorder links.
//!
//! Reorder links point at the cart view (`/cart?reorder=<ref>`) so they stay
//! meaningful to the visitor. This middleware wraps the whole router and
//! routes such requests to the internal entry point `/cart/reorder` instead.
//! It never redirects: the visible URL is unchanged, and the original URI is
//! kept in the `OriginalUri` extension.

use axum::{
    extract::{OriginalUri, Request},
    http::{Uri, uri::PathAndQuery},
    middleware::Next,
    response::Response,
};

/// Query parameter carrying the reorder reference.
pub const REORDER_PARAM: &str = "reorder";

/// Path of the internal reorder entry point.
pub const REORDER_PATH: &str = "/cart/reorder";

/// Rewrite target for `uri`, or `None` if the request passes through.
///
/// Matches only the cart view path with a non-empty `reorder` parameter. The
/// query string is carried over verbatim.
#[must_use]
pub fn rewrite_target(uri: &Uri) -> Option<Uri> {
    if !matches!(uri.path(), "/cart" | "/cart/") {
        return None;
    }

    let query = uri.query()?;
    let has_reference = url::form_urlencoded::parse(query.as_bytes())
        .any(|(key, value)| key == REORDER_PARAM && !value.trim().is_empty());
    if !has_reference {
        return None;
    }

    let path_and_query = PathAndQuery::try_from(format!("{REORDER_PATH}?{query}")).ok()?;
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).ok()
}

/// Apply [`rewrite_target`] before the router sees the request.
pub async fn reorder_rewrite_middleware(mut request: Request, next: Next) -> Response {
    if let Some(target) = rewrite_target(request.uri()) {
        tracing::debug!(from = %request.uri(), to = %target, "Rewriting reorder link");
        let original = std::mem::replace(request.uri_mut(), target);
        request.extensions_mut().insert(OriginalUri(original));
    }
    next.run(request).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rewrite(uri: &str) -> Option<String> {
        rewrite_target(&uri.parse::<Uri>().unwrap()).map(|u| u.to_string())
    }

    #[test]
    fn test_rewrites_cart_with_reference() {
        assert_eq!(
            rewrite("/cart?reorder=abc123").as_deref(),
            Some("/cart/reorder?reorder=abc123")
        );
        assert_eq!(
            rewrite("/cart/?reorder=abc123").as_deref(),
            Some("/cart/reorder?reorder=abc123")
        );
    }

    #[test]
    fn test_preserves_other_params() {
        assert_eq!(
            rewrite("/cart?utm_source=email&reorder=abc").as_deref(),
            Some("/cart/reorder?utm_source=email&reorder=abc")
        );
    }

    #[test]
    fn test_keeps_absolute_form() {
        assert_eq!(
            rewrite("https://optica.example/cart?reorder=abc").as_deref(),
            Some("https://optica.example/cart/reorder?reorder=abc")
        );
    }

    #[test]
    fn test_passes_through_without_reference() {
        assert_eq!(rewrite("/cart"), None);
        assert_eq!(rewrite("/cart?reorder="), None);
        assert_eq!(rewrite("/cart?reorder=%20"), None);
        assert_eq!(rewrite("/cart?reordered=abc"), None);
    }

    #[test]
    fn test_passes_through_other_paths() {
        assert_eq!(rewrite("/cart/add?reorder=abc"), None);
        assert_eq!(rewrite("/wishlist?reorder=abc"), None);
        assert_eq!(rewrite("/carts?reorder=abc"), None);
        assert_eq!(rewrite("/cart/reorder?reorder=abc"), None);
    }
}
