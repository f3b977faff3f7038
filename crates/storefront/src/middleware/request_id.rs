//! Request IDs for log and error correlation.
//!
//! An `x-request-id` from an upstream proxy is trusted as-is; otherwise a
//! UUID v4 is generated. The id is written back into the request headers so
//! the trace span picks it up, tagged on the Sentry scope, and echoed on the
//! response.

use axum::{
    body::Body,
    extract::{OriginalUri, Request},
    http::{HeaderValue, Request as HttpRequest},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Ensure every request carries a request id.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let existing = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .filter(|h| !h.is_empty())
        .cloned();

    let request_id = match existing {
        Some(value) => value,
        None => {
            // A hyphenated UUID is always a valid header value
            let generated = HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            request
                .headers_mut()
                .insert(REQUEST_ID_HEADER, generated.clone());
            generated
        }
    };

    if let Ok(id) = request_id.to_str() {
        sentry::configure_scope(|scope| {
            scope.set_tag("request_id", id);
        });
    }

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    response
}

/// Span for `TraceLayer`: method, the path the visitor asked for, and request id.
pub fn make_request_span(request: &HttpRequest<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    // Reorder links are rewritten before routing; log what was requested
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri(), |original| &original.0);

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %uri.path(),
        request_id,
    )
}
