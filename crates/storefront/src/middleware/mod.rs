//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Request ID (accept or generate `x-request-id`)
//! 3. `TraceLayer` (request span with method, path, request id)
//! 4. Reorder rewrite gate (wraps the routed app, runs before routing)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Session status (detect status changes between requests)
//! 7. Rate limiting on `/api` and `/auth` (governor)

pub mod rate_limit;
pub mod reorder_rewrite;
pub mod request_id;
pub mod session;

pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use reorder_rewrite::{reorder_rewrite_middleware, rewrite_target};
pub use request_id::{make_request_span, request_id_middleware};
pub use session::{create_session_layer, session_store};
