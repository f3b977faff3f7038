//! Rate limiting with `governor` and `tower_governor`.
//!
//! - `auth_rate_limiter`: the OAuth entry points (~10/min per IP)
//! - `api_rate_limiter`: JSON endpoints, including reorder replay (~100/min per IP)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{extract::ConnectInfo, http::Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the client IP, most trusted first.
const CLIENT_IP_HEADERS: &[&str] = &[
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Keys requests by client IP.
///
/// Proxy headers win over the socket peer, which is a proxy in production.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        CLIENT_IP_HEADERS
            .iter()
            .find_map(|name| {
                headers
                    .get(*name)
                    .and_then(|v| v.to_str().ok())
                    // X-Forwarded-For lists the client first
                    .and_then(|s| s.split(',').next())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Build a limiter that replenishes one request every `replenish_seconds`.
///
/// # Panics
///
/// Panics if either argument is zero. Callers pass non-zero constants.
fn rate_limiter(replenish_seconds: u64, burst: u32) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(replenish_seconds)
        .burst_size(burst)
        .finish()
        .expect("rate limiter config with non-zero period and burst is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Rate limiter for the OAuth endpoints: burst of 5, one more every 6 seconds.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    rate_limiter(6, 5)
}

/// Rate limiter for JSON endpoints: burst of 50, one more every second.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    rate_limiter(1, 50)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    #[test]
    fn test_prefers_cloudflare_header() {
        let request = Request::get("/api/wishlist")
            .header("x-forwarded-for", "10.0.0.1")
            .header("cf-connecting-ip", "203.0.113.7")
            .body(())
            .unwrap();
        let ip = ClientIpKeyExtractor.extract(&request).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_first_forwarded_address() {
        let request = Request::get("/api/wishlist")
            .header("x-forwarded-for", "198.51.100.2, 10.0.0.1")
            .body(())
            .unwrap();
        let ip = ClientIpKeyExtractor.extract(&request).unwrap();
        assert_eq!(ip, "198.51.100.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut request = Request::get("/api/wishlist").body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("192.0.2.9:4000".parse::<SocketAddr>().unwrap()));
        let ip = ClientIpKeyExtractor.extract(&request).unwrap();
        assert_eq!(ip, "192.0.2.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_no_address_is_error() {
        let request = Request::get("/api/wishlist").body(()).unwrap();
        assert!(ClientIpKeyExtractor.extract(&request).is_err());
    }
}
