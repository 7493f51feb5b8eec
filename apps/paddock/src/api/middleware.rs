//! # Middleware Module
//!
//! Global request rate limiting for the Paddock HTTP API.
//!
//! Configured through `PADDOCK_RATE_LIMIT` (requests per second, default
//! 100, `0` disables the limiter).

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Requests per second when nothing is configured.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Shared, unkeyed rate limiter.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a limiter allowing `requests_per_second`.
///
/// A zero rate falls back to the default.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second)
        .or(NonZeroU32::new(DEFAULT_RATE_LIMIT))
        .unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Value of `PADDOCK_RATE_LIMIT`, or the default when unset or malformed.
pub fn get_rate_limit_from_env() -> u32 {
    std::env::var("PADDOCK_RATE_LIMIT")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT)
}

/// Reject requests beyond the limiter's quota with 429.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    if limiter.check().is_err() {
        tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
        return Err((StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"));
    }
    Ok(next.run(request).await)
}

// =============================================================================
// TESTS
// =============================================================================
