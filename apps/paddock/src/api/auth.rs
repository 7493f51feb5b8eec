//! # Authentication Module
//!
//! Optional bearer-key authentication for the Paddock HTTP API.
//!
//! When `PADDOCK_API_KEY` is set, every endpoint except `/health` requires:
//!
//! ```text
//! Authorization: Bearer <your-api-key>
//! ```
//!
//! A raw key without the `Bearer ` prefix is accepted as well.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

// =============================================================================
// API KEY AUTHENTICATION
// =============================================================================

/// The configured key, `None` when unset or empty.
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("PADDOCK_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// Compare two keys in constant time.
///
/// Both sides are zero-padded to a common length so the comparison runs
/// over the same number of bytes whatever the input; the lengths are
/// checked separately afterwards.
pub fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();

    let len = provided.len().max(expected.len());
    let mut a = vec![0u8; len];
    let mut b = vec![0u8; len];
    a[..provided.len()].copy_from_slice(provided);
    b[..expected.len()].copy_from_slice(expected);

    let bytes_equal: bool = a.ct_eq(&b).into();
    bytes_equal && provided.len() == expected.len()
}

/// Reject requests lacking the configured key with 401.
pub async fn api_key_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let Some(expected) = get_api_key_from_env() else {
        return Ok(next.run(request).await);
    };

    // Load balancer probes stay open.
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).to_string());

    match provided {
        Some(key) if keys_match(&key, &expected) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(
                event = "auth_failure",
                reason = "invalid_api_key",
                path = %request.uri().path(),
                "Authentication failed: invalid API key"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                path = %request.uri().path(),
                "Missing Authorization header"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_match() {
        assert!(keys_match("secret-key", "secret-key"));
    }

    #[test]
    fn prefix_does_not_match() {
        assert!(!keys_match("secret", "secret-key"));
        assert!(!keys_match("secret-key-extra", "secret-key"));
        assert!(!keys_match("", "secret-key"));
    }

    #[test]
    fn same_length_different_bytes() {
        assert!(!keys_match("secret-kez", "secret-key"));
    }
}
