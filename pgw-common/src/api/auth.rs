//! Bearer header parsing and token hashing
//!
//! # Architecture
//!
//! - Clients send `Authorization: Bearer <token>`
//! - The scheme is matched case-insensitively
//! - The token is trimmed of outer whitespace; inner whitespace is kept
//! - Tokens are never used as cache keys in cleartext: the key is the
//!   namespaced SHA-256 of the token
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. The axum middleware that drives
//! them lives in the gateway.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Namespace prefix for token validation cache keys
pub const TOKEN_KEY_PREFIX: &str = "auth:token:";

/// Scheme prefix including the separating space
const BEARER_PREFIX: &str = "bearer ";

// ========================================
// Error Types
// ========================================

/// Reasons an Authorization header cannot yield a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// Header absent or blank
    #[error("Missing Authorization header")]
    Missing,

    /// Header present but not `Bearer <token>`
    #[error("Invalid Authorization header format")]
    BadFormat,
}

// ========================================
// Header Parsing
// ========================================

/// Extract the bearer token from an Authorization header value
///
/// # Examples
///
/// ```
/// use pgw_common::api::auth::{parse_bearer, HeaderError};
///
/// assert_eq!(parse_bearer(Some("Bearer   tok  ")), Ok("tok"));
/// assert_eq!(parse_bearer(Some("bEaReR a b")), Ok("a b"));
/// assert_eq!(parse_bearer(Some("Basic tok")), Err(HeaderError::BadFormat));
/// assert_eq!(parse_bearer(Some("   ")), Err(HeaderError::Missing));
/// ```
pub fn parse_bearer(header: Option<&str>) -> Result<&str, HeaderError> {
    let trimmed = match header.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(HeaderError::Missing),
    };

    // A bare "Bearer" (or "Bearer" followed only by whitespace, which trim
    // already removed) has no separator and fails here
    let scheme = trimmed.get(..BEARER_PREFIX.len()).ok_or(HeaderError::BadFormat)?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return Err(HeaderError::BadFormat);
    }

    let token = trimmed[BEARER_PREFIX.len()..].trim();
    if token.is_empty() {
        return Err(HeaderError::BadFormat);
    }

    Ok(token)
}

// ========================================
// Token Hashing
// ========================================

/// SHA-256 of the token as 64 lowercase hex characters
///
/// # Examples
///
/// ```
/// use pgw_common::api::auth::hash_token;
///
/// let hash = hash_token("secret-token");
/// assert_eq!(hash.len(), 64);
/// assert!(!hash.contains("secret-token"));
/// ```
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Namespaced cache key for a token's validation result
pub fn token_cache_key(token: &str) -> String {
    format!("{}{}", TOKEN_KEY_PREFIX, hash_token(token))
}
