//! Token validation cache
//!
//! Maps a bearer token to the identity it validated as, keyed by
//! `auth:token:<sha256-hex>` so plaintext tokens never reach the backend.

use pgw_common::api::{token_cache_key, Identity};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::{CacheBackend, CacheError};

#[derive(Debug, Clone, Error)]
pub enum TokenCacheError {
    #[error("Invalid cache input: {0}")]
    InvalidInput(String),

    /// Stored value is not a complete identity
    #[error("Corrupt cache entry: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Backend(#[from] CacheError),
}

pub struct TokenCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl TokenCache {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// Cached identity for `token`, if any
    pub async fn get(&self, token: &str) -> Result<Option<Identity>, TokenCacheError> {
        let key = cache_key(token)?;

        let Some(raw) = self.backend.get(&key).await? else {
            return Ok(None);
        };

        let identity: Identity =
            serde_json::from_str(&raw).map_err(|e| TokenCacheError::Corrupt(e.to_string()))?;
        if !identity.is_complete() {
            return Err(TokenCacheError::Corrupt("identity has blank claims".to_string()));
        }

        debug!("Token cache hit");
        Ok(Some(identity))
    }

    /// Remember `identity` for `token` until the TTL elapses
    pub async fn set(&self, token: &str, identity: &Identity) -> Result<(), TokenCacheError> {
        let key = cache_key(token)?;
        // Entry lifetimes are whole seconds
        if self.ttl.as_secs() == 0 {
            return Err(TokenCacheError::InvalidInput(format!(
                "ttl must be at least 1s, got {:?}",
                self.ttl
            )));
        }
        if !identity.is_complete() {
            return Err(TokenCacheError::InvalidInput(
                "identity must have userId and email".to_string(),
            ));
        }

        let value = serde_json::to_string(identity)
            .map_err(|e| TokenCacheError::InvalidInput(e.to_string()))?;
        self.backend.set_ex(&key, &value, self.ttl).await?;
        Ok(())
    }

    /// Liveness of the underlying backend
    pub async fn ping(&self) -> Result<(), CacheError> {
        self.backend.ping().await
    }
}

fn cache_key(token: &str) -> Result<String, TokenCacheError> {
    if token.trim().is_empty() {
        return Err(TokenCacheError::InvalidInput(
            "token must not be empty".to_string(),
        ));
    }
    Ok(token_cache_key(token))
}
