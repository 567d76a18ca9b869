//! Key-value backends for the token cache
//!
//! The gateway only needs string get/set-with-expiry and a liveness probe, so
//! the backend trait stays that small. Redis is the production backend; the
//! in-process map serves single-instance deployments (`memory://`) and tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod memory;
pub mod redis;
pub mod token_cache;

pub use memory::MemoryBackend;
pub use self::redis::RedisBackend;
pub use token_cache::{TokenCache, TokenCacheError};

/// URL scheme selecting the in-process backend
pub const MEMORY_URL_SCHEME: &str = "memory://";

/// Errors raised by a cache backend
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Backend unreachable or connection lost
    #[error("Cache connection failed: {0}")]
    Connection(String),

    /// Backend answered with an error
    #[error("Cache command failed: {0}")]
    Command(String),
}

#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// `Ok(None)` when the key is absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, expiring after `ttl`
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Cheap liveness check
    async fn ping(&self) -> Result<(), CacheError>;
}

/// Open the backend named by `url`
///
/// `memory://` selects [`MemoryBackend`]; anything else is handed to Redis.
pub async fn connect(url: &str) -> Result<Arc<dyn CacheBackend>, CacheError> {
    if url.starts_with(MEMORY_URL_SCHEME) {
        tracing::info!("Using in-process token cache");
        return Ok(Arc::new(MemoryBackend::new()));
    }

    let backend = RedisBackend::connect(url).await?;
    Ok(Arc::new(backend))
}
