//! Redis cache backend
//!
//! Uses a `ConnectionManager`, which multiplexes one connection and
//! reconnects on failure, so a clone per command is cheap.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::info;

use super::{CacheBackend, CacheError};

pub struct RedisBackend {
    manager: ConnectionManager,
}

impl RedisBackend {
    /// Connect to `url` (e.g. `redis://custom-redis:6379`)
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Connection(e.to_string()))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        info!("✓ Connected to Redis");
        Ok(Self { manager })
    }
}

fn command_error(e: redis::RedisError) -> CacheError {
    if e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
        CacheError::Connection(e.to_string())
    } else {
        CacheError::Command(e.to_string())
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        conn.get(key).await.map_err(command_error)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
            .map_err(command_error)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(())
    }
}
