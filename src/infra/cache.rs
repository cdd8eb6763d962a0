//! Redis cache implementation.
//!
//! A thin JSON-over-Redis wrapper. Every round trip is bounded by a timeout
//! so a slow or unreachable Redis only costs latency, never availability.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::config::{DEFAULT_CACHE_CONNECT_TIMEOUT_MS, DEFAULT_CACHE_OP_TIMEOUT_MS};

/// Cache failures. Never surfaced to API callers.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    op_timeout: Duration,
}

impl Cache {
    /// Connect to Redis, giving up after the connect timeout.
    pub async fn try_connect(redis_url: &str) -> CacheResult<Self> {
        let connect_timeout = Duration::from_millis(DEFAULT_CACHE_CONNECT_TIMEOUT_MS);
        let client = Client::open(redis_url)?;
        let connection = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Timeout(connect_timeout))??;

        let cache = Self {
            connection,
            op_timeout: Duration::from_millis(DEFAULT_CACHE_OP_TIMEOUT_MS),
        };
        cache.ping().await?;

        tracing::info!("Redis cache connected");
        Ok(cache)
    }

    /// Override the per-operation timeout.
    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    async fn bounded<T, F>(&self, op: F) -> CacheResult<T>
    where
        F: Future<Output = Result<T, RedisError>>,
    {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::Timeout(self.op_timeout)),
        }
    }

    /// Get a value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = self.bounded(conn.get(key)).await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Set a value in cache with a TTL.
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)?;

        self.bounded(conn.set_ex::<_, _, ()>(key, json, ttl.as_secs().max(1)))
            .await
    }

    /// Delete a value from cache.
    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        self.bounded(conn.del::<_, ()>(key)).await
    }

    /// Check Redis connectivity.
    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let _pong: String = self
            .bounded(redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }
}
