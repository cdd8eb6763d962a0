//! User lookup cache keyed by numeric id.

use async_trait::async_trait;
use std::time::Duration;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::config::{CACHE_PREFIX_USER, USER_CACHE_TTL_SECONDS};
use crate::domain::User;
use crate::infra::cache::{Cache, CacheError};

/// Lifetime of every cached user entry
const USER_TTL: Duration = Duration::from_secs(USER_CACHE_TTL_SECONDS);

/// Cache key for a user id
pub fn user_key(id: i64) -> String {
    format!("{CACHE_PREFIX_USER}{id}")
}

/// Best-effort user cache. Callers treat every error as a miss.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    /// `Ok(None)` on a miss
    async fn get(&self, id: i64) -> Result<Option<User>, CacheError>;

    async fn set(&self, user: &User) -> Result<(), CacheError>;

    async fn delete(&self, id: i64) -> Result<(), CacheError>;
}

/// Redis-backed user cache
#[derive(Clone)]
pub struct RedisUserCache {
    cache: Cache,
}

impl RedisUserCache {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get(&self, id: i64) -> Result<Option<User>, CacheError> {
        self.cache.get(&user_key(id)).await
    }

    async fn set(&self, user: &User) -> Result<(), CacheError> {
        self.cache
            .set_with_ttl(&user_key(user.id), user, USER_TTL)
            .await
    }

    async fn delete(&self, id: i64) -> Result<(), CacheError> {
        self.cache.delete(&user_key(id)).await
    }
}
