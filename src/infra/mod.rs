//! Infrastructure layer - External systems integration
//!
//! - Database connection and migrations
//! - User store
//! - Redis cache
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;
pub mod user_cache;

pub use cache::{Cache, CacheError};
pub use db::{Database, Migrator};
pub use repositories::{Executor, UserRepository, UserStore};
pub use unit_of_work::{
    SeaTransactionManager, TransactionManager, TxContext, TxDeadlineExceeded, TxFuture,
};
pub use user_cache::{user_key, RedisUserCache, UserCache};

#[cfg(any(test, feature = "test-utils"))]
pub use user_cache::MockUserCache;
