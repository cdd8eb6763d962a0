//! Shared fixtures for integration tests.
//!
//! Everything runs against a private in-memory SQLite database, so tests
//! need neither Postgres nor Redis.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use uuid::Uuid;

use user_scaffold::domain::{NewUser, User, UserChanges, UserListFilter};
use user_scaffold::infra::{
    CacheError, Migrator, SeaTransactionManager, TxContext, UserCache, UserRepository, UserStore,
};
use user_scaffold::services::UserManager;
use user_scaffold::types::{Page, PageRequest};

// =============================================================================
// Database
// =============================================================================

/// Fresh migrated in-memory database.
///
/// A single pooled connection keeps the in-memory database alive and
/// serializes transactions.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = SeaDatabase::connect(opts)
        .await
        .expect("failed to open in-memory sqlite");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    db
}

// =============================================================================
// Cache
// =============================================================================

/// In-process user cache with call counters and a failure switch.
#[derive(Default)]
pub struct InMemoryUserCache {
    entries: Mutex<HashMap<i64, User>>,
    failing: AtomicBool,
    pub gets: AtomicUsize,
    pub hits: AtomicUsize,
    pub sets: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl InMemoryUserCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent call fail with a timeout.
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.lock().unwrap().contains_key(&id)
    }

    pub fn insert(&self, user: User) {
        self.entries.lock().unwrap().insert(user.id, user);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Timeout(Duration::from_millis(600)));
        }
        Ok(())
    }
}

#[async_trait]
impl UserCache for InMemoryUserCache {
    async fn get(&self, id: i64) -> Result<Option<User>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let hit = self.entries.lock().unwrap().get(&id).cloned();
        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(hit)
    }

    async fn set(&self, user: &User) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.insert(user.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), CacheError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.entries.lock().unwrap().remove(&id);
        Ok(())
    }
}

// =============================================================================
// Store
// =============================================================================

/// Delegates to a real store and counts every call.
pub struct CountingRepo {
    inner: UserStore,
    calls: AtomicUsize,
}

impl CountingRepo {
    pub fn new(db: DatabaseConnection) -> Arc<Self> {
        Arc::new(Self {
            inner: UserStore::new(db),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for CountingRepo {
    async fn find_by_id(&self, ctx: TxContext<'_>, id: i64) -> Result<User, DbErr> {
        self.hit();
        self.inner.find_by_id(ctx, id).await
    }

    async fn find_by_email(&self, ctx: TxContext<'_>, email: &str) -> Result<User, DbErr> {
        self.hit();
        self.inner.find_by_email(ctx, email).await
    }

    async fn find_by_external_id(
        &self,
        ctx: TxContext<'_>,
        external_id: Uuid,
    ) -> Result<User, DbErr> {
        self.hit();
        self.inner.find_by_external_id(ctx, external_id).await
    }

    async fn create(&self, ctx: TxContext<'_>, user: NewUser) -> Result<User, DbErr> {
        self.hit();
        self.inner.create(ctx, user).await
    }

    async fn update(
        &self,
        ctx: TxContext<'_>,
        id: i64,
        changes: UserChanges,
    ) -> Result<User, DbErr> {
        self.hit();
        self.inner.update(ctx, id, changes).await
    }

    async fn delete(&self, ctx: TxContext<'_>, id: i64) -> Result<(), DbErr> {
        self.hit();
        self.inner.delete(ctx, id).await
    }

    async fn list(
        &self,
        ctx: TxContext<'_>,
        filter: &UserListFilter,
        page: PageRequest,
    ) -> Result<Page<User>, DbErr> {
        self.hit();
        self.inner.list(ctx, filter, page).await
    }
}

// =============================================================================
// Service
// =============================================================================

pub struct Harness {
    pub db: DatabaseConnection,
    pub repo: Arc<CountingRepo>,
    pub cache: Arc<InMemoryUserCache>,
    pub service: UserManager<SeaTransactionManager>,
}

/// Service wired to a fresh database and an in-memory cache.
pub async fn harness() -> Harness {
    let db = setup_db().await;
    let repo = CountingRepo::new(db.clone());
    let cache = InMemoryUserCache::new();
    let tx = SeaTransactionManager::new(db.clone());

    let service = UserManager::new(
        Arc::new(tx),
        repo.clone(),
        Some(cache.clone() as Arc<dyn UserCache>),
    );

    Harness {
        db,
        repo,
        cache,
        service,
    }
}

pub fn new_user(email: &str) -> NewUser {
    NewUser::new(email, "Test User")
}
