//! User service - Handles user-related business logic.
//!
//! Validates input, runs writes through the transaction manager and keeps the
//! id-keyed cache coherent after a commit. This is the only layer that turns
//! store failures into [`AppError`]s, and it does so exactly once per call.

use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{NewUser, User, UserChanges, UserListFilter};
use crate::errors::{AppError, AppResult};
use crate::infra::{TransactionManager, TxContext, UserCache, UserRepository};
use crate::types::{Page, PageRequest};
use crate::with_transaction;

const ID_MUST_BE_POSITIVE: &str = "id must be positive";
const EMAIL_AND_NAME_REQUIRED: &str = "email and name are required";
const NAME_REQUIRED: &str = "name is required";
const EMAIL_REQUIRED: &str = "email is required";
const USER_NOT_FOUND: &str = "user not found";
const EMAIL_EXISTS: &str = "email already exists";

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID, served from the cache when possible
    async fn get_user(&self, id: i64) -> AppResult<User>;

    /// Get user by email address
    async fn get_user_by_email(&self, email: &str) -> AppResult<User>;

    /// Get user by external identifier
    async fn get_user_by_external_id(&self, external_id: Uuid) -> AppResult<User>;

    async fn create_user(&self, input: NewUser) -> AppResult<User>;

    async fn update_user(&self, id: i64, changes: UserChanges) -> AppResult<User>;

    async fn delete_user(&self, id: i64) -> AppResult<()>;

    /// List users. Never cached.
    async fn list_users(&self, filter: UserListFilter) -> AppResult<Page<User>>;
}

/// How a store call failed, as far as callers are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreFailure {
    NoRows,
    UniqueViolation,
    Other,
}

impl StoreFailure {
    fn of(err: &DbErr) -> Self {
        if matches!(err, DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated) {
            return StoreFailure::NoRows;
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StoreFailure::UniqueViolation,
            _ => StoreFailure::Other,
        }
    }
}

/// Lookups and deletes: no rows is not-found, everything else internal.
fn lookup_error(err: DbErr) -> AppError {
    match StoreFailure::of(&err) {
        StoreFailure::NoRows => AppError::not_found(USER_NOT_FOUND),
        _ => AppError::internal(err),
    }
}

/// Inserts and updates: a uniqueness violation is a conflict.
fn write_error(err: DbErr) -> AppError {
    match StoreFailure::of(&err) {
        StoreFailure::NoRows => AppError::not_found(USER_NOT_FOUND),
        StoreFailure::UniqueViolation => AppError::conflict(EMAIL_EXISTS),
        StoreFailure::Other => AppError::internal(err),
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn ensure_positive_id(id: i64) -> AppResult<()> {
    if id <= 0 {
        return Err(AppError::invalid(ID_MUST_BE_POSITIVE));
    }
    Ok(())
}

/// Concrete implementation of UserService.
pub struct UserManager<M: TransactionManager> {
    tx: Arc<M>,
    repo: Arc<dyn UserRepository>,
    cache: Option<Arc<dyn UserCache>>,
}

impl<M: TransactionManager> UserManager<M> {
    /// Create new user service. Pass `None` to run without a cache.
    pub fn new(
        tx: Arc<M>,
        repo: Arc<dyn UserRepository>,
        cache: Option<Arc<dyn UserCache>>,
    ) -> Self {
        Self { tx, repo, cache }
    }

    async fn cached(&self, id: i64) -> Option<User> {
        let cache = self.cache.as_ref()?;
        match cache.get(id).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(
                    user_id = id,
                    error = %e,
                    "Cache read failed, falling back to store"
                );
                None
            }
        }
    }

    async fn remember(&self, user: &User) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(user).await {
                tracing::warn!(user_id = user.id, error = %e, "Cache write failed");
            }
        }
    }

    async fn forget(&self, id: i64) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.delete(id).await {
                tracing::warn!(user_id = id, error = %e, "Cache invalidation failed");
            }
        }
    }
}

#[async_trait]
impl<M: TransactionManager> UserService for UserManager<M> {
    async fn get_user(&self, id: i64) -> AppResult<User> {
        ensure_positive_id(id)?;

        if let Some(user) = self.cached(id).await {
            return Ok(user);
        }

        let user = self
            .repo
            .find_by_id(TxContext::none(), id)
            .await
            .map_err(lookup_error)?;

        self.remember(&user).await;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        if is_blank(email) {
            return Err(AppError::invalid(EMAIL_REQUIRED));
        }

        let user = self
            .repo
            .find_by_email(TxContext::none(), email)
            .await
            .map_err(lookup_error)?;

        self.remember(&user).await;
        Ok(user)
    }

    async fn get_user_by_external_id(&self, external_id: Uuid) -> AppResult<User> {
        let user = self
            .repo
            .find_by_external_id(TxContext::none(), external_id)
            .await
            .map_err(lookup_error)?;

        self.remember(&user).await;
        Ok(user)
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        if is_blank(&input.email) || is_blank(&input.name) {
            return Err(AppError::invalid(EMAIL_AND_NAME_REQUIRED));
        }

        let repo = Arc::clone(&self.repo);
        let user = with_transaction!(self.tx, |ctx| {
            repo.create(ctx, input).await.map_err(write_error)
        })?;

        tracing::info!(user_id = user.id, "User created");
        self.remember(&user).await;
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> AppResult<User> {
        ensure_positive_id(id)?;
        if is_blank(&changes.name) {
            return Err(AppError::invalid(NAME_REQUIRED));
        }
        if changes.email.as_deref().is_some_and(is_blank) {
            return Err(AppError::invalid(EMAIL_REQUIRED));
        }

        let repo = Arc::clone(&self.repo);
        let user = with_transaction!(self.tx, |ctx| {
            repo.update(ctx, id, changes).await.map_err(write_error)
        })?;

        tracing::info!(user_id = user.id, "User updated");
        self.remember(&user).await;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        ensure_positive_id(id)?;

        let repo = Arc::clone(&self.repo);
        with_transaction!(self.tx, |ctx| {
            repo.delete(ctx, id).await.map_err(lookup_error)
        })?;

        tracing::info!(user_id = id, "User deleted");
        self.forget(id).await;
        Ok(())
    }

    async fn list_users(&self, filter: UserListFilter) -> AppResult<Page<User>> {
        let request = PageRequest::new(filter.page, filter.page_size);
        self.repo
            .list(TxContext::none(), &filter, request)
            .await
            .map_err(AppError::internal)
    }
}
