//! User repository - persistence for the `users` table.
//!
//! Failures are returned as native `DbErr` values:
//! - a missing row is `DbErr::RecordNotFound`
//! - a uniqueness conflict is the driver error that `DbErr::sql_err()`
//!   reports as `SqlErr::UniqueConstraintViolation`
//! - anything else is passed through as-is
//!
//! Mapping onto application errors is left to the service layer.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::fmt::Display;
use uuid::Uuid;

use super::entities::{user, UserActiveModel, UserEntity};
use super::executor::Executor;
use crate::domain::{NewUser, User, UserChanges, UserListFilter};
use crate::infra::unit_of_work::TxContext;
use crate::types::{Page, PageRequest};

/// User repository trait for dependency injection.
///
/// Every method takes the caller's [`TxContext`] and runs inside its
/// transaction when there is one.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, ctx: TxContext<'_>, id: i64) -> Result<User, DbErr>;

    /// Find user by email address
    async fn find_by_email(&self, ctx: TxContext<'_>, email: &str) -> Result<User, DbErr>;

    /// Find user by external identifier
    async fn find_by_external_id(
        &self,
        ctx: TxContext<'_>,
        external_id: Uuid,
    ) -> Result<User, DbErr>;

    /// Insert a new user; the store assigns `id` and `external_id`
    async fn create(&self, ctx: TxContext<'_>, user: NewUser) -> Result<User, DbErr>;

    /// Apply changes to an existing user
    async fn update(&self, ctx: TxContext<'_>, id: i64, changes: UserChanges)
        -> Result<User, DbErr>;

    /// Remove a user
    async fn delete(&self, ctx: TxContext<'_>, id: i64) -> Result<(), DbErr>;

    /// List users matching `filter`, ordered by id
    async fn list(
        &self,
        ctx: TxContext<'_>,
        filter: &UserListFilter,
        page: PageRequest,
    ) -> Result<Page<User>, DbErr>;
}

/// SeaORM implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn executor<'a>(&'a self, ctx: TxContext<'a>) -> Executor<'a> {
        Executor::resolve(&self.db, ctx)
    }
}

fn no_rows(lookup: impl Display) -> DbErr {
    DbErr::RecordNotFound(format!("user with {}", lookup))
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, ctx: TxContext<'_>, id: i64) -> Result<User, DbErr> {
        let db = self.executor(ctx);
        UserEntity::find_by_id(id)
            .one(&db)
            .await?
            .map(User::from)
            .ok_or_else(|| no_rows(format!("id {}", id)))
    }

    async fn find_by_email(&self, ctx: TxContext<'_>, email: &str) -> Result<User, DbErr> {
        let db = self.executor(ctx);
        UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&db)
            .await?
            .map(User::from)
            .ok_or_else(|| no_rows("given email"))
    }

    async fn find_by_external_id(
        &self,
        ctx: TxContext<'_>,
        external_id: Uuid,
    ) -> Result<User, DbErr> {
        let db = self.executor(ctx);
        UserEntity::find()
            .filter(user::Column::ExternalId.eq(external_id))
            .one(&db)
            .await?
            .map(User::from)
            .ok_or_else(|| no_rows(format!("external id {}", external_id)))
    }

    async fn create(&self, ctx: TxContext<'_>, user: NewUser) -> Result<User, DbErr> {
        let db = self.executor(ctx);
        let now = Utc::now();
        let active_model = UserActiveModel {
            id: NotSet,
            external_id: Set(Some(Uuid::new_v4())),
            email: Set(user.email),
            name: Set(user.name),
            used_name: Set(user.used_name),
            company: Set(user.company),
            birth: Set(user.birth),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&db).await?;
        Ok(User::from(model))
    }

    async fn update(
        &self,
        ctx: TxContext<'_>,
        id: i64,
        changes: UserChanges,
    ) -> Result<User, DbErr> {
        let db = self.executor(ctx);
        let existing = UserEntity::find_by_id(id)
            .one(&db)
            .await?
            .ok_or_else(|| no_rows(format!("id {}", id)))?;

        let mut active: UserActiveModel = existing.into();
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        active.name = Set(changes.name);
        active.used_name = Set(changes.used_name);
        active.company = Set(changes.company);
        active.birth = Set(changes.birth);
        active.updated_at = Set(Utc::now());

        let model = active.update(&db).await?;
        Ok(User::from(model))
    }

    async fn delete(&self, ctx: TxContext<'_>, id: i64) -> Result<(), DbErr> {
        let db = self.executor(ctx);
        let result = UserEntity::delete_by_id(id).exec(&db).await?;

        if result.rows_affected == 0 {
            return Err(no_rows(format!("id {}", id)));
        }

        Ok(())
    }

    async fn list(
        &self,
        ctx: TxContext<'_>,
        filter: &UserListFilter,
        page: PageRequest,
    ) -> Result<Page<User>, DbErr> {
        let db = self.executor(ctx);

        let mut query = UserEntity::find();
        if let Some(email) = filter.email.as_deref().filter(|e| !e.is_empty()) {
            query = query.filter(user::Column::Email.eq(email));
        }
        if let Some(name) = filter.name_like.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(user::Column::Name.contains(name));
        }

        let total = query.clone().count(&db).await?;
        let models = query
            .order_by_asc(user::Column::Id)
            .limit(page.page_size())
            .offset(page.offset())
            .all(&db)
            .await?;

        Ok(Page::new(
            models.into_iter().map(User::from).collect(),
            total,
            page,
        ))
    }
}
