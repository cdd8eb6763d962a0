//! Per-call executor resolution.

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, ExecResult,
    QueryResult, Statement,
};

use crate::infra::unit_of_work::TxContext;

/// Where a repository statement runs: the pool, or the caller's transaction.
pub enum Executor<'a> {
    Pool(&'a DatabaseConnection),
    Transaction(&'a DatabaseTransaction),
}

impl<'a> Executor<'a> {
    /// Resolve the executor for one call. The active transaction wins.
    pub fn resolve(pool: &'a DatabaseConnection, ctx: TxContext<'a>) -> Self {
        match ctx.transaction() {
            Some(txn) => Executor::Transaction(txn),
            None => Executor::Pool(pool),
        }
    }
}

#[async_trait]
impl ConnectionTrait for Executor<'_> {
    fn get_database_backend(&self) -> DbBackend {
        match self {
            Executor::Pool(conn) => conn.get_database_backend(),
            Executor::Transaction(txn) => txn.get_database_backend(),
        }
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        match self {
            Executor::Pool(conn) => conn.execute(stmt).await,
            Executor::Transaction(txn) => txn.execute(stmt).await,
        }
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        match self {
            Executor::Pool(conn) => conn.execute_unprepared(sql).await,
            Executor::Transaction(txn) => txn.execute_unprepared(sql).await,
        }
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        match self {
            Executor::Pool(conn) => conn.query_one(stmt).await,
            Executor::Transaction(txn) => txn.query_one(stmt).await,
        }
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        match self {
            Executor::Pool(conn) => conn.query_all(stmt).await,
            Executor::Transaction(txn) => txn.query_all(stmt).await,
        }
    }

    fn support_returning(&self) -> bool {
        match self {
            Executor::Pool(conn) => conn.support_returning(),
            Executor::Transaction(txn) => txn.support_returning(),
        }
    }

    fn is_mock_connection(&self) -> bool {
        match self {
            Executor::Pool(conn) => conn.is_mock_connection(),
            Executor::Transaction(txn) => txn.is_mock_connection(),
        }
    }
}
