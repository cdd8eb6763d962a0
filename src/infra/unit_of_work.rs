//! Unit of Work - transaction lifecycle management.
//!
//! A unit of work runs against a [`TxContext`] that borrows the active
//! transaction. Repositories take the context as an ordinary argument and
//! decide per call whether to run on the transaction or on the pool, so the
//! same repository method works inside and outside a transaction.
//!
//! Outcome rules:
//! - unit of work fails: roll back, return the same error untouched
//! - unit of work succeeds: commit; a failed commit is reported as internal
//! - deadline elapses: the unit-of-work future is dropped, the transaction
//!   rolled back, and an internal error returned

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::{AppError, AppResult};

/// Boxed future returned by a unit of work.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Execution context handed to repository calls.
///
/// Carries the active transaction, if any. `TxContext::none()` runs
/// statements on the pooled connection.
#[derive(Clone, Copy, Default)]
pub struct TxContext<'a> {
    txn: Option<&'a DatabaseTransaction>,
}

impl<'a> TxContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn: Some(txn) }
    }

    /// Context without a transaction
    pub fn none() -> TxContext<'static> {
        TxContext { txn: None }
    }

    /// Active transaction, if this context carries one
    pub fn transaction(&self) -> Option<&'a DatabaseTransaction> {
        self.txn
    }

    pub fn in_transaction(&self) -> bool {
        self.txn.is_some()
    }
}

impl std::fmt::Debug for TxContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxContext")
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}

/// Transaction manager trait for dependency injection.
///
/// Not object-safe because of the generic methods; services take it as a
/// type parameter.
#[async_trait]
pub trait TransactionManager: Send + Sync + 'static {
    /// Execute a unit of work within a ReadCommitted transaction.
    async fn within_tx<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TxContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;

    /// Execute a unit of work within a Serializable transaction.
    async fn within_tx_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TxContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Timeout of a unit of work
#[derive(Debug, thiserror::Error)]
#[error("transaction exceeded its deadline of {0:?}")]
pub struct TxDeadlineExceeded(pub Duration);

/// SeaORM-backed transaction manager
#[derive(Clone)]
pub struct SeaTransactionManager {
    db: DatabaseConnection,
    timeout: Option<Duration>,
}

impl SeaTransactionManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, timeout: None }
    }

    /// Bound every unit of work by `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TxContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::internal)?;

        let outcome = {
            let work = f(TxContext::new(&txn));
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, work).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(
                            timeout_ms = limit.as_millis() as u64,
                            "Transaction deadline exceeded"
                        );
                        Err(AppError::internal(TxDeadlineExceeded(limit)))
                    }
                },
                None => work.await,
            }
        };

        match outcome {
            Ok(value) => {
                txn.commit().await.map_err(|e| {
                    tracing::error!(error = %e, "Transaction commit failed");
                    AppError::internal(e)
                })?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!(error = %rollback_err, "Transaction rollback failed");
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl TransactionManager for SeaTransactionManager {
    async fn within_tx<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TxContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f).await
    }

    async fn within_tx_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TxContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f).await
    }
}

/// Run a block inside a transaction.
///
/// Everything the block uses must be moved in, because the unit of work has
/// to be valid for any transaction lifetime.
#[macro_export]
macro_rules! with_transaction {
    ($tx:expr, |$ctx:ident| $body:expr) => {
        $tx.within_tx(move |$ctx| Box::pin(async move { $body })).await
    };
}
