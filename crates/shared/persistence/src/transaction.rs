//! Transaction executor.
//!
//! Begins a transaction, hands it to a unit of work, and commits on success
//! or rolls back on failure. The unit of work only borrows the transaction,
//! so it cannot leak past the commit.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{AccessMode, DatabaseTransaction, DbErr, IsolationLevel, TransactionTrait};

use common::{AppError, AppResult};

/// Boxed future returned by a unit of work.
pub type UnitOfWork<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Run `f` inside a transaction with the backend's default isolation.
///
/// ```ignore
/// let branch = execute_in_transaction(&db, |txn| {
///     Box::pin(async move { repo.create(txn, model).await })
/// })
/// .await?;
/// ```
pub async fn execute_in_transaction<C, F, T>(db: &C, f: F) -> AppResult<T>
where
    C: TransactionTrait,
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> UnitOfWork<'a, T> + Send,
    T: Send,
{
    run(db.begin().await, f).await
}

/// Run `f` inside a read-write transaction at `isolation`.
pub async fn execute_in_transaction_with<C, F, T>(
    db: &C,
    isolation: IsolationLevel,
    f: F,
) -> AppResult<T>
where
    C: TransactionTrait,
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> UnitOfWork<'a, T> + Send,
    T: Send,
{
    run(
        db.begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await,
        f,
    )
    .await
}

async fn run<F, T>(begun: Result<DatabaseTransaction, DbErr>, f: F) -> AppResult<T>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> UnitOfWork<'a, T> + Send,
    T: Send,
{
    let txn = begun.map_err(AppError::Transaction)?;

    match f(&txn).await {
        Ok(result) => {
            txn.commit().await.map_err(AppError::Transaction)?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

/// Shorthand for [`execute_in_transaction`] with an inline async body.
///
/// ```ignore
/// let count = with_transaction!(&db, |txn| repo.count(txn, &[]).await)?;
/// ```
#[macro_export]
macro_rules! with_transaction {
    ($db:expr, |$txn:ident| $body:expr) => {
        $crate::transaction::execute_in_transaction($db, |$txn| {
            ::std::boxed::Box::pin(async move { $body })
        })
        .await
    };
}
