//! Branch service - registration and maintenance of branch records.
//!
//! Every write runs inside a transaction so the existence checks and the
//! write they guard see the same snapshot.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{Branch, CreateBranch, CreateManagement, UpdateBranch};
use persistence::{execute_in_transaction, PaginatedResult};

use crate::repository::{BranchFilter, BranchRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Branch service trait for dependency injection.
///
/// Reads and updates only see branches that are not soft-deleted.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BranchService: Send + Sync {
    /// Register a management (head office) record
    async fn add_management(&self, cmd: CreateManagement) -> AppResult<Branch>;

    /// Register a branch under an existing management record
    async fn add_branch(&self, cmd: CreateBranch) -> AppResult<Branch>;

    /// One page of live branches
    async fn list_branches(
        &self,
        filter: BranchFilter,
        page: i64,
        per_page: i64,
    ) -> AppResult<PaginatedResult<Branch>>;

    async fn get_branch(&self, id: &str) -> AppResult<Branch>;

    /// Partial update, only the provided fields are written
    async fn update_branch(&self, id: &str, changes: UpdateBranch) -> AppResult<Branch>;

    /// Soft delete
    async fn delete_branch(&self, id: &str) -> AppResult<()>;
}

/// Concrete implementation of BranchService over the relational store.
pub struct BranchManager {
    db: DatabaseConnection,
    branches: BranchRepository,
}

impl BranchManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            branches: BranchRepository::new(),
        }
    }

    fn new_client_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[async_trait]
impl BranchService for BranchManager {
    async fn add_management(&self, cmd: CreateManagement) -> AppResult<Branch> {
        let branch = Branch::management(cmd, Self::new_client_id());
        let branches = self.branches;

        let created = execute_in_transaction(&self.db, |txn| {
            Box::pin(async move {
                if branches.exists(txn, &branch.id).await? {
                    return Err(AppError::conflict(format!("Branch {}", branch.id)));
                }
                branches.create(txn, branch).await
            })
        })
        .await?;

        tracing::info!(id = %created.id, "Management created");
        Ok(created)
    }

    async fn add_branch(&self, cmd: CreateBranch) -> AppResult<Branch> {
        let branch = Branch::branch(cmd, Self::new_client_id())?;
        let branches = self.branches;

        let created = execute_in_transaction(&self.db, |txn| {
            Box::pin(async move {
                if branches.exists(txn, &branch.id).await? {
                    return Err(AppError::conflict(format!("Branch {}", branch.id)));
                }
                if !branches.is_live_management(txn, &branch.upline).await? {
                    return Err(AppError::validation(format!(
                        "Upline {} is not a registered management",
                        branch.upline
                    )));
                }
                branches.create(txn, branch).await
            })
        })
        .await?;

        tracing::info!(id = %created.id, upline = %created.upline, "Branch created");
        Ok(created)
    }

    async fn list_branches(
        &self,
        filter: BranchFilter,
        page: i64,
        per_page: i64,
    ) -> AppResult<PaginatedResult<Branch>> {
        let (data, total) = self
            .branches
            .list(&self.db, &filter, page, per_page)
            .await?;
        Ok(PaginatedResult::new(data, total, page, per_page))
    }

    async fn get_branch(&self, id: &str) -> AppResult<Branch> {
        self.branches.find_live(&self.db, id).await
    }

    async fn update_branch(&self, id: &str, changes: UpdateBranch) -> AppResult<Branch> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        let branches = self.branches;
        let id = id.to_string();

        execute_in_transaction(&self.db, |txn| {
            Box::pin(async move {
                branches.find_live(txn, &id).await?;
                branches.update(txn, &id, changes).await
            })
        })
        .await
    }

    async fn delete_branch(&self, id: &str) -> AppResult<()> {
        let branches = self.branches;
        let id = id.to_string();

        execute_in_transaction(&self.db, |txn| {
            Box::pin(async move {
                let branch = branches.find_live(txn, &id).await?;
                if branch.is_management() && branches.count_downlines(txn, &id).await? > 0 {
                    return Err(AppError::bad_request(
                        "Management still has active branches",
                    ));
                }
                branches.soft_delete(txn, &id).await?;
                tracing::info!(id = %id, "Branch soft deleted");
                Ok(())
            })
        })
        .await
    }
}
