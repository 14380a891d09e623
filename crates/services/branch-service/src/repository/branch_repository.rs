//! Branch repository on top of the generic relational repository.
//!
//! All reads exclude soft-deleted rows. A row counts as live when its
//! delete flag is false or NULL.

use sea_orm::{ActiveModelBehavior, ColumnTrait, Condition, ConnectionTrait, Order, Set};

use common::AppResult;
use domain::{Branch, UpdateBranch};
use persistence::{
    with_condition, with_equal, with_order, with_search, QueryOption, Repository,
};

use super::entities::branch::{ActiveModel, Column, Entity};

/// Listing filter. Absent values do not narrow the result.
#[derive(Debug, Clone, Default)]
pub struct BranchFilter {
    /// Substring of the branch name
    pub search: Option<String>,
    pub management: Option<bool>,
}

/// Branch persistence. Every method takes the handle to run on, either the
/// pooled connection or an open transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchRepository {
    inner: Repository<Entity>,
}

fn live() -> QueryOption<Entity> {
    with_condition(
        Condition::any()
            .add(Column::IsDeleted.eq(false))
            .add(Column::IsDeleted.is_null()),
    )
}

fn by_id(id: &str) -> QueryOption<Entity> {
    with_equal(Column::Id, Some(id.to_string()))
}

impl BranchRepository {
    pub const fn new() -> Self {
        Self {
            inner: Repository::new(),
        }
    }

    /// True when any row, deleted or not, already uses `id`.
    pub async fn exists<C: ConnectionTrait>(&self, db: &C, id: &str) -> AppResult<bool> {
        Ok(self.inner.count(db, &[by_id(id)]).await? > 0)
    }

    /// True when `id` is a live management record.
    pub async fn is_live_management<C: ConnectionTrait>(
        &self,
        db: &C,
        id: &str,
    ) -> AppResult<bool> {
        let options = [
            by_id(id),
            live(),
            with_equal(Column::IsManagement, Some(true)),
        ];
        Ok(self.inner.count(db, &options).await? > 0)
    }

    pub async fn create<C: ConnectionTrait>(&self, db: &C, branch: Branch) -> AppResult<Branch> {
        let model = self.inner.create(db, ActiveModel::from(branch)).await?;
        Ok(Branch::from(model))
    }

    pub async fn find_live<C: ConnectionTrait>(&self, db: &C, id: &str) -> AppResult<Branch> {
        let model = self.inner.find_one(db, &[by_id(id), live()]).await?;
        Ok(Branch::from(model))
    }

    /// One page of live branches ordered by id, plus the total under the filter.
    pub async fn list<C: ConnectionTrait>(
        &self,
        db: &C,
        filter: &BranchFilter,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<Branch>, u64)> {
        let options = [
            live(),
            with_equal(Column::IsManagement, filter.management),
            with_search(Column::Name, filter.search.clone().unwrap_or_default()),
            with_order(Column::Id, Order::Asc),
        ];
        let (models, total) = self
            .inner
            .find_with_pagination(db, page, per_page, &options)
            .await?;
        Ok((models.into_iter().map(Branch::from).collect(), total))
    }

    /// Write only the fields present in `changes`.
    pub async fn update<C: ConnectionTrait>(
        &self,
        db: &C,
        id: &str,
        changes: UpdateBranch,
    ) -> AppResult<Branch> {
        let mut model = ActiveModel::new();
        model.id = Set(id.to_string());
        if let Some(name) = changes.name {
            model.name = Set(name);
        }
        if let Some(address) = changes.address {
            model.address = Set(address);
        }
        if let Some(city) = changes.city {
            model.city = Set(city);
        }
        if let Some(contact) = changes.contact {
            model.contact = Set(contact);
        }
        if let Some(email) = changes.email {
            model.email = Set(email);
        }
        if let Some(coordinate) = changes.coordinate {
            model.coordinate = Set(coordinate);
        }
        if let Some(whatsapp_number) = changes.whatsapp_number {
            model.whatsapp_number = Set(Some(whatsapp_number));
        }
        if let Some(logo) = changes.logo {
            model.logo = Set(Some(logo));
        }

        let updated = self.inner.update_one(db, model).await?;
        Ok(Branch::from(updated))
    }

    /// Flag the live row with `id` as deleted. Returns the rows affected.
    pub async fn soft_delete<C: ConnectionTrait>(&self, db: &C, id: &str) -> AppResult<u64> {
        self.inner
            .update_many(db, vec![(Column::IsDeleted, true.into())], &[by_id(id), live()])
            .await
    }

    /// Live branches reporting to `upline`.
    pub async fn count_downlines<C: ConnectionTrait>(
        &self,
        db: &C,
        upline: &str,
    ) -> AppResult<u64> {
        let options = [with_equal(Column::Upline, Some(upline.to_string())), live()];
        self.inner.count(db, &options).await
    }
}
