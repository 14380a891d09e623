//! Generic relational repository.
//!
//! [`Repository`] carries no connection. Every call takes the handle to run
//! on, so the same repository works against a pooled connection or an open
//! transaction.

use std::fmt;
use std::marker::PhantomData;

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, IdenStatic,
    IntoActiveModel, Iterable, LoaderTrait, PaginatorTrait, PrimaryKeyToColumn, QueryFilter, Related,
    Value,
};

use common::{AppError, AppResult, OptionExt};

use crate::query::{clip, QueryOption, QuerySpec};

/// Type-parameterized CRUD, pagination and count over entity `E`.
pub struct Repository<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Repository<E> {}

impl<E> Default for Repository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Repository")
    }
}

impl<E> Repository<E> {
    pub const fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<E> Repository<E>
where
    E: EntityTrait,
    E::Model: Sync,
{
    // =========================================================================
    // Reads
    // =========================================================================

    /// Every row, unfiltered.
    pub async fn find_all<C: ConnectionTrait>(&self, db: &C) -> AppResult<Vec<E::Model>> {
        Ok(E::find().all(db).await?)
    }

    pub async fn find_many<C: ConnectionTrait>(
        &self,
        db: &C,
        options: &[QueryOption<E>],
    ) -> AppResult<Vec<E::Model>> {
        let spec = QuerySpec::compose(options);
        let (limit, offset) = (spec.limit(), spec.offset());
        Ok(clip(spec.into_select(), limit, offset).all(db).await?)
    }

    /// First match, or `NotFound`.
    pub async fn find_one<C: ConnectionTrait>(
        &self,
        db: &C,
        options: &[QueryOption<E>],
    ) -> AppResult<E::Model> {
        let spec = QuerySpec::compose(options);
        let offset = spec.offset();
        clip(spec.into_select(), None, offset)
            .one(db)
            .await?
            .ok_or_not_found()
    }

    /// Count matches, then fetch one page of them.
    ///
    /// When `page` or `page_size` is not positive no page clipping is
    /// applied, only whatever limit/offset the options carry.
    pub async fn find_with_pagination<C: ConnectionTrait>(
        &self,
        db: &C,
        page: i64,
        page_size: i64,
        options: &[QueryOption<E>],
    ) -> AppResult<(Vec<E::Model>, u64)> {
        let spec = QuerySpec::compose(options);
        let (mut limit, mut offset) = (spec.limit(), spec.offset());
        let select = spec.into_select();

        let total = select.clone().count(db).await?;

        if page > 0 && page_size > 0 {
            let size = page_size as u64;
            limit = Some(size);
            offset = Some((page as u64 - 1).saturating_mul(size));
        }

        let rows = clip(select, limit, offset).all(db).await?;
        Ok((rows, total))
    }

    /// Matches with their related `R` rows eagerly loaded in one extra query.
    pub async fn find_with_related<C, R>(
        &self,
        db: &C,
        related: R,
        options: &[QueryOption<E>],
    ) -> AppResult<Vec<(E::Model, Vec<R::Model>)>>
    where
        C: ConnectionTrait,
        R: EntityTrait,
        R::Model: Send + Sync,
        E: Related<R>,
    {
        let parents = self.find_many(db, options).await?;
        let children = parents.load_many(related, db).await?;
        Ok(parents.into_iter().zip(children).collect())
    }

    /// Count matches, ignoring limit and offset.
    pub async fn count<C: ConnectionTrait>(
        &self,
        db: &C,
        options: &[QueryOption<E>],
    ) -> AppResult<u64> {
        Ok(QuerySpec::compose(options).into_select().count(db).await?)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    pub async fn create<C, A>(&self, db: &C, model: A) -> AppResult<E::Model>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        E::Model: IntoActiveModel<A>,
    {
        Ok(model.insert(db).await?)
    }

    /// Insert all `models` in one statement. Returns the number inserted.
    pub async fn create_bulk<C, A, I>(&self, db: &C, models: I) -> AppResult<u64>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait<Entity = E> + Send + 'static,
        E::Model: IntoActiveModel<A>,
        I: IntoIterator<Item = A>,
    {
        let models: Vec<A> = models.into_iter().collect();
        if models.is_empty() {
            return Ok(0);
        }
        let count = models.len();
        E::insert_many(models).exec_without_returning(db).await?;
        Ok(count as u64)
    }

    /// Insert, or overwrite the non-key columns of the row with the same
    /// primary key. Pass a fully populated active model.
    pub async fn save<C, A>(&self, db: &C, model: A) -> AppResult<()>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait<Entity = E> + Send + 'static,
        E::Model: IntoActiveModel<A>,
    {
        let keys: Vec<E::Column> = E::PrimaryKey::iter().map(|key| key.into_column()).collect();
        let columns: Vec<E::Column> = E::Column::iter()
            .filter(|column| !keys.iter().any(|key| key.as_str() == column.as_str()))
            .collect();

        let mut on_conflict = OnConflict::columns(keys);
        if columns.is_empty() {
            on_conflict.do_nothing();
        } else {
            on_conflict.update_columns(columns);
        }

        E::insert(model)
            .on_conflict(on_conflict)
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// Write the set fields of `model` to the row with its primary key.
    pub async fn update_one<C, A>(&self, db: &C, model: A) -> AppResult<E::Model>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        E::Model: IntoActiveModel<A>,
    {
        model.update(db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => AppError::NotFound,
            other => AppError::Database(other),
        })
    }

    /// Set `fields` on every match. Refused without a filter or without fields.
    pub async fn update_many<C: ConnectionTrait>(
        &self,
        db: &C,
        fields: Vec<(E::Column, Value)>,
        options: &[QueryOption<E>],
    ) -> AppResult<u64> {
        if fields.is_empty() {
            return Err(AppError::guard("no fields to update"));
        }
        let spec = QuerySpec::compose(options);
        if spec.has_joins() {
            return Err(AppError::guard("joins are not supported in bulk updates"));
        }
        let condition = spec
            .into_condition()
            .ok_or_else(|| AppError::guard("refusing to update without a filter"))?;

        let mut update = E::update_many();
        for (column, value) in fields {
            update = update.col_expr(column, Expr::value(value));
        }
        let result = update.filter(condition).exec(db).await?;

        tracing::debug!(rows = result.rows_affected, "bulk update applied");
        Ok(result.rows_affected)
    }

    /// Delete the row with the primary key of `model`.
    pub async fn delete<C, A>(&self, db: &C, model: A) -> AppResult<u64>
    where
        C: ConnectionTrait,
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
    {
        Ok(model.delete(db).await?.rows_affected)
    }
}
