//! Composable query options for the relational repository.
//!
//! A [`QueryOption`] is a pure transformation of a [`QuerySpec`]. Options are
//! applied left to right onto a fresh spec scoped to one entity. Filters
//! conjoin, joins accumulate, and ordering, limit and offset overwrite.
//! Options built from a missing value leave the `QuerySpec` untouched, so callers
//! can pass them unconditionally.

use std::fmt;
use std::sync::Arc;

use sea_orm::sea_query::{IntoCondition, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, Order, QueryFilter, QueryOrder, QuerySelect,
    RelationDef, RelationTrait, Select, Value,
};

/// Accumulated query-shaping directives for entity `E`.
pub struct QuerySpec<E: EntityTrait> {
    condition: Condition,
    criteria: usize,
    orders: Vec<(E::Column, Order)>,
    joins: Vec<(JoinType, RelationDef)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<E: EntityTrait> Default for QuerySpec<E> {
    fn default() -> Self {
        Self {
            condition: Condition::all(),
            criteria: 0,
            orders: Vec::new(),
            joins: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

impl<E: EntityTrait> fmt::Debug for QuerySpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySpec")
            .field("criteria", &self.criteria)
            .field("orders", &self.orders.len())
            .field("joins", &self.joins.len())
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<E: EntityTrait> QuerySpec<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `options` in order onto an empty spec.
    pub fn compose(options: &[QueryOption<E>]) -> Self {
        options
            .iter()
            .fold(Self::new(), |spec, option| option.apply(spec))
    }

    /// AND a predicate onto the filter.
    pub fn and_where<C: IntoCondition>(mut self, condition: C) -> Self {
        self.condition = self.condition.add(condition.into_condition());
        self.criteria += 1;
        self
    }

    pub fn set_orders(mut self, orders: Vec<(E::Column, Order)>) -> Self {
        self.orders = orders;
        self
    }

    pub fn add_join(mut self, join: JoinType, relation: RelationDef) -> Self {
        self.joins.push((join, relation));
        self
    }

    pub fn set_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn set_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// True when at least one filter predicate has been added.
    pub fn has_criteria(&self) -> bool {
        self.criteria > 0
    }

    pub fn has_joins(&self) -> bool {
        !self.joins.is_empty()
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Build the filtered, joined and ordered select. Limit and offset are
    /// left to the caller so the same select can be counted.
    pub fn into_select(self) -> Select<E> {
        let mut select = E::find();
        for (join, relation) in self.joins {
            select = select.join(join, relation);
        }
        if self.criteria > 0 {
            select = select.filter(self.condition);
        }
        for (column, order) in self.orders {
            select = select.order_by(column, order);
        }
        select
    }

    /// The conjoined filter, or `None` when no predicate was added.
    pub fn into_condition(self) -> Option<Condition> {
        (self.criteria > 0).then_some(self.condition)
    }
}

/// Apply a limit and offset, each only when present.
pub(crate) fn clip<E: EntityTrait>(
    mut select: Select<E>,
    limit: Option<u64>,
    offset: Option<u64>,
) -> Select<E> {
    if let Some(limit) = limit {
        select = select.limit(limit);
    }
    if let Some(offset) = offset {
        select = select.offset(offset);
    }
    select
}

/// A reusable transformation of a [`QuerySpec`].
pub struct QueryOption<E: EntityTrait> {
    apply: Arc<dyn Fn(QuerySpec<E>) -> QuerySpec<E> + Send + Sync>,
}

impl<E: EntityTrait> Clone for QueryOption<E> {
    fn clone(&self) -> Self {
        Self {
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for QueryOption<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("QueryOption")
    }
}

impl<E: EntityTrait> QueryOption<E> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(QuerySpec<E>) -> QuerySpec<E> + Send + Sync + 'static,
    {
        Self { apply: Arc::new(f) }
    }

    /// Option that leaves the `QuerySpec` untouched.
    pub fn noop() -> Self {
        Self::new(|spec| spec)
    }

    pub fn apply(&self, spec: QuerySpec<E>) -> QuerySpec<E> {
        (self.apply)(spec)
    }
}

/// `column = value`, skipped when `value` is `None`.
pub fn with_equal<E, V>(column: E::Column, value: Option<V>) -> QueryOption<E>
where
    E: EntityTrait,
    V: Into<Value> + Clone + Send + Sync + 'static,
{
    match value {
        Some(value) => QueryOption::new(move |spec| spec.and_where(column.eq(value.clone()))),
        None => QueryOption::noop(),
    }
}

/// `column BETWEEN from AND to`, skipped unless both bounds are present.
pub fn with_between<E, V>(column: E::Column, from: Option<V>, to: Option<V>) -> QueryOption<E>
where
    E: EntityTrait,
    V: Into<Value> + Clone + Send + Sync + 'static,
{
    match (from, to) {
        (Some(from), Some(to)) => QueryOption::new(move |spec| {
            spec.and_where(column.between(from.clone(), to.clone()))
        }),
        _ => QueryOption::noop(),
    }
}

/// Escape character for LIKE patterns built by [`with_search`].
pub const LIKE_ESCAPE: char = '!';

/// Substring match (`LIKE %keyword%`), skipped when the keyword is blank.
/// `%` and `_` in the keyword match literally.
pub fn with_search<E>(column: E::Column, keyword: impl Into<String>) -> QueryOption<E>
where
    E: EntityTrait,
{
    let keyword = keyword.into();
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return QueryOption::noop();
    }
    let pattern = format!("%{}%", escape_like(keyword));
    QueryOption::new(move |spec| {
        spec.and_where(column.like(LikeExpr::new(pattern.as_str()).escape(LIKE_ESCAPE)))
    })
}

/// Escape LIKE wildcards and the escape character itself.
pub fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Arbitrary predicate, e.g. `Column::Score.gt(10)` or a nested `Condition`.
pub fn with_condition<E, C>(condition: C) -> QueryOption<E>
where
    E: EntityTrait,
    C: IntoCondition + Clone + Send + Sync + 'static,
{
    QueryOption::new(move |spec| spec.and_where(condition.clone()))
}

/// Single-key ordering. Replaces any earlier ordering.
pub fn with_order<E: EntityTrait>(column: E::Column, order: Order) -> QueryOption<E> {
    with_orders(vec![(column, order)])
}

/// Multi-key ordering, applied in the given sequence. Replaces any earlier ordering.
pub fn with_orders<E: EntityTrait>(orders: Vec<(E::Column, Order)>) -> QueryOption<E> {
    QueryOption::new(move |spec| spec.set_orders(orders.clone()))
}

pub fn with_limit<E: EntityTrait>(limit: u64) -> QueryOption<E> {
    QueryOption::new(move |spec| spec.set_limit(limit))
}

pub fn with_offset<E: EntityTrait>(offset: u64) -> QueryOption<E> {
    QueryOption::new(move |spec| spec.set_offset(offset))
}

/// Join a related table through `relation`. Joins accumulate.
pub fn with_join<E, R>(join: JoinType, relation: R) -> QueryOption<E>
where
    E: EntityTrait,
    R: RelationTrait + Copy + Send + Sync + 'static,
{
    QueryOption::new(move |spec| spec.add_join(join, relation.def()))
}
