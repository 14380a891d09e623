//! Generic data-access layer.
//!
//! - [`query`] and [`repository`]: composable options and CRUD over any SeaORM entity
//! - [`transaction`]: commit-or-rollback executor for units of work
//! - [`document`]: the same contract over a MongoDB collection, with
//!   aggregation-pipeline assembly
//! - [`pagination`]: page coercion and metadata shared by both

pub mod document;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod transaction;

pub use document::{
    DocumentEntity, DocumentOption, DocumentRepository, Field, QueryPlan, SortDirection,
};
pub use pagination::{PageMetadata, PaginatedResult};
pub use query::{
    with_between, with_condition, with_equal, with_join, with_limit, with_offset, with_order,
    with_orders, with_search, QueryOption, QuerySpec,
};
pub use repository::Repository;
pub use transaction::{execute_in_transaction, execute_in_transaction_with, UnitOfWork};
