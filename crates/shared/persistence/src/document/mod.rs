//! Generic document-store repository and its query options.

pub mod query;
pub mod repository;

pub use query::{
    lookup, undeclared_field, with_between, with_equal, with_filter, with_limit, with_lookup,
    with_search, with_skip, with_sort, DocumentEntity, DocumentOption, Field, QueryConfig,
    QueryPlan, SortDirection,
};
pub use repository::DocumentRepository;
