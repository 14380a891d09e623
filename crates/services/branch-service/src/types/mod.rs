//! Request and response shapes shared by the handlers.

mod pagination;
mod response;

pub use pagination::PaginationParams;
pub use response::{ApiResponse, PageMeta};
