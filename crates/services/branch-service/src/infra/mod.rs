//! Infrastructure layer - relational and document store connections.

mod db;
mod mongo;

pub use db::Database;
pub use mongo::DocumentStore;
