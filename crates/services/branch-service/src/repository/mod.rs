//! Repository layer for data access.

pub mod entities;
mod branch_repository;
mod upload_repository;

pub use branch_repository::{BranchFilter, BranchRepository};
pub use upload_repository::{UploadRecord, UploadRepository};
