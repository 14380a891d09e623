//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.

pub mod auth;
pub mod branch;
pub mod constants;
pub mod error;

pub use auth::Auth;
pub use branch::{Branch, BranchResponse, CreateBranch, CreateManagement, UpdateBranch};
pub use constants::*;
pub use error::{DomainError, DomainResult};
