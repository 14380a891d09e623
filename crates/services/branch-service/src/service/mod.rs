//! Service layer - business logic.

mod branch_service;
mod upload_service;

pub use branch_service::{BranchManager, BranchService};
pub use upload_service::{UploadManager, UploadService};

#[cfg(any(test, feature = "test-utils"))]
pub use branch_service::MockBranchService;
#[cfg(any(test, feature = "test-utils"))]
pub use upload_service::MockUploadService;
