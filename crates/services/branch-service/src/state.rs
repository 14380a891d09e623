//! Application state for dependency injection.

use std::path::PathBuf;
use std::sync::Arc;

use common::ServiceConfig;

use crate::auth::TokenUtil;
use crate::infra::{Database, DocumentStore};
use crate::service::{BranchService, UploadService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub branches: Arc<dyn BranchService>,
    pub uploads: Arc<dyn UploadService>,
    pub tokens: Arc<TokenUtil>,
    pub database: Database,
    pub document_store: Option<DocumentStore>,
    pub service: ServiceConfig,
    /// Directory served under `/files`
    pub upload_dir: PathBuf,
}
