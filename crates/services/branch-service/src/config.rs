//! Branch service configuration.

use common::{AppResult, DatabaseConfig, DocumentStoreConfig, JwtConfig, ServiceConfig};
use storage::UploadConfig;

/// Default HTTP port of the branch service.
pub const DEFAULT_PORT: u16 = 8080;

/// Branch service configuration.
#[derive(Debug, Clone)]
pub struct BranchServiceConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    /// Document store, disabled when `MONGO_URL` is unset
    pub document_store: Option<DocumentStoreConfig>,
    pub jwt: JwtConfig,
    pub upload: UploadConfig,
}

impl BranchServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            service: ServiceConfig::from_env("branch-service", "BRANCH_SERVICE", DEFAULT_PORT),
            database: DatabaseConfig::from_env(),
            document_store: DocumentStoreConfig::from_env(),
            jwt: JwtConfig::from_env()?,
            upload: UploadConfig::from_env(),
        })
    }
}
