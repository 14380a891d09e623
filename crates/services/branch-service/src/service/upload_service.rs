//! Upload service - stores file batches and records their metadata.

use async_trait::async_trait;
use chrono::Utc;

use common::{AppError, AppResult};
use persistence::PaginatedResult;
use storage::{upload_files, IncomingFile, UploadConfig, UploadResult};

use crate::repository::{UploadRecord, UploadRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Upload service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UploadService: Send + Sync {
    /// Store the whole batch or fail it.
    ///
    /// `base_url` is the public address of the upload root for this request,
    /// overridden by a configured base URL.
    async fn upload(
        &self,
        files: Vec<IncomingFile>,
        base_url: String,
        uploaded_by: String,
    ) -> AppResult<Vec<UploadResult>>;

    /// Recorded uploads, newest first
    async fn list_uploads(
        &self,
        search: Option<String>,
        page: i64,
        per_page: i64,
    ) -> AppResult<PaginatedResult<UploadRecord>>;
}

/// Concrete implementation of UploadService.
///
/// Metadata is only recorded when a document store is configured.
pub struct UploadManager {
    config: UploadConfig,
    records: Option<UploadRepository>,
}

impl UploadManager {
    pub fn new(config: UploadConfig, records: Option<UploadRepository>) -> Self {
        Self { config, records }
    }
}

fn to_record(result: &UploadResult, uploaded_by: &str, uploaded_at: &str) -> UploadRecord {
    UploadRecord {
        file_name: result.file_name.clone(),
        original_name: result.original_name.clone(),
        path: result.path.clone(),
        size: i64::try_from(result.size).unwrap_or(i64::MAX),
        url: result.url.clone(),
        content_type: result.content_type.clone(),
        uploaded_by: uploaded_by.to_string(),
        uploaded_at: uploaded_at.to_string(),
    }
}

#[async_trait]
impl UploadService for UploadManager {
    async fn upload(
        &self,
        files: Vec<IncomingFile>,
        base_url: String,
        uploaded_by: String,
    ) -> AppResult<Vec<UploadResult>> {
        let results = upload_files(files, &self.config, &base_url).await?;

        if let Some(records) = &self.records {
            let uploaded_at = Utc::now().to_rfc3339();
            let batch: Vec<UploadRecord> = results
                .iter()
                .map(|result| to_record(result, &uploaded_by, &uploaded_at))
                .collect();
            records.record_batch(&batch).await?;
        }

        Ok(results)
    }

    async fn list_uploads(
        &self,
        search: Option<String>,
        page: i64,
        per_page: i64,
    ) -> AppResult<PaginatedResult<UploadRecord>> {
        let records = self
            .records
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("document store"))?;
        records.list(search.as_deref(), page, per_page).await
    }
}
