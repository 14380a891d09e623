//! Upload metadata stored in the document store.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use common::AppResult;
use persistence::document::{with_search, with_sort};
use persistence::{DocumentEntity, DocumentRepository, Field, PaginatedResult, SortDirection};

/// One stored file as recorded in the `uploads` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// Generated file name on disk
    #[schema(example = "0190a5b2c3d47e8f9a0b1c2d3e4f5a6b.png")]
    pub file_name: String,
    /// Name the client submitted
    #[schema(example = "logo.png")]
    pub original_name: String,
    pub path: String,
    pub size: i64,
    pub url: String,
    pub content_type: Option<String>,
    /// Uid of the uploader
    pub uploaded_by: String,
    /// RFC 3339, UTC
    pub uploaded_at: String,
}

impl DocumentEntity for UploadRecord {
    const COLLECTION: &'static str = "uploads";
    const FIELDS: &'static [&'static str] = &[
        "fileName",
        "originalName",
        "path",
        "size",
        "url",
        "contentType",
        "uploadedBy",
        "uploadedAt",
    ];
}

/// Upload metadata access.
#[derive(Clone)]
pub struct UploadRepository {
    inner: DocumentRepository<UploadRecord>,
}

impl UploadRepository {
    pub fn new(inner: DocumentRepository<UploadRecord>) -> Self {
        Self { inner }
    }

    pub async fn record_batch(&self, records: &[UploadRecord]) -> AppResult<usize> {
        self.inner.create_bulk(records).await
    }

    /// Newest first, optionally narrowed to original names containing `search`.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> AppResult<PaginatedResult<UploadRecord>> {
        let original_name = Field::<UploadRecord>::parse("originalName")?;
        let uploaded_at = Field::<UploadRecord>::parse("uploadedAt")?;
        let options = [
            with_search(original_name, search.unwrap_or_default()),
            with_sort(vec![(uploaded_at, SortDirection::Desc)]),
        ];
        self.inner.find_with_pagination(page, per_page, &options).await
    }
}
