//! Upload handlers.

use axum::{
    extract::{Extension, Multipart, Query, State},
    http::{header::HOST, HeaderMap},
    routing::get,
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use common::{AppError, AppResult};
use domain::Auth;
use storage::{IncomingFile, UploadResult};

use crate::repository::UploadRecord;
use crate::state::AppState;
use crate::types::{ApiResponse, PaginationParams};

/// Path the upload directory is served under.
pub const FILES_MOUNT: &str = "/files";

/// One stored file
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    #[schema(example = "0190a5b2c3d47e8f9a0b1c2d3e4f5a6b.png")]
    pub file_name: String,
    #[schema(example = "logo.png")]
    pub original_name: String,
    pub size: u64,
    #[schema(example = "http://localhost:8080/files/2026/10/16/0190a5b2c3d47e8f9a0b1c2d3e4f5a6b.png")]
    pub url: String,
}

impl From<UploadResult> for UploadedFile {
    fn from(result: UploadResult) -> Self {
        Self {
            file_name: result.file_name,
            original_name: result.original_name,
            size: result.size,
            url: result.url,
        }
    }
}

/// Create upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/", get(list_uploads).post(upload))
}

/// Upload a batch of files (multipart, every part with a file name)
#[utoipa::path(
    post,
    path = "/uploads",
    tag = "Uploads",
    security(("bearer_auth" = [])),
    request_body(content_type = "multipart/form-data", description = "One or more file parts"),
    responses(
        (status = 201, description = "Every file stored", body = Vec<UploadedFile>),
        (status = 400, description = "No files, or a file was rejected"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn upload(
    Extension(auth): Extension<Auth>,
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<Vec<UploadedFile>>> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        // A file input left empty arrives as `filename=""`
        let Some(file_name) = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        files.push(IncomingFile {
            file_name,
            content_type,
            data,
        });
    }

    let results = state
        .uploads
        .upload(files, public_base_url(&headers), auth.uid)
        .await?;

    Ok(ApiResponse::created(
        results.into_iter().map(UploadedFile::from).collect(),
    ))
}

/// List recorded uploads, newest first
#[utoipa::path(
    get,
    path = "/uploads",
    tag = "Uploads",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of upload records", body = Vec<UploadRecord>),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Document store not configured")
    )
)]
pub async fn list_uploads(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<ApiResponse<Vec<UploadRecord>>> {
    let result = state
        .uploads
        .list_uploads(params.search(), params.page(), params.per_page())
        .await?;
    Ok(ApiResponse::page(result, |record| record))
}

/// `{scheme}://{host}/files`, scheme from `X-Forwarded-Proto`.
fn public_base_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{}://{}{}", scheme, host, FILES_MOUNT)
}
