//! Concurrent upload pipeline.
//!
//! Every file in a batch is an independent unit: check the extension and
//! size, pick a fresh time-ordered name, write it under `root/YYYY/MM/DD/`.
//! Units run concurrently up to `max_concurrency`. The batch waits for all
//! of them and fails with the first failure to complete, if any. Files that
//! were already written stay on disk.

use std::env;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{Datelike, Local, NaiveDate};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use common::{split_list, AppError, AppResult};

/// A file received from a client, not yet validated.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Name as sent by the client; only its extension is kept
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl IncomingFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }
}

/// Upload pipeline settings.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Root directory of the dated folder tree
    pub upload_dir: PathBuf,
    /// Lowercase extensions without the leading dot
    pub allowed_extensions: Vec<String>,
    /// Per-file ceiling in megabytes, 0 disables the check
    pub max_file_size_mb: u64,
    /// Public address of `upload_dir`; derived per request when unset
    pub base_url: Option<String>,
    pub max_concurrency: usize,
}

impl UploadConfig {
    pub fn new(upload_dir: impl Into<PathBuf>, allowed_extensions: &[&str]) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            allowed_extensions: allowed_extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            ..Self::default()
        }
    }

    /// Load from `UPLOAD_DIR`, `UPLOAD_ALLOWED_EXTENSIONS`,
    /// `UPLOAD_MAX_FILE_SIZE_MB`, `UPLOAD_BASE_URL` and `UPLOAD_MAX_CONCURRENCY`.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),
            allowed_extensions: env::var("UPLOAD_ALLOWED_EXTENSIONS")
                .map(|v| {
                    split_list(&v)
                        .iter()
                        .map(|ext| normalize_extension(ext))
                        .collect()
                })
                .unwrap_or(default.allowed_extensions),
            max_file_size_mb: env::var("UPLOAD_MAX_FILE_SIZE_MB")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default.max_file_size_mb),
            base_url: env::var("UPLOAD_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            max_concurrency: env::var("UPLOAD_MAX_CONCURRENCY")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default.max_concurrency),
        }
    }

    fn max_bytes(&self) -> Option<u64> {
        (self.max_file_size_mb > 0).then(|| self.max_file_size_mb.saturating_mul(1024 * 1024))
    }

    fn allows(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|ext| ext == extension)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            allowed_extensions: ["jpg", "jpeg", "png", "pdf"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_file_size_mb: 5,
            base_url: None,
            max_concurrency: 4,
        }
    }
}

/// One stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// Generated name on disk
    pub file_name: String,
    /// Name the file was submitted under
    pub original_name: String,
    pub content_type: Option<String>,
    pub path: String,
    /// Bytes written
    pub size: u64,
    pub url: String,
}

/// Store every file of the batch or fail the batch.
///
/// `base_url` is used for the public URLs unless the config carries one.
/// Results come back in completion order.
pub async fn upload_files(
    files: Vec<IncomingFile>,
    config: &UploadConfig,
    base_url: &str,
) -> AppResult<Vec<UploadResult>> {
    if files.is_empty() {
        return Err(AppError::NoFilesSubmitted);
    }

    let folder = DateFolder::new(Local::now().date_naive());
    let directory = folder.under(&config.upload_dir);
    tokio::fs::create_dir_all(&directory).await?;

    let base_url = config
        .base_url
        .as_deref()
        .unwrap_or(base_url)
        .trim_end_matches('/')
        .to_string();

    let batch = files.len();
    let outcomes: Vec<AppResult<UploadResult>> = stream::iter(files)
        .map(|file| store(file, config, &directory, &folder, &base_url))
        .buffer_unordered(config.max_concurrency.max(1))
        .collect()
        .await;

    let mut stored = Vec::with_capacity(batch);
    let mut first_failure = None;
    for outcome in outcomes {
        match outcome {
            Ok(result) => stored.push(result),
            Err(e) => {
                tracing::warn!("Upload unit failed: {}", e);
                first_failure.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_failure {
        return Err(e);
    }

    tracing::info!(files = stored.len(), folder = %folder.relative, "Upload batch stored");
    Ok(stored)
}

async fn store(
    file: IncomingFile,
    config: &UploadConfig,
    directory: &Path,
    folder: &DateFolder,
    base_url: &str,
) -> AppResult<UploadResult> {
    let extension = extension_of(&file.file_name).ok_or_else(|| {
        AppError::upload_rejected(format!("{}: missing file extension", file.file_name))
    })?;
    if !config.allows(&extension) {
        return Err(AppError::upload_rejected(format!(
            "{}: extension .{} is not allowed",
            file.file_name, extension
        )));
    }

    let size = file.data.len() as u64;
    if let Some(max) = config.max_bytes() {
        if size > max {
            return Err(AppError::upload_rejected(format!(
                "{}: exceeds {} MB",
                file.file_name, config.max_file_size_mb
            )));
        }
    }

    let file_name = format!("{}.{}", Uuid::now_v7().simple(), extension);
    let path = directory.join(&file_name);

    let mut handle = tokio::fs::File::create(&path).await?;
    handle.write_all(&file.data).await?;
    handle.flush().await?;

    Ok(UploadResult {
        url: format!("{}/{}/{}", base_url, folder.relative, file_name),
        path: path.to_string_lossy().into_owned(),
        file_name,
        original_name: file.file_name,
        content_type: file.content_type,
        size,
    })
}

/// `YYYY/MM/DD` folder of one calendar day.
#[derive(Debug, Clone)]
struct DateFolder {
    parts: [String; 3],
    relative: String,
}

impl DateFolder {
    fn new(date: NaiveDate) -> Self {
        let parts = [
            format!("{:04}", date.year()),
            format!("{:02}", date.month()),
            format!("{:02}", date.day()),
        ];
        let relative = parts.join("/");
        Self { parts, relative }
    }

    fn under(&self, root: &Path) -> PathBuf {
        self.parts.iter().fold(root.to_path_buf(), |path, part| path.join(part))
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(normalize_extension)
        .filter(|ext| !ext.is_empty())
}
