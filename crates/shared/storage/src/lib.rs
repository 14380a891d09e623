//! File storage for uploaded content.
//!
//! Validates and writes batches of incoming files concurrently under a
//! dated folder tree, all-or-nothing per batch.

pub mod uploader;

pub use uploader::{upload_files, IncomingFile, UploadConfig, UploadResult};
