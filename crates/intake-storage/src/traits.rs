//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use intake_core::models::{DirectoryEntry, FileInfo};
use intake_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What `ensure_folder` found or did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderOutcome {
    /// The folder did not exist and was created
    Created,
    /// The folder was already there
    AlreadyExists,
    /// The backend has no real folders; they exist as soon as an object is written below them
    Implicit,
}

/// Storage abstraction trait
///
/// All storage backends (local filesystem, S3, remote volume) implement this trait so the
/// upload service never couples to transport details.
///
/// **Path format:** paths are logical absolute paths such as
/// `/Volumes/intake/storage/acme-corp/2024-01-15/data_csv_20240115_103000.csv`.
/// Paths containing `..` or `.` segments are rejected with `InvalidPath`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Make sure a folder exists. Idempotent: an existing folder is not an error.
    async fn ensure_folder(&self, path: &str) -> StorageResult<FolderOutcome>;

    /// Write a complete blob. With `overwrite = false` an existing object yields
    /// `StorageError::AlreadyExists`.
    async fn write_blob(&self, path: &str, data: Bytes, overwrite: bool) -> StorageResult<()>;

    /// Size and modification time of a stored file, `NotFound` if absent
    async fn read_metadata(&self, path: &str) -> StorageResult<FileInfo>;

    /// Direct children of a folder. A missing folder lists as empty.
    async fn list_folder(&self, path: &str) -> StorageResult<Vec<DirectoryEntry>>;

    /// Check if a file exists
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => AppError::NotFound(format!("File not found: {}", path)),
            StorageError::InvalidPath(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}
