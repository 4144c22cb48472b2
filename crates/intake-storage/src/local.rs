use crate::keys::{child_path, relative_path};
use crate::traits::{FolderOutcome, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use intake_core::models::{DirectoryEntry, FileInfo};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Logical paths are mapped below `base_path`: `/Volumes/intake/x.csv` is stored at
/// `{base_path}/Volumes/intake/x.csv`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/intake")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a logical path to a filesystem path below the base directory
    fn to_fs_path(&self, path: &str) -> StorageResult<PathBuf> {
        let relative = relative_path(path)?;
        Ok(self.base_path.join(relative))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

fn modified_at(metadata: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

#[async_trait]
impl Storage for LocalStorage {
    async fn ensure_folder(&self, path: &str) -> StorageResult<FolderOutcome> {
        let fs_path = self.to_fs_path(path)?;

        match fs::metadata(&fs_path).await {
            Ok(meta) if meta.is_dir() => return Ok(FolderOutcome::AlreadyExists),
            Ok(_) => {
                return Err(StorageError::InvalidPath(format!(
                    "{} exists and is not a folder",
                    path
                )))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::IoError(e)),
        }

        fs::create_dir_all(&fs_path).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create folder {}: {}",
                fs_path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %path, "Local storage folder created");
        Ok(FolderOutcome::Created)
    }

    async fn write_blob(&self, path: &str, data: Bytes, overwrite: bool) -> StorageResult<()> {
        let fs_path = self.to_fs_path(path)?;
        let size = data.len();

        self.ensure_parent_dir(&fs_path).await?;

        let start = std::time::Instant::now();

        let mut options = fs::OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(&fs_path).await.map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                StorageError::AlreadyExists(path.to_string())
            } else {
                StorageError::WriteFailed(format!(
                    "Failed to create file {}: {}",
                    fs_path.display(),
                    e
                ))
            }
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to write file {}: {}",
                fs_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to sync file {}: {}",
                fs_path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %fs_path.display(),
            key = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(())
    }

    async fn read_metadata(&self, path: &str) -> StorageResult<FileInfo> {
        let fs_path = self.to_fs_path(path)?;

        let metadata = match fs::metadata(&fs_path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to stat {}: {}",
                    fs_path.display(),
                    e
                )))
            }
        };

        if metadata.is_dir() {
            return Err(StorageError::InvalidPath(format!("{} is a folder", path)));
        }

        Ok(FileInfo {
            path: path.to_string(),
            size_bytes: metadata.len(),
            modified_at: modified_at(&metadata),
        })
    }

    async fn list_folder(&self, path: &str) -> StorageResult<Vec<DirectoryEntry>> {
        let fs_path = self.to_fs_path(path)?;

        let mut dir = match fs::read_dir(&fs_path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to list {}: {}",
                    fs_path.display(),
                    e
                )))
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let logical = child_path(path, &name);
            let metadata = entry.metadata().await?;

            if metadata.is_dir() {
                entries.push(DirectoryEntry::directory(logical));
            } else {
                entries.push(DirectoryEntry::file(
                    logical,
                    metadata.len(),
                    modified_at(&metadata),
                ));
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let fs_path = self.to_fs_path(path)?;
        match fs::metadata(&fs_path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
