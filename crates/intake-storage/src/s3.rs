use crate::keys::relative_path;
use crate::traits::{FolderOutcome, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use intake_core::models::{DirectoryEntry, FileInfo};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, PutMode, PutPayload, Result as ObjectResult};

/// S3 storage implementation
///
/// Logical paths map to object keys without the leading `/`. Folders are implicit.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        // Credentials come from the standard AWS environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage { store, bucket })
    }

    fn object_path(path: &str) -> StorageResult<Path> {
        Ok(Path::from(relative_path(path)?))
    }

    fn logical_path(location: &Path) -> String {
        format!("/{}", location)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn ensure_folder(&self, path: &str) -> StorageResult<FolderOutcome> {
        relative_path(path)?;
        Ok(FolderOutcome::Implicit)
    }

    async fn write_blob(&self, path: &str, data: Bytes, overwrite: bool) -> StorageResult<()> {
        let location = Self::object_path(path)?;
        let size = data.len() as u64;
        let payload = PutPayload::from(data);
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = if overwrite {
            self.store.put(&location, payload).await
        } else {
            self.store
                .put_opts(&location, payload, PutMode::Create.into())
                .await
        };

        result.map_err(|e| match e {
            ObjectStoreError::AlreadyExists { .. } => StorageError::AlreadyExists(path.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %location,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 write failed"
                );
                StorageError::WriteFailed(other.to_string())
            }
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %location,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 write successful"
        );

        Ok(())
    }

    async fn read_metadata(&self, path: &str) -> StorageResult<FileInfo> {
        let location = Self::object_path(path)?;

        match self.store.head(&location).await {
            Ok(meta) => Ok(FileInfo {
                path: path.to_string(),
                size_bytes: meta.size,
                modified_at: Some(meta.last_modified),
            }),
            Err(ObjectStoreError::NotFound { .. }) => Err(StorageError::NotFound(path.to_string())),
            Err(e) => Err(StorageError::ReadFailed(e.to_string())),
        }
    }

    async fn list_folder(&self, path: &str) -> StorageResult<Vec<DirectoryEntry>> {
        let prefix = Self::object_path(path)?;
        let start = std::time::Instant::now();

        let listing = self
            .store
            .list_with_delimiter(Some(&prefix))
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        let mut entries: Vec<DirectoryEntry> = listing
            .common_prefixes
            .iter()
            .map(|p| DirectoryEntry::directory(Self::logical_path(p)))
            .chain(listing.objects.iter().map(|meta| {
                DirectoryEntry::file(
                    Self::logical_path(&meta.location),
                    meta.size,
                    Some(meta.last_modified),
                )
            }))
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = entries.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(entries)
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let location = Self::object_path(path)?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
