#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
#[cfg(feature = "storage-volume")]
use crate::VolumeStorage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use intake_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.s3_endpoint().map(String::from);

            let storage = S3Storage::new(bucket, region, endpoint)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(config.local_storage_path()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-volume")]
        StorageBackend::Volume => {
            let host = config.databricks_host().ok_or_else(|| {
                StorageError::ConfigError("DATABRICKS_HOST not configured".to_string())
            })?;
            let token = config.databricks_token().ok_or_else(|| {
                StorageError::ConfigError("DATABRICKS_TOKEN not configured".to_string())
            })?;

            let storage = VolumeStorage::new(host, token)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-volume"))]
        StorageBackend::Volume => Err(StorageError::ConfigError(
            "Volume storage backend not available (storage-volume feature not enabled)"
                .to_string(),
        )),
    }
}
