//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use intake_core::{Config, StorageBackend};

/// Validate configuration, failing fast on anything that would break uploads.
/// Questionable but workable settings are logged as warnings.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() {
        if config.default_uploader() == "unknown" {
            tracing::warn!(
                "DEFAULT_UPLOADER is 'unknown' in production - uploads without X-Forwarded-Email cannot be attributed"
            );
        }

        if config.storage_backend() == StorageBackend::Local {
            tracing::warn!(
                local_storage_path = %config.local_storage_path(),
                "Local storage backend in production - files stay on this host"
            );
        }

        if config
            .s3_endpoint()
            .is_some_and(|endpoint| endpoint.starts_with("http://"))
        {
            tracing::warn!("S3_ENDPOINT uses plain HTTP in production");
        }
    }

    if config.max_file_size_mb() > 5 * 1024 {
        tracing::warn!(
            max_file_size_mb = config.max_file_size_mb(),
            "MAX_FILE_SIZE_MB is very high - whole files are buffered in memory"
        );
    }

    Ok(())
}
