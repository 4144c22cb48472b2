//! Storage setup and initialization

use anyhow::{Context, Result};
use intake_core::Config;
use intake_storage::{create_storage, Storage};
use std::sync::Arc;

/// Build the configured storage backend
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!(
        backend = %config.storage_backend(),
        databricks_profile = ?config.databricks_profile(),
        "Initializing storage..."
    );
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = ?storage.backend_type(),
        volume_path = %config.volume_path(),
        "Storage initialized successfully"
    );
    Ok(storage)
}
