//! Upload service
//!
//! Runs one upload through a fixed, strictly sequential pipeline:
//! validate file → ensure folder → write blob → write sidecar → build response.
//! Any failure aborts the remaining steps. Nothing is rolled back: when the sidecar write
//! fails the stored file stays where it is and the orphaned path is logged.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use intake_core::models::{
    DirectoryEntry, FileInfo, FileUploadResponse, UploadConfigResponse, UploadInfo, UploadMetadata,
};
use intake_core::validation::validate_project_name;
use intake_core::{AppError, FileValidator, StorageLayout};
use intake_storage::{Storage, StorageError};

use super::types::UploadRequest;

/// Upload orchestrator plus the read-only views over what it stored
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn Storage>,
    layout: StorageLayout,
    validator: FileValidator,
}

impl UploadService {
    pub fn new(storage: Arc<dyn Storage>, layout: StorageLayout, validator: FileValidator) -> Self {
        Self {
            storage,
            layout,
            validator,
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Store a file and its metadata sidecar, stamped with the current time
    pub async fn process_upload(
        &self,
        request: UploadRequest,
    ) -> Result<FileUploadResponse, AppError> {
        self.process_upload_at(request, Utc::now()).await
    }

    /// Store a file and its metadata sidecar as if received at `now`.
    ///
    /// `now` feeds the date folder, the stored filename and the recorded timestamp, so all
    /// three always agree.
    pub async fn process_upload_at(
        &self,
        request: UploadRequest,
        now: DateTime<Utc>,
    ) -> Result<FileUploadResponse, AppError> {
        let UploadRequest {
            file,
            metadata,
            uploader,
        } = request;
        let size_bytes = file.size_bytes();
        let start = Instant::now();

        let file_format = self.validator.validate(&file.original_filename, size_bytes)?;

        let project_name = &metadata.research.project_name;
        let workflow = metadata.technical.workflow_type;
        let folder = self.layout.folder_path(project_name, now);
        let stored_filename = self
            .layout
            .stored_filename(&file.original_filename, workflow, now);
        let file_path = format!("{}/{}", folder, stored_filename);

        tracing::info!(
            original_filename = %file.original_filename,
            project = %project_name,
            workflow = %workflow,
            size_bytes,
            file_path = %file_path,
            "Processing upload"
        );

        let outcome = self.storage.ensure_folder(&folder).await.map_err(|e| {
            tracing::error!(error = %e, folder = %folder, "Failed to ensure upload folder");
            upload_failed(e)
        })?;
        tracing::debug!(folder = %folder, outcome = ?outcome, "Upload folder ready");

        // Same-second uploads of the same name collide; the later write wins.
        self.storage
            .write_blob(&file_path, file.data, true)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, file_path = %file_path, "Failed to write file");
                upload_failed(e)
            })?;

        let upload_metadata = UploadMetadata {
            upload_info: UploadInfo {
                timestamp: now,
                uploader,
                original_filename: file.original_filename,
                stored_filename,
                file_path: file_path.clone(),
                file_size_bytes: size_bytes,
                file_format,
            },
            technical_metadata: metadata.technical,
            research_metadata: metadata.research,
        };

        let metadata_path = self.layout.metadata_path_for(&file_path);
        let sidecar = serde_json::to_vec_pretty(&upload_metadata)?;

        if let Err(e) = self
            .storage
            .write_blob(&metadata_path, sidecar.into(), true)
            .await
        {
            tracing::error!(
                error = %e,
                orphaned_path = %file_path,
                metadata_path = %metadata_path,
                "Metadata sidecar write failed; stored file has no sidecar"
            );
            return Err(upload_failed(e));
        }

        tracing::info!(
            file_path = %file_path,
            metadata_path = %metadata_path,
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload stored"
        );

        Ok(FileUploadResponse::new(upload_metadata, metadata_path))
    }

    /// Entries of a project's date folder; `date` defaults to today (UTC).
    /// A folder that does not exist lists as empty.
    pub async fn list_project_files(
        &self,
        project_name: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<DirectoryEntry>, AppError> {
        let project_name = validate_project_name(project_name)?;
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let folder = self.layout.dated_folder(&project_name, date);

        let entries = self.storage.list_folder(&folder).await?;
        tracing::debug!(folder = %folder, count = entries.len(), "Listed project folder");
        Ok(entries)
    }

    pub async fn file_info(&self, path: &str) -> Result<FileInfo, AppError> {
        self.ensure_under_root(path)?;
        Ok(self.storage.read_metadata(path).await?)
    }

    pub async fn file_exists(&self, path: &str) -> Result<bool, AppError> {
        self.ensure_under_root(path)?;
        Ok(self.storage.exists(path).await?)
    }

    pub fn upload_config(&self) -> UploadConfigResponse {
        UploadConfigResponse {
            max_file_size_mb: self.validator.max_bytes() / (1024 * 1024),
            allowed_file_types: self.validator.allowed().to_vec(),
            volume_path: self.layout.root().to_string(),
            storage_backend: self.storage.backend_type(),
        }
    }

    /// Read paths only ever look inside the storage root.
    fn ensure_under_root(&self, path: &str) -> Result<(), AppError> {
        let root = self.layout.root();
        let inside = if root == "/" {
            path.starts_with('/')
        } else {
            path.strip_prefix(root)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        };
        if inside {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!(
                "Path must be inside the storage root {}",
                root
            )))
        }
    }
}

/// Storage failures inside the upload pipeline are reported as failed uploads; path and
/// lookup errors keep their own variants.
fn upload_failed(err: StorageError) -> AppError {
    match AppError::from(err) {
        AppError::Storage(msg) => AppError::UploadFailed(msg),
        other => other,
    }
}
