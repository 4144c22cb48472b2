//! Multipart parsing for the upload form

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use intake_core::{AppError, MetadataForm};

use crate::services::upload::{ReceivedFile, UploadRequest};

/// Name of the multipart field carrying the file
pub const FILE_FIELD: &str = "file";

/// Upload form as read off the wire, nothing validated yet
#[derive(Debug, Default)]
pub struct UploadForm {
    pub metadata: MetadataForm,
    pub file: Option<ReceivedFile>,
}

/// Read every part of the upload form. Only one field named "file" is accepted;
/// unknown text fields are ignored.
pub async fn extract_upload_form(
    mut multipart: Multipart,
    max_file_size_mb: u64,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size_mb))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == FILE_FIELD {
            if form.file.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let original_filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, max_file_size_mb))?;

            form.file = Some(ReceivedFile {
                original_filename,
                data,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| multipart_error(e, max_file_size_mb))?;
        if !set_form_field(&mut form.metadata, &field_name, value) {
            tracing::debug!(field = %field_name, "Ignoring unknown upload form field");
        }
    }

    Ok(form)
}

/// Parse the multipart body into a validated upload request.
///
/// The file part must be present; then every metadata rule runs. Nothing here touches
/// storage.
pub async fn parse_upload_request(
    multipart: Multipart,
    uploader: String,
    max_file_size_mb: u64,
) -> Result<UploadRequest, AppError> {
    let form = extract_upload_form(multipart, max_file_size_mb).await?;

    let file = form
        .file
        .ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    let metadata = form.metadata.into_metadata()?;

    Ok(UploadRequest {
        file,
        metadata,
        uploader,
    })
}

/// Store a text field on the form. Returns false for names the form does not know.
fn set_form_field(form: &mut MetadataForm, name: &str, value: String) -> bool {
    match name {
        "project_name" => form.project_name = value,
        "hypothesis" => form.hypothesis = value,
        "data_source" => form.data_source = value,
        "collection_method" => form.collection_method = value,
        "workflow_type" => form.workflow_type = value,
        "experiment_id" => form.experiment_id = Some(value),
        "date_range_start" => form.date_range_start = Some(value),
        "date_range_end" => form.date_range_end = Some(value),
        "research_phase" => form.research_phase = Some(value),
        "privacy_level" => form.privacy_level = Some(value),
        "processing_requirements" => form.processing_requirements = Some(value),
        _ => return false,
    }
    true
}

/// A body cut off by the request size limit is reported as an oversized file.
fn multipart_error(err: MultipartError, max_file_size_mb: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileSizeExceeded {
            max_mb: max_file_size_mb,
        }
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_form_field() {
        let mut form = MetadataForm::default();
        assert!(set_form_field(&mut form, "project_name", "Acme".to_string()));
        assert!(set_form_field(&mut form, "privacy_level", "internal".to_string()));
        assert!(!set_form_field(&mut form, "comment", "hi".to_string()));

        assert_eq!(form.project_name, "Acme");
        assert_eq!(form.privacy_level.as_deref(), Some("internal"));
        assert!(form.research_phase.is_none());
    }
}
