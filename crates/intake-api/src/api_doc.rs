//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use intake_core::models;
use intake_core::StorageBackend;

/// The OpenAPI document served at `/api/openapi.json`
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Research Intake API",
        version = "0.1.0",
        description = "Research data intake gateway. Accepts a file together with research and technical metadata, validates both, stores the file under a project and date folder and writes a JSON metadata sidecar next to it."
    ),
    paths(
        // Upload
        handlers::upload::upload_file,
        handlers::upload::get_upload_config,
        handlers::upload::get_form_options,
        // Stored files
        handlers::files::list_files,
        handlers::files::file_info,
    ),
    components(
        schemas(
            // Upload models
            models::FileUploadResponse,
            models::UploadInfo,
            models::UploadMetadata,
            models::UploadConfigResponse,
            StorageBackend,
            // Metadata models
            models::ResearchMetadata,
            models::DateRange,
            models::ResearchPhase,
            models::PrivacyLevel,
            models::TechnicalMetadata,
            models::WorkflowType,
            models::ProcessingRequirement,
            // Form options
            models::FormOptionsResponse,
            models::FormOption,
            // Storage views
            models::FileInfo,
            models::DirectoryEntry,
            // Error
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "upload", description = "File upload with research metadata, plus form configuration"),
        (name = "files", description = "Read-only views of stored files")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_upload_paths() {
        let spec = get_openapi_spec();
        for path in [
            "/upload/",
            "/upload/config",
            "/upload/options",
            "/upload/files",
            "/upload/files/info",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
