use crate::auth::Uploader;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::parse_upload_request;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use intake_core::models::{FileUploadResponse, FormOptionsResponse, UploadConfigResponse};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/upload/",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Field `file` plus project_name, hypothesis, data_source, collection_method, \
            workflow_type and the optional experiment_id, date_range_start, date_range_end, \
            research_phase, privacy_level, processing_requirements (comma-separated)"),
    params(
        ("X-Forwarded-Email" = Option<String>, Header, description = "Uploader identity set by the fronting proxy")
    ),
    responses(
        (status = 200, description = "File and metadata stored", body = FileUploadResponse),
        (status = 400, description = "Invalid metadata, file type or form", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    uploader: Uploader,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FileUploadResponse>, HttpAppError> {
    let multipart = multipart?;
    let request = parse_upload_request(
        multipart,
        uploader.into_inner(),
        state.config.max_file_size_mb(),
    )
    .await?;

    let response = state.upload.process_upload(request).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/upload/config",
    tag = "upload",
    responses(
        (status = 200, description = "Upload limits and destination", body = UploadConfigResponse)
    )
)]
pub async fn get_upload_config(State(state): State<Arc<AppState>>) -> Json<UploadConfigResponse> {
    Json(state.upload.upload_config())
}

#[utoipa::path(
    get,
    path = "/upload/options",
    tag = "upload",
    responses(
        (status = 200, description = "Values for every form dropdown", body = FormOptionsResponse)
    )
)]
pub async fn get_form_options() -> Json<FormOptionsResponse> {
    Json(FormOptionsResponse::build())
}
