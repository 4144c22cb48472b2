use crate::error::{ErrorResponse, HttpAppError, ValidatedQuery};
use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::NaiveDate;
use intake_core::models::{DirectoryEntry, FileInfo};
use intake_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFilesQuery {
    /// Project name as entered on the upload form
    pub project_name: String,
    /// Upload date (YYYY-MM-DD), defaults to today (UTC)
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileInfoQuery {
    /// Full storage path of the file
    pub path: String,
}

#[utoipa::path(
    get,
    path = "/upload/files",
    tag = "files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Entries of the project's date folder", body = Vec<DirectoryEntry>),
        (status = 400, description = "Invalid project name or date", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<ListFilesQuery>,
) -> Result<Json<Vec<DirectoryEntry>>, HttpAppError> {
    let date = query
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| {
                AppError::validation("date", format!("Date '{}' must use the YYYY-MM-DD format", d))
            })
        })
        .transpose()?;

    let entries = state
        .upload
        .list_project_files(&query.project_name, date)
        .await?;
    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/upload/files/info",
    tag = "files",
    params(FileInfoQuery),
    responses(
        (status = 200, description = "Size and modification time", body = FileInfo),
        (status = 400, description = "Path outside the storage root", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn file_info(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<FileInfoQuery>,
) -> Result<Json<FileInfo>, HttpAppError> {
    let info = state.upload.file_info(&query.path).await?;
    Ok(Json(info))
}
