use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ResearchMetadata, TechnicalMetadata};
use crate::storage_types::StorageBackend;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// Serializes UTC instants as ISO-8601 with microseconds and a literal `Z`,
/// e.g. `2024-01-15T10:30:00.000000Z`.
pub mod utc_micros {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Facts about one stored file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadInfo {
    #[serde(with = "utc_micros")]
    #[schema(value_type = String, format = DateTime, example = "2024-01-15T10:30:00.000000Z")]
    pub timestamp: DateTime<Utc>,
    pub uploader: String,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_path: String,
    pub file_size_bytes: u64,
    /// Lowercase extension of the original filename, empty when there is none
    pub file_format: String,
}

/// Exactly the content of the JSON sidecar written next to each stored file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadMetadata {
    pub upload_info: UploadInfo,
    pub technical_metadata: TechnicalMetadata,
    pub research_metadata: ResearchMetadata,
}

/// Response after successful file upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileUploadResponse {
    pub success: bool,
    pub message: String,
    pub upload_info: UploadInfo,
    pub research_metadata: ResearchMetadata,
    pub technical_metadata: TechnicalMetadata,
    pub metadata_file_path: String,
}

impl FileUploadResponse {
    pub fn new(metadata: UploadMetadata, metadata_file_path: String) -> Self {
        FileUploadResponse {
            success: true,
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            upload_info: metadata.upload_info,
            research_metadata: metadata.research_metadata,
            technical_metadata: metadata.technical_metadata,
            metadata_file_path,
        }
    }
}

/// Upload limits and destination, for clients building the form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadConfigResponse {
    pub max_file_size_mb: u64,
    pub allowed_file_types: Vec<String>,
    pub volume_path: String,
    pub storage_backend: StorageBackend,
}
