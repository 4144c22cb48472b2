//! Error types module
//!
//! This module provides the core error type used throughout the intake gateway.
//! Every failure an upload can hit (metadata validation, file policy, storage) is a
//! variant of `AppError`, and each variant describes its own HTTP presentation through
//! the `ErrorMetadata` trait.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("File size exceeds maximum allowed size of {max_mb}MB")]
    FileSizeExceeded { max_mb: u64 },

    #[error("File type '.{extension}' is not allowed. Allowed types: {}", .allowed.join(", "))]
    FileTypeRejected {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// A storage step of the upload pipeline failed
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Collapses `validator` output into a single field-level error. When several fields fail,
/// the alphabetically first one is reported so the response is stable.
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = err.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first() {
            Some((field, errors)) => {
                let message = errors
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::Validation {
                    field: field.to_string(),
                    message,
                }
            }
            None => AppError::Validation {
                field: "request".to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Validation { .. } => (
            400,
            "VALIDATION_ERROR",
            false,
            Some("Correct the named field and resubmit the form"),
            false,
            LogLevel::Debug,
        ),
        AppError::FileSizeExceeded { .. } => (
            413,
            "FILE_SIZE_EXCEEDED",
            false,
            Some("Reduce file size or split the data into several files"),
            false,
            LogLevel::Warn,
        ),
        AppError::FileTypeRejected { .. } => (
            400,
            "FILE_TYPE_REJECTED",
            false,
            Some("Upload a file with one of the allowed extensions"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the path exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Storage(_) | AppError::UploadFailed(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Validation { .. } => "Validation",
            AppError::FileSizeExceeded { .. } => "FileSizeExceeded",
            AppError::FileTypeRejected { .. } => "FileTypeRejected",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Storage(_) => "Storage",
            AppError::UploadFailed(_) => "UploadFailed",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Name of the offending form field, for validation failures
    pub fn field(&self) -> Option<&str> {
        match self {
            AppError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation { field, message } => format!("{}: {}", field, message),
            AppError::FileSizeExceeded { .. } | AppError::FileTypeRejected { .. } => {
                self.to_string()
            }
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            // Storage failures carry the backend's description; the caller needs it to
            // tell a permissions problem from an outage.
            AppError::Storage(ref msg) => format!("Storage operation failed: {}", msg),
            AppError::UploadFailed(ref msg) => format!("Upload failed: {}", msg),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_error_metadata_validation() {
        let err = AppError::validation("project_name", "contains invalid characters");
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_recoverable());
        assert_eq!(
            err.client_message(),
            "project_name: contains invalid characters"
        );
        assert_eq!(err.field(), Some("project_name"));
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_file_size_exceeded() {
        let err = AppError::FileSizeExceeded { max_mb: 100 };
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "FILE_SIZE_EXCEEDED");
        assert!(err.client_message().contains("100MB"));
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_file_type_rejected() {
        let err = AppError::FileTypeRejected {
            extension: "exe".to_string(),
            allowed: vec!["csv".to_string(), "txt".to_string()],
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(
            err.client_message(),
            "File type '.exe' is not allowed. Allowed types: csv, txt"
        );
    }

    #[test]
    fn test_error_metadata_storage() {
        let err = AppError::Storage("connection reset".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.is_recoverable());
        assert!(err.is_sensitive());
        assert_eq!(
            err.client_message(),
            "Storage operation failed: connection reset"
        );
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_upload_failed() {
        let err = AppError::UploadFailed("connection reset".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Upload failed: connection reset");
        assert_eq!(err.error_type(), "UploadFailed");
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("/Volumes/x/a.csv".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.suggested_action(), Some("Verify the path exists"));
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "must not be empty"))]
        zeta: String,
        #[validate(length(min = 1, message = "must not be empty"))]
        alpha: String,
    }

    #[test]
    fn test_validation_errors_report_first_field_alphabetically() {
        let sample = Sample {
            zeta: String::new(),
            alpha: String::new(),
        };
        let err: AppError = sample.validate().unwrap_err().into();
        match err {
            AppError::Validation { field, message } => {
                assert_eq!(field, "alpha");
                assert_eq!(message, "must not be empty");
            }
            other => panic!("Expected Validation variant, got {:?}", other),
        }
    }
}
