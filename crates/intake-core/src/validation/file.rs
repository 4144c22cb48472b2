//! File size and extension policy

use crate::config::{Config, BYTES_PER_MB};
use crate::error::AppError;

/// Checks an incoming file against the configured size ceiling and extension allow-list.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_mb: u64,
    max_bytes: u64,
    allowed: Vec<String>,
}

impl FileValidator {
    pub fn new(max_mb: u64, allowed: Vec<String>) -> Self {
        FileValidator {
            max_mb,
            max_bytes: max_mb.saturating_mul(BYTES_PER_MB),
            allowed: allowed.into_iter().map(|ext| ext.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_file_size_mb(), config.allowed_file_types().to_vec())
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// A file exactly at the ceiling passes; empty files are rejected.
    pub fn validate_size(&self, size_bytes: u64) -> Result<(), AppError> {
        if size_bytes == 0 {
            return Err(AppError::validation("file", "File is empty"));
        }
        if size_bytes > self.max_bytes {
            return Err(AppError::FileSizeExceeded {
                max_mb: self.max_mb,
            });
        }
        Ok(())
    }

    /// Returns the lowercase extension when it is allowed. A filename without `.` has an
    /// empty extension and is rejected unless the allow-list contains `""`.
    pub fn validate_extension(&self, filename: &str) -> Result<String, AppError> {
        let extension = file_extension(filename);
        if self.allowed.iter().any(|allowed| *allowed == extension) {
            Ok(extension)
        } else {
            Err(AppError::FileTypeRejected {
                extension,
                allowed: self.allowed.clone(),
            })
        }
    }

    /// Size first, then type. Returns the file format to record.
    pub fn validate(&self, filename: &str, size_bytes: u64) -> Result<String, AppError> {
        self.validate_size(size_bytes)?;
        self.validate_extension(filename)
    }
}

/// Lowercase text after the last `.`, or empty
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}
