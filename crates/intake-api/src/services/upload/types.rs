//! Types used by the upload service

use bytes::Bytes;
use intake_core::validation::ValidatedMetadata;

/// File part of the upload form, as received
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    /// Filename the client sent, directory components included
    pub original_filename: String,
    pub data: Bytes,
}

impl ReceivedFile {
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Everything the orchestrator needs for one upload. Metadata has already passed
/// validation by the time one of these exists.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: ReceivedFile,
    pub metadata: ValidatedMetadata,
    pub uploader: String,
}
