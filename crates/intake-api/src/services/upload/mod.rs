//! Upload orchestration
//!
//! validate file → ensure folder → write blob → write sidecar → build response

mod service;
mod types;

pub use service::UploadService;
pub use types::{ReceivedFile, UploadRequest};
