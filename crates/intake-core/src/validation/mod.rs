//! Validation modules

pub mod file;
pub mod metadata;

pub use file::FileValidator;
pub use metadata::{validate_project_name, MetadataForm, ValidatedMetadata};
