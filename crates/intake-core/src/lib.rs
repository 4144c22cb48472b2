//! Intake Core Library
//!
//! This crate provides the domain models, validation rules, storage layout derivation,
//! error types and configuration shared by every intake component.

pub mod config;
pub mod databricks;
pub mod error;
pub mod layout;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use layout::StorageLayout;
pub use storage_types::StorageBackend;
pub use validation::{FileValidator, MetadataForm};
