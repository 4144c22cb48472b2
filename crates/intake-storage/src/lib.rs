//! Intake Storage Library
//!
//! This crate provides the storage abstraction and its implementations for the intake
//! gateway: the `Storage` trait plus local filesystem, S3 and remote volume backends.
//!
//! # Path format
//!
//! Every backend addresses objects by logical absolute path, the same string that ends
//! up in upload records:
//!
//! - `/Volumes/intake/storage/{project}/{YYYY-MM-DD}/{stored filename}`
//!
//! Paths must be absolute and must not contain `.` or `..` segments. Validation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
#[cfg(feature = "storage-volume")]
pub mod volume;

// Re-export commonly used types
pub use factory::create_storage;
pub use intake_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MockStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{FolderOutcome, Storage, StorageError, StorageResult};
#[cfg(feature = "storage-volume")]
pub use volume::VolumeStorage;
