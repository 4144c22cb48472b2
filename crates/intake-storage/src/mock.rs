//! Mock Storage implementation for testing

use crate::keys::{child_path, relative_path};
use crate::traits::{FolderOutcome, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use intake_core::models::{DirectoryEntry, FileInfo};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct MockState {
    files: BTreeMap<String, (Bytes, DateTime<Utc>)>,
    folders: BTreeSet<String>,
    /// Writes to paths ending with one of these suffixes fail
    failing_suffixes: Vec<String>,
    fail_folders: bool,
    writes: Vec<String>,
}

/// Mock storage implementation that stores files in memory
///
/// Behaves like a filesystem-backed store: folders are tracked explicitly and
/// `ensure_folder` reports `Created` or `AlreadyExists`.
#[derive(Clone, Default)]
pub struct MockStorage {
    state: Arc<Mutex<MockState>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not poison assertions made afterwards.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every write to a path ending with `suffix` fail with `WriteFailed`
    pub fn fail_writes_ending_with(&self, suffix: &str) {
        self.state().failing_suffixes.push(suffix.to_string());
    }

    /// Make every `ensure_folder` call fail
    pub fn fail_folder_creation(&self) {
        self.state().fail_folders = true;
    }

    /// Set a file in the mock storage
    pub fn set_file(&self, path: &str, data: impl Into<Bytes>) {
        self.state()
            .files
            .insert(path.to_string(), (data.into(), Utc::now()));
    }

    /// Check if a file exists in the mock storage
    pub fn has_file(&self, path: &str) -> bool {
        self.state().files.contains_key(path)
    }

    /// Get file data (for test assertions)
    pub fn get_file(&self, path: &str) -> Option<Bytes> {
        self.state().files.get(path).map(|(data, _)| data.clone())
    }

    /// Paths of every stored file, sorted
    pub fn file_paths(&self) -> Vec<String> {
        self.state().files.keys().cloned().collect()
    }

    /// Paths written, in call order
    pub fn writes(&self) -> Vec<String> {
        self.state().writes.clone()
    }

    pub fn has_folder(&self, path: &str) -> bool {
        self.state().folders.contains(path.trim_end_matches('/'))
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn ensure_folder(&self, path: &str) -> StorageResult<FolderOutcome> {
        relative_path(path)?;
        let mut state = self.state();
        if state.fail_folders {
            return Err(StorageError::BackendError(format!(
                "Injected folder failure for {}",
                path
            )));
        }
        if state.folders.insert(path.trim_end_matches('/').to_string()) {
            Ok(FolderOutcome::Created)
        } else {
            Ok(FolderOutcome::AlreadyExists)
        }
    }

    async fn write_blob(&self, path: &str, data: Bytes, overwrite: bool) -> StorageResult<()> {
        relative_path(path)?;
        let mut state = self.state();
        state.writes.push(path.to_string());

        if state.failing_suffixes.iter().any(|s| path.ends_with(s.as_str())) {
            return Err(StorageError::WriteFailed(format!(
                "Injected write failure for {}",
                path
            )));
        }
        if !overwrite && state.files.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }

        state.files.insert(path.to_string(), (data, Utc::now()));
        Ok(())
    }

    async fn read_metadata(&self, path: &str) -> StorageResult<FileInfo> {
        relative_path(path)?;
        self.state()
            .files
            .get(path)
            .map(|(data, modified)| FileInfo {
                path: path.to_string(),
                size_bytes: data.len() as u64,
                modified_at: Some(*modified),
            })
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn list_folder(&self, path: &str) -> StorageResult<Vec<DirectoryEntry>> {
        relative_path(path)?;
        let folder = path.trim_end_matches('/');
        let prefix = format!("{}/", folder);
        let state = self.state();

        let mut entries = Vec::new();
        let mut seen_dirs = BTreeSet::new();
        for (file_path, (data, modified)) in state.files.range(prefix.clone()..) {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    if seen_dirs.insert(dir.to_string()) {
                        entries.push(DirectoryEntry::directory(child_path(folder, dir)));
                    }
                }
                None => entries.push(DirectoryEntry::file(
                    file_path.clone(),
                    data.len() as u64,
                    Some(*modified),
                )),
            }
        }
        for dir in state.folders.iter() {
            if let Some(rest) = dir.strip_prefix(&prefix) {
                let name = rest.split('/').next().unwrap_or(rest);
                if !name.is_empty() && seen_dirs.insert(name.to_string()) {
                    entries.push(DirectoryEntry::directory(child_path(folder, name)));
                }
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        relative_path(path)?;
        Ok(self.state().files.contains_key(path))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
