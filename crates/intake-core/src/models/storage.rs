//! Storage-facing views of stored files and folders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Metadata of a single stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileInfo {
    pub path: String,
    pub size_bytes: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

/// One child of a listed folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DirectoryEntry {
    pub path: String,
    pub name: String,
    pub is_directory: bool,
    pub size_bytes: Option<u64>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl DirectoryEntry {
    pub fn file(path: String, size_bytes: u64, modified_at: Option<DateTime<Utc>>) -> Self {
        DirectoryEntry {
            name: entry_name(&path),
            path,
            is_directory: false,
            size_bytes: Some(size_bytes),
            modified_at,
        }
    }

    pub fn directory(path: String) -> Self {
        DirectoryEntry {
            name: entry_name(&path),
            path,
            is_directory: true,
            size_bytes: None,
            modified_at: None,
        }
    }
}

fn entry_name(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_from_path() {
        let file = DirectoryEntry::file("/Volumes/x/acme/a.csv".to_string(), 3, None);
        assert_eq!(file.name, "a.csv");
        assert!(!file.is_directory);

        let dir = DirectoryEntry::directory("/Volumes/x/acme/2024-01-15/".to_string());
        assert_eq!(dir.name, "2024-01-15");
        assert!(dir.is_directory);
        assert!(dir.size_bytes.is_none());
    }
}
