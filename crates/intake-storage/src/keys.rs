//! Shared path validation for storage backends.
//!
//! Every backend addresses objects by logical absolute path (`/Volumes/...`). Validation is
//! centralized here so all backends reject the same inputs.

use crate::traits::{StorageError, StorageResult};

/// Validate a logical path and return it without its leading `/`.
///
/// Rejects relative paths, `.`/`..` segments, empty segments and NUL bytes.
pub fn relative_path(path: &str) -> StorageResult<&str> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(StorageError::InvalidPath(format!(
            "Storage path must be absolute: {}",
            path
        )));
    };

    if path.contains('\0') {
        return Err(StorageError::InvalidPath(
            "Storage path contains invalid characters".to_string(),
        ));
    }

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Ok(rest);
    }

    for segment in rest.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(StorageError::InvalidPath(format!(
                "Storage path contains an invalid segment: {}",
                path
            )));
        }
    }

    Ok(rest)
}

/// Join a logical folder and a child name
pub fn child_path(folder: &str, name: &str) -> String {
    format!("{}/{}", folder.trim_end_matches('/'), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("/Volumes/a/b.csv").unwrap(), "Volumes/a/b.csv");
        assert_eq!(relative_path("/Volumes/a/").unwrap(), "Volumes/a");
        assert_eq!(relative_path("/").unwrap(), "");
    }

    #[test]
    fn test_invalid_paths_rejected() {
        for path in ["Volumes/a", "/Volumes/../etc", "/a//b", "/a/./b", "/a/b\0"] {
            assert!(
                matches!(relative_path(path), Err(StorageError::InvalidPath(_))),
                "{:?}",
                path
            );
        }
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("/Volumes/a/", "b.csv"), "/Volumes/a/b.csv");
        assert_eq!(child_path("/Volumes/a", "b.csv"), "/Volumes/a/b.csv");
    }
}
