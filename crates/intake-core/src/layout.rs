//! Storage layout derivation
//!
//! Pure functions that turn a project name, workflow type, client filename and the
//! request instant into the folder, stored filename and sidecar filename of an upload.
//! Nothing here touches storage.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

use crate::models::WorkflowType;

static NON_FOLDER_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s-]").unwrap_or_else(|e| panic!("invalid folder charset pattern: {}", e))
});

static SEPARATOR_RUNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-\s]+").unwrap_or_else(|e| panic!("invalid separator pattern: {}", e))
});

/// Reduce a project name to a folder-safe, lowercase path segment.
///
/// Characters outside word characters, whitespace and hyphens are dropped, the result is
/// trimmed, and every run of whitespace or hyphens becomes a single hyphen.
///
/// ```
/// use intake_core::layout::sanitize_project_name;
///
/// assert_eq!(sanitize_project_name("Acme Corp"), "acme-corp");
/// assert_eq!(sanitize_project_name("  Gene -- Study  "), "gene-study");
/// ```
pub fn sanitize_project_name(name: &str) -> String {
    let stripped = NON_FOLDER_CHARS.replace_all(name, "");
    let collapsed = SEPARATOR_RUNS.replace_all(stripped.trim(), "-");
    collapsed.to_lowercase()
}

/// Split a filename at its last `.` into base name and extension.
/// An empty extension (`"notes."`) counts as no extension.
pub fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((base, ext)) if !ext.is_empty() => (base, Some(ext)),
        Some((base, _)) => (base, None),
        None => (filename, None),
    }
}

/// Drop any directory components a client put in its filename.
pub fn client_file_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw)
}

/// Date folder segment (`YYYY-MM-DD`)
pub fn date_segment(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Derives folder and file names under a fixed storage root.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: String,
}

impl StorageLayout {
    pub fn new(root: impl Into<String>) -> Self {
        let root: String = root.into();
        let trimmed = root.trim_end_matches('/');
        StorageLayout {
            root: if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            },
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// `{root}/{sanitized project}`
    pub fn project_folder(&self, project_name: &str) -> String {
        join(&self.root, &sanitize_project_name(project_name))
    }

    /// `{root}/{sanitized project}/{YYYY-MM-DD}` for an explicit date
    pub fn dated_folder(&self, project_name: &str, date: NaiveDate) -> String {
        format!(
            "{}/{}",
            self.project_folder(project_name),
            date_segment(date)
        )
    }

    /// Folder an upload received at `now` lands in
    pub fn folder_path(&self, project_name: &str, now: DateTime<Utc>) -> String {
        self.dated_folder(project_name, now.date_naive())
    }

    /// `{base}_{workflow}_{YYYYMMDD_HHMMSS}[.{ext}]`
    ///
    /// Two uploads of the same name and workflow within the same second produce the same
    /// stored filename.
    pub fn stored_filename(
        &self,
        original_filename: &str,
        workflow: WorkflowType,
        now: DateTime<Utc>,
    ) -> String {
        let name = client_file_name(original_filename);
        let (base, ext) = split_extension(name);
        let stamp = now.format("%Y%m%d_%H%M%S");

        match ext {
            Some(ext) => format!("{}_{}_{}.{}", base, workflow.as_str(), stamp, ext),
            None => format!("{}_{}_{}", base, workflow.as_str(), stamp),
        }
    }

    /// `metadata_{stored base}.json`
    pub fn sidecar_filename(&self, stored_filename: &str) -> String {
        let (base, _) = split_extension(stored_filename);
        format!("metadata_{}.json", base)
    }

    /// Full path of the sidecar belonging to a stored file path
    pub fn metadata_path_for(&self, file_path: &str) -> String {
        match file_path.rsplit_once('/') {
            Some((folder, file)) => join(folder, &self.sidecar_filename(file)),
            None => self.sidecar_filename(file_path),
        }
    }
}

fn join(folder: &str, name: &str) -> String {
    if folder.ends_with('/') {
        format!("{}{}", folder, name)
    } else {
        format!("{}/{}", folder, name)
    }
}
