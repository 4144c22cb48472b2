//! Databricks CLI profiles
//!
//! The volume backend can take its workspace host and token from a named section of the
//! Databricks CLI config file (`~/.databrickscfg` unless `DATABRICKS_CONFIG_FILE` points
//! elsewhere):
//!
//! ```text
//! [intake]
//! host  = https://example.cloud.databricks.com
//! token = dapi...
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;

const CONFIG_FILE_NAME: &str = ".databrickscfg";

/// Credentials found in one profile section. Either key may be missing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DatabricksProfile {
    pub host: Option<String>,
    pub token: Option<String>,
}

impl std::fmt::Debug for DatabricksProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabricksProfile")
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Location of the CLI config file: `DATABRICKS_CONFIG_FILE`, else `$HOME/.databrickscfg`
/// (`USERPROFILE` on Windows).
pub fn config_file_path<F>(var: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(file) = var("DATABRICKS_CONFIG_FILE").filter(|f| !f.trim().is_empty()) {
        return Some(PathBuf::from(file.trim()));
    }
    var("HOME")
        .or_else(|| var("USERPROFILE"))
        .filter(|home| !home.trim().is_empty())
        .map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
}

/// Read `profile` from the config file at `path`.
pub fn load_profile(path: &Path, profile: &str) -> Result<DatabricksProfile, anyhow::Error> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read Databricks config file {}", path.display()))?;

    parse_profile(&contents, profile).ok_or_else(|| {
        anyhow::anyhow!(
            "Databricks profile '{}' not found in {}",
            profile,
            path.display()
        )
    })
}

/// Extract `host` and `token` from the `[profile]` section. `None` when the section does
/// not exist.
pub fn parse_profile(contents: &str, profile: &str) -> Option<DatabricksProfile> {
    let mut found = false;
    let mut in_section = false;
    let mut out = DatabricksProfile::default();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == profile;
            found |= in_section;
            continue;
        }

        if !in_section {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim().to_lowercase().as_str() {
            "host" => out.host = Some(value.to_string()),
            "token" => out.token = Some(value.to_string()),
            _ => {}
        }
    }

    found.then_some(out)
}
