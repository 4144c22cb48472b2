//! Configuration module
//!
//! This module provides the gateway configuration: server settings, upload limits and
//! storage backend parameters. A `Config` is built once at startup and shared read-only.

use std::env;

use crate::databricks;
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8000;
const MAX_FILE_SIZE_MB: u64 = 100;
const ALLOWED_FILE_TYPES: &str = "csv,json,pdf,xlsx,txt";
const VOLUME_PATH: &str = "/Volumes/intake/storage";
const LOCAL_STORAGE_PATH: &str = "./data";
const DEFAULT_UPLOADER: &str = "unknown";

/// Bytes in one configured megabyte
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Uploader recorded when the request carries no identity header
    pub default_uploader: String,
}

/// Limits applied to every uploaded file
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub max_file_size_mb: u64,
    /// Lowercase extensions without the leading dot
    pub allowed_file_types: Vec<String>,
}

/// Storage backend selection and its connection parameters
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Logical root every project folder is created under
    pub volume_path: String,
    pub local_storage_path: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub databricks_host: Option<String>,
    pub databricks_token: Option<String>,
    /// CLI profile the host and token were read from, if any
    pub databricks_profile: Option<String>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadLimits,
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                default_uploader: DEFAULT_UPLOADER.to_string(),
            },
            upload: UploadLimits {
                max_file_size_mb: MAX_FILE_SIZE_MB,
                allowed_file_types: parse_file_types(ALLOWED_FILE_TYPES),
            },
            storage: StorageConfig {
                backend: StorageBackend::Local,
                volume_path: VOLUME_PATH.to_string(),
                local_storage_path: LOCAL_STORAGE_PATH.to_string(),
                s3_bucket: None,
                s3_region: None,
                s3_endpoint: None,
                aws_region: None,
                databricks_host: None,
                databricks_token: None,
                databricks_profile: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env` when present)
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server = ServerConfig {
            server_port: var("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            default_uploader: var("DEFAULT_UPLOADER")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_UPLOADER.to_string()),
        };

        let upload = UploadLimits {
            max_file_size_mb: var("MAX_FILE_SIZE_MB")
                .unwrap_or_else(|| MAX_FILE_SIZE_MB.to_string())
                .trim()
                .parse::<u64>()
                .unwrap_or(MAX_FILE_SIZE_MB),
            allowed_file_types: parse_file_types(
                &var("ALLOWED_FILE_TYPES").unwrap_or_else(|| ALLOWED_FILE_TYPES.to_string()),
            ),
        };

        let backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };

        let databricks_profile = var("DATABRICKS_CONFIG_PROFILE")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let mut databricks_host = var("DATABRICKS_HOST");
        let mut databricks_token = var("DATABRICKS_TOKEN");

        // Explicit DATABRICKS_HOST / DATABRICKS_TOKEN win over the profile's values.
        if let (StorageBackend::Volume, Some(profile)) =
            (backend, databricks_profile.as_deref())
        {
            let path = databricks::config_file_path(&var).ok_or_else(|| {
                anyhow::anyhow!(
                    "DATABRICKS_CONFIG_PROFILE is set but neither DATABRICKS_CONFIG_FILE nor HOME is set"
                )
            })?;
            let from_profile = databricks::load_profile(&path, profile)?;
            databricks_host = databricks_host.or(from_profile.host);
            databricks_token = databricks_token.or(from_profile.token);
        }

        let storage = StorageConfig {
            backend,
            volume_path: var("INTAKE_VOLUME_PATH")
                .or_else(|| var("DATABRICKS_VOLUME_PATH"))
                .map(|p| p.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| VOLUME_PATH.to_string()),
            local_storage_path: var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: var("AWS_REGION"),
            databricks_host,
            databricks_token,
            databricks_profile,
        };

        Ok(Config {
            server,
            upload,
            storage,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.upload.max_file_size_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB is too large ({}): the limit in bytes must fit in 64 bits",
                self.upload.max_file_size_mb
            ));
        }

        if self.upload.allowed_file_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_FILE_TYPES must list at least one extension"
            ));
        }

        if !self.storage.volume_path.starts_with('/') {
            return Err(anyhow::anyhow!(
                "INTAKE_VOLUME_PATH must be an absolute path (got '{}')",
                self.storage.volume_path
            ));
        }

        match self.storage.backend {
            StorageBackend::Local => {
                if self.storage.local_storage_path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() && self.storage.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Volume => {
                if self.storage.databricks_host.is_none() {
                    return Err(anyhow::anyhow!(
                        "DATABRICKS_HOST (or a DATABRICKS_CONFIG_PROFILE with a host) must be set when using volume storage backend"
                    ));
                }
                if self.storage.databricks_token.is_none() {
                    return Err(anyhow::anyhow!(
                        "DATABRICKS_TOKEN (or a DATABRICKS_CONFIG_PROFILE with a token) must be set when using volume storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.server.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.server.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.server.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.server.environment
    }

    pub fn default_uploader(&self) -> &str {
        &self.server.default_uploader
    }

    pub fn max_file_size_mb(&self) -> u64 {
        self.upload.max_file_size_mb
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.upload.max_file_size_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn allowed_file_types(&self) -> &[String] {
        &self.upload.allowed_file_types
    }

    pub fn volume_path(&self) -> &str {
        &self.storage.volume_path
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.storage.local_storage_path
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.storage.s3_bucket.as_deref()
    }

    /// S3 region, falling back to `AWS_REGION`
    pub fn s3_region(&self) -> Option<&str> {
        self.storage
            .s3_region
            .as_deref()
            .or(self.storage.aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.storage.s3_endpoint.as_deref()
    }

    pub fn databricks_host(&self) -> Option<&str> {
        self.storage.databricks_host.as_deref()
    }

    pub fn databricks_token(&self) -> Option<&str> {
        self.storage.databricks_token.as_deref()
    }

    pub fn databricks_profile(&self) -> Option<&str> {
        self.storage.databricks_profile.as_deref()
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_file_types(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server_port(), 8000);
        assert_eq!(config.max_file_size_mb(), 100);
        assert_eq!(config.max_file_size_bytes(), 100 * 1024 * 1024);
        assert_eq!(
            config.allowed_file_types(),
            &["csv", "json", "pdf", "xlsx", "txt"]
        );
        assert_eq!(config.volume_path(), "/Volumes/intake/storage");
        assert_eq!(config.storage_backend(), StorageBackend::Local);
        assert_eq!(config.default_uploader(), "unknown");
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_size_overflowing_bytes_rejected() {
        let huge = (u64::MAX / BYTES_PER_MB + 1).to_string();
        let config = Config::from_lookup(lookup(&[("MAX_FILE_SIZE_MB", huge.as_str())])).unwrap();
        assert_eq!(config.max_file_size_bytes(), u64::MAX);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("MAX_FILE_SIZE_MB is too large"));

        let largest = (u64::MAX / BYTES_PER_MB).to_string();
        let config =
            Config::from_lookup(lookup(&[("MAX_FILE_SIZE_MB", largest.as_str())])).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_types_are_normalized() {
        let config =
            Config::from_lookup(lookup(&[("ALLOWED_FILE_TYPES", " .CSV, Parquet ,,txt")])).unwrap();
        assert_eq!(config.allowed_file_types(), &["csv", "parquet", "txt"]);
    }

    #[test]
    fn test_invalid_max_size_falls_back_to_default() {
        let config = Config::from_lookup(lookup(&[("MAX_FILE_SIZE_MB", "lots")])).unwrap();
        assert_eq!(config.max_file_size_mb(), 100);
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let result = Config::from_lookup(lookup(&[("ENVIRONMENT", "production")]));
        assert!(result.is_err());

        let config = Config::from_lookup(lookup(&[
            ("APP_ENV", "prod"),
            ("CORS_ORIGINS", "https://intake.example.com"),
        ]))
        .unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_s3_backend_requires_bucket_and_region() {
        let config = Config::from_lookup(lookup(&[("STORAGE_BACKEND", "s3")])).unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "s3"),
            ("S3_BUCKET", "intake"),
            ("AWS_REGION", "eu-west-1"),
        ]))
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.s3_region(), Some("eu-west-1"));
    }

    #[test]
    fn test_volume_backend_requires_host_and_token() {
        let config = Config::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "volume"),
            ("DATABRICKS_HOST", "https://example.cloud.databricks.com"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_volume_credentials_from_profile() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("databrickscfg");
        std::fs::write(
            &cfg,
            "[intake]\nhost = https://intake.cloud.databricks.com\ntoken = dapi-intake\n",
        )
        .unwrap();
        let cfg = cfg.to_string_lossy().into_owned();

        let config = Config::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "volume"),
            ("DATABRICKS_CONFIG_PROFILE", "intake"),
            ("DATABRICKS_CONFIG_FILE", cfg.as_str()),
        ]))
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.databricks_host(),
            Some("https://intake.cloud.databricks.com")
        );
        assert_eq!(config.databricks_token(), Some("dapi-intake"));
        assert_eq!(config.databricks_profile(), Some("intake"));

        let config = Config::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "volume"),
            ("DATABRICKS_CONFIG_PROFILE", "intake"),
            ("DATABRICKS_CONFIG_FILE", cfg.as_str()),
            ("DATABRICKS_TOKEN", "dapi-explicit"),
        ]))
        .unwrap();
        assert_eq!(config.databricks_token(), Some("dapi-explicit"));
    }

    #[test]
    fn test_missing_profile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("databrickscfg");
        std::fs::write(&cfg, "[other]\nhost = https://x.cloud.databricks.com\n").unwrap();
        let cfg = cfg.to_string_lossy().into_owned();

        let result = Config::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "volume"),
            ("DATABRICKS_CONFIG_PROFILE", "intake"),
            ("DATABRICKS_CONFIG_FILE", cfg.as_str()),
        ]));
        assert!(result.is_err());

        // The profile is only read for the volume backend.
        let config = Config::from_lookup(lookup(&[
            ("DATABRICKS_CONFIG_PROFILE", "intake"),
            ("DATABRICKS_CONFIG_FILE", cfg.as_str()),
        ]))
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_databricks_volume_path_fallback() {
        let config = Config::from_lookup(lookup(&[(
            "DATABRICKS_VOLUME_PATH",
            "/Volumes/main/intake/storage/",
        )]))
        .unwrap();
        assert_eq!(config.volume_path(), "/Volumes/main/intake/storage");

        let config = Config::from_lookup(lookup(&[
            ("INTAKE_VOLUME_PATH", "/Volumes/a"),
            ("DATABRICKS_VOLUME_PATH", "/Volumes/b"),
        ]))
        .unwrap();
        assert_eq!(config.volume_path(), "/Volumes/a");
    }

    #[test]
    fn test_relative_volume_path_rejected() {
        let config =
            Config::from_lookup(lookup(&[("INTAKE_VOLUME_PATH", "Volumes/intake/")])).unwrap();
        assert_eq!(config.volume_path(), "Volumes/intake");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        assert!(Config::from_lookup(lookup(&[("STORAGE_BACKEND", "nfs")])).is_err());
    }
}
