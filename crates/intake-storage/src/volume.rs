//! Remote volume storage over the Databricks Files REST API.
//!
//! Endpoints used:
//! - `PUT  /api/2.0/fs/files{path}?overwrite=` upload a file
//! - `HEAD /api/2.0/fs/files{path}` file metadata
//! - `HEAD /api/2.0/fs/directories{path}` directory existence
//! - `PUT  /api/2.0/fs/directories{path}` create a directory (and its parents)
//! - `GET  /api/2.0/fs/directories{path}` list directory contents, paginated

use crate::keys::relative_path;
use crate::traits::{FolderOutcome, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use intake_core::models::{DirectoryEntry, FileInfo};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const FILES_API: &str = "/api/2.0/fs/files";
const DIRECTORIES_API: &str = "/api/2.0/fs/directories";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Characters left as-is in a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Deserialize)]
struct ListDirectoryResponse {
    #[serde(default)]
    contents: Vec<ListedEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListedEntry {
    path: String,
    #[serde(default)]
    is_directory: bool,
    file_size: Option<u64>,
    /// Milliseconds since the epoch
    last_modified: Option<i64>,
}

/// Storage backed by a remote volume reached through the Files REST API
#[derive(Clone)]
pub struct VolumeStorage {
    client: Client,
    host: String,
    token: String,
}

impl VolumeStorage {
    /// Create a new VolumeStorage instance
    ///
    /// # Arguments
    /// * `host` - Workspace URL (e.g., "https://example.cloud.databricks.com"); `https://` is
    ///   assumed when no scheme is given
    /// * `token` - Bearer token used for every request
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> StorageResult<Self> {
        let host: String = host.into();
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(StorageError::ConfigError(
                "Volume host must not be empty".to_string(),
            ));
        }
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(VolumeStorage {
            client,
            host,
            token: token.into(),
        })
    }

    fn url(&self, api: &str, path: &str) -> StorageResult<String> {
        let relative = relative_path(path)?;
        let encoded: Vec<String> = relative
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect();
        Ok(format!("{}{}/{}", self.host, api, encoded.join("/")))
    }

    async fn head(&self, url: &str) -> StorageResult<Response> {
        self.client
            .head(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }
}

/// Turn an unexpected response into an error carrying status and body
async fn failure(response: Response, what: &str) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if body.is_empty() {
        format!("{} returned {}", what, status)
    } else {
        format!("{} returned {}: {}", what, status, body)
    }
}

fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

#[async_trait]
impl Storage for VolumeStorage {
    async fn ensure_folder(&self, path: &str) -> StorageResult<FolderOutcome> {
        let url = self.url(DIRECTORIES_API, path)?;

        let response = self.head(&url).await?;
        match response.status() {
            status if status.is_success() => return Ok(FolderOutcome::AlreadyExists),
            StatusCode::NOT_FOUND => {}
            _ => {
                return Err(StorageError::BackendError(
                    failure(response, "Directory lookup").await,
                ))
            }
        }

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        if response.status().is_success() {
            tracing::debug!(path = %path, "Volume folder created");
            Ok(FolderOutcome::Created)
        } else {
            Err(StorageError::WriteFailed(
                failure(response, "Directory creation").await,
            ))
        }
    }

    async fn write_blob(&self, path: &str, data: Bytes, overwrite: bool) -> StorageResult<()> {
        let url = self.url(FILES_API, path)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .query(&[("overwrite", overwrite)])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    path = %path,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Volume write failed"
                );
                StorageError::WriteFailed(e.to_string())
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::CONFLICT => return Err(StorageError::AlreadyExists(path.to_string())),
            _ => {
                let message = failure(response, "File upload").await;
                tracing::error!(
                    error = %message,
                    path = %path,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Volume write failed"
                );
                return Err(StorageError::WriteFailed(message));
            }
        }

        tracing::info!(
            path = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Volume write successful"
        );

        Ok(())
    }

    async fn read_metadata(&self, path: &str) -> StorageResult<FileInfo> {
        let url = self.url(FILES_API, path)?;
        let response = self.head(&url).await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(StorageError::NotFound(path.to_string())),
            _ => {
                return Err(StorageError::ReadFailed(
                    failure(response, "File metadata").await,
                ))
            }
        }

        let headers = response.headers();
        let size_bytes = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let modified_at = headers
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(FileInfo {
            path: path.to_string(),
            size_bytes,
            modified_at,
        })
    }

    async fn list_folder(&self, path: &str) -> StorageResult<Vec<DirectoryEntry>> {
        let url = self.url(DIRECTORIES_API, path)?;
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).bearer_auth(&self.token);
            if let Some(ref token) = page_token {
                request = request.query(&[("page_token", token)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| StorageError::BackendError(e.to_string()))?;

            match response.status() {
                status if status.is_success() => {}
                StatusCode::NOT_FOUND => return Ok(Vec::new()),
                _ => {
                    return Err(StorageError::ReadFailed(
                        failure(response, "Directory listing").await,
                    ))
                }
            }

            let page: ListDirectoryResponse = response
                .json()
                .await
                .map_err(|e| StorageError::ReadFailed(format!("Invalid listing: {}", e)))?;

            for item in page.contents {
                let entry = if item.is_directory {
                    DirectoryEntry::directory(item.path)
                } else {
                    DirectoryEntry::file(
                        item.path,
                        item.file_size.unwrap_or(0),
                        item.last_modified.and_then(millis_to_utc),
                    )
                };
                entries.push(entry);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let url = self.url(FILES_API, path)?;
        let response = self.head(&url).await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(StorageError::BackendError(
                failure(response, "File lookup").await,
            )),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Volume
    }
}

#[cfg(all(test, feature = "storage-volume"))]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_url_encodes_segments() {
        let storage = VolumeStorage::new("example.cloud.databricks.com/", "t").unwrap();
        assert_eq!(
            storage.url(FILES_API, "/Volumes/main/My Data/a b.csv").unwrap(),
            "https://example.cloud.databricks.com/api/2.0/fs/files/Volumes/main/My%20Data/a%20b.csv"
        );
        assert!(storage.url(FILES_API, "/Volumes/../x").is_err());
    }

    #[tokio::test]
    async fn test_write_blob_sends_overwrite_flag() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/2.0/fs/files/Volumes/main/acme/a.csv")
            .match_query(Matcher::UrlEncoded("overwrite".into(), "true".into()))
            .match_header("authorization", "Bearer secret")
            .match_body("a,b\n1,2\n")
            .with_status(204)
            .create_async()
            .await;

        let storage = VolumeStorage::new(server.url(), "secret").unwrap();
        storage
            .write_blob("/Volumes/main/acme/a.csv", Bytes::from_static(b"a,b\n1,2\n"), true)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_blob_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/api/2.0/fs/files/Volumes/main/a.csv")
            .match_query(Matcher::UrlEncoded("overwrite".into(), "false".into()))
            .with_status(409)
            .create_async()
            .await;

        let storage = VolumeStorage::new(server.url(), "secret").unwrap();
        let result = storage
            .write_blob("/Volumes/main/a.csv", Bytes::from_static(b"x"), false)
            .await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_write_blob_failure_carries_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/api/2.0/fs/files/Volumes/main/a.csv")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("PERMISSION_DENIED")
            .create_async()
            .await;

        let storage = VolumeStorage::new(server.url(), "secret").unwrap();
        match storage
            .write_blob("/Volumes/main/a.csv", Bytes::from_static(b"x"), true)
            .await
        {
            Err(StorageError::WriteFailed(msg)) => assert!(msg.contains("PERMISSION_DENIED")),
            other => panic!("Expected WriteFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ensure_folder_existing_and_created() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("HEAD", "/api/2.0/fs/directories/Volumes/main/old")
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("HEAD", "/api/2.0/fs/directories/Volumes/main/new")
            .with_status(404)
            .create_async()
            .await;
        let create = server
            .mock("PUT", "/api/2.0/fs/directories/Volumes/main/new")
            .with_status(200)
            .create_async()
            .await;

        let storage = VolumeStorage::new(server.url(), "secret").unwrap();
        assert_eq!(
            storage.ensure_folder("/Volumes/main/old").await.unwrap(),
            FolderOutcome::AlreadyExists
        );
        assert_eq!(
            storage.ensure_folder("/Volumes/main/new").await.unwrap(),
            FolderOutcome::Created
        );
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_metadata() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("HEAD", "/api/2.0/fs/files/Volumes/main/a.csv")
            .with_status(200)
            .with_header("last-modified", "Mon, 15 Jan 2024 10:30:00 GMT")
            .create_async()
            .await;
        server
            .mock("HEAD", "/api/2.0/fs/files/Volumes/main/missing.csv")
            .with_status(404)
            .create_async()
            .await;

        let storage = VolumeStorage::new(server.url(), "secret").unwrap();
        let info = storage.read_metadata("/Volumes/main/a.csv").await.unwrap();
        assert_eq!(info.path, "/Volumes/main/a.csv");
        assert_eq!(
            info.modified_at.unwrap().to_rfc3339(),
            "2024-01-15T10:30:00+00:00"
        );

        let result = storage.read_metadata("/Volumes/main/missing.csv").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert!(!storage.exists("/Volumes/main/missing.csv").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_folder_follows_pages() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/2.0/fs/directories/Volumes/main/acme/2024-01-15")
            .match_query(Matcher::Missing)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"contents":[{"path":"/Volumes/main/acme/2024-01-15/b.csv","is_directory":false,"file_size":3,"last_modified":1705314600000,"name":"b.csv"}],"next_page_token":"p2"}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/api/2.0/fs/directories/Volumes/main/acme/2024-01-15")
            .match_query(Matcher::UrlEncoded("page_token".into(), "p2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"contents":[{"path":"/Volumes/main/acme/2024-01-15/a.json","is_directory":false,"file_size":2,"name":"a.json"}]}"#,
            )
            .create_async()
            .await;

        let storage = VolumeStorage::new(server.url(), "secret").unwrap();
        let entries = storage
            .list_folder("/Volumes/main/acme/2024-01-15")
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.json");
        assert_eq!(entries[1].size_bytes, Some(3));
        assert!(entries[1].modified_at.is_some());
    }

    #[tokio::test]
    async fn test_list_missing_folder_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/2.0/fs/directories/Volumes/main/nobody")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error_code":"NOT_FOUND"}"#)
            .create_async()
            .await;

        let storage = VolumeStorage::new(server.url(), "secret").unwrap();
        assert!(storage
            .list_folder("/Volumes/main/nobody")
            .await
            .unwrap()
            .is_empty());
    }
}
