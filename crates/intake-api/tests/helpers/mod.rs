//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p intake-api`.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use intake_api::setup::routes;
use intake_api::state::AppState;
use intake_core::Config;
use intake_storage::{LocalStorage, MockStorage, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const VOLUME_PATH: &str = "/Volumes/intake/storage";

/// Test application backed by in-memory storage
pub struct TestApp {
    pub server: TestServer,
    pub storage: MockStorage,
}

/// Test application backed by a local directory
pub struct LocalTestApp {
    pub server: TestServer,
    pub temp_dir: TempDir,
}

impl LocalTestApp {
    /// Where a logical storage path lands on disk
    pub fn disk_path(&self, logical_path: &str) -> PathBuf {
        self.temp_dir.path().join(logical_path.trim_start_matches('/'))
    }
}

/// 1 MB ceiling keeps oversized-file tests cheap.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.upload.max_file_size_mb = 1;
    config.upload.allowed_file_types = ["csv", "json", "pdf", "xlsx", "txt"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    config.storage.volume_path = VOLUME_PATH.to_string();
    config.server.default_uploader = "unknown".to_string();
    config
}

fn build_server(config: Config, storage: Arc<dyn Storage>) -> TestServer {
    let state = Arc::new(AppState::new(config, storage));
    let app = routes::setup_routes(&state.config, state.clone()).expect("Failed to build routes");
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}

pub fn setup_test_app() -> TestApp {
    let storage = MockStorage::new();
    let server = build_server(test_config(), Arc::new(storage.clone()));
    TestApp { server, storage }
}

pub async fn setup_local_test_app() -> LocalTestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage = LocalStorage::new(temp_dir.path())
        .await
        .expect("Failed to create local storage");
    let server = build_server(test_config(), Arc::new(storage));
    LocalTestApp { server, temp_dir }
}

/// Required metadata fields with valid values
pub fn metadata_form(workflow_type: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("project_name", "Acme Corp")
        .add_text("hypothesis", "Soil pH predicts crop yield")
        .add_text("data_source", "Field sensors")
        .add_text("collection_method", "Automated sampling")
        .add_text("workflow_type", workflow_type.to_string())
}

pub fn file_part(filename: &str, data: Vec<u8>) -> Part {
    Part::bytes(data)
        .file_name(filename.to_string())
        .mime_type("application/octet-stream")
}

/// Valid form plus a file
pub fn upload_form(filename: &str, data: Vec<u8>, workflow_type: &str) -> MultipartForm {
    metadata_form(workflow_type).add_part("file", file_part(filename, data))
}
