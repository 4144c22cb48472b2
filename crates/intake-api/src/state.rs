//! Application state shared by every handler.
//!
//! Built once at startup from `Config`; nothing in here is mutated afterwards.

use crate::services::upload::UploadService;
use intake_core::{Config, FileValidator, StorageLayout};
use intake_storage::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub upload: UploadService,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        let upload = UploadService::new(
            storage.clone(),
            StorageLayout::new(config.volume_path()),
            FileValidator::from_config(&config),
        );
        AppState {
            config,
            storage,
            upload,
        }
    }
}
