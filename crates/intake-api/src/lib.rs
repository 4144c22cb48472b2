//! Intake API Library
//!
//! This crate provides the HTTP handlers, upload orchestration and application setup of
//! the intake gateway.

mod api_doc;
mod handlers;
mod telemetry;

pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;
pub mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::UploadService;
pub use state::AppState;
