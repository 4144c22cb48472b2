//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout. Failures read "timeout" or "not_ready: {error}".
async fn run_check<F, T, E>(timeout: Duration, f: F) -> Result<(), String>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(format!("not_ready: {}", e)),
        Err(_) => Err("timeout".to_string()),
    }
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - the storage root can be listed.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let root = state.upload.layout().root().to_string();
    let storage = state.storage.clone();

    match run_check(CHECK_TIMEOUT, async move { storage.list_folder(&root).await }).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "storage": "ready",
                "backend": state.storage.backend_type().to_string(),
            })),
        ),
        Err(status) => {
            tracing::error!(storage = %status, "Storage readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "storage": status,
                    "backend": state.storage.backend_type().to_string(),
                })),
            )
        }
    }
}
