//! Route configuration and setup.
//!
//! Upload and file routes live here; health checks in [health](health).

mod health;

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use intake_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for the metadata fields and multipart framing on top of the file itself
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Bodies past this limit fail while the multipart stream is read and surface as a
    // FILE_SIZE_EXCEEDED error rather than a bare 413.
    let body_limit = usize::try_from(config.max_file_size_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);
    tracing::info!(body_limit_bytes = body_limit, "Request body limit set");

    let app = public_routes()
        .merge(upload_routes())
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Health probes and the OpenAPI document
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

fn upload_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload/", post(handlers::upload::upload_file))
        .route("/upload", post(handlers::upload::upload_file))
        .route("/upload/config", get(handlers::upload::get_upload_config))
        .route("/upload/options", get(handlers::upload::get_form_options))
        .route("/upload/files", get(handlers::files::list_files))
        .route("/upload/files/info", get(handlers::files::file_info))
}
