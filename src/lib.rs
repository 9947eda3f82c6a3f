//! PDF Form Editor
//!
//! Extracts AcroForm fields from uploaded PDFs into editable records and
//! rebuilds them as native fillable widgets.
//!
//! # Modules
//!
//! - `forms`: the extraction and regeneration engine over `lopdf`
//! - `db`: SQLite persistence for documents and field lists
//! - `routes`: the `/api/pdf` HTTP surface

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config().server.cors_origin.as_deref());
    let body_limit = state.config().upload.max_upload_bytes();

    Router::new()
        .route("/", get(routes::health::index))
        .route("/health", get(routes::health::health_check))
        .nest("/api/pdf", routes::api_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("Invalid CORS_ORIGIN, allowing any origin");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
