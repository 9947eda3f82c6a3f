//! Route modules for the PDF form editor

pub mod fields;
pub mod health;
pub mod pdf;

use axum::Router;

use crate::state::AppState;

/// All `/api/pdf` routes
pub fn api_router() -> Router<AppState> {
    Router::new().merge(pdf::router()).merge(fields::router())
}
