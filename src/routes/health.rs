//! Health check and service index endpoints

use axum::Json;
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "pdf-form-editor",
    })
}

pub async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "PDF Form Editor API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "/api/pdf/upload",
            "list_pdfs": "/api/pdf/list",
            "get_pdf": "/api/pdf/{pdf_id}",
            "update_field": "/api/pdf/{pdf_id}/field",
            "download": "/api/pdf/{pdf_id}/download",
        }
    }))
}
