//! Document API routes
//!
//! Upload, listing, raw content and regenerated download.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;

use crate::db::PdfSummary;
use crate::error::{AppError, Result};
use crate::forms::{self, FieldRecord};
use crate::state::AppState;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Create the document router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_pdf))
        .route("/list", get(list_pdfs))
        .route("/:pdf_id", get(get_pdf).delete(delete_pdf))
        .route("/:pdf_id/content", get(get_content))
        .route("/:pdf_id/download", get(download_pdf))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub pdf_id: String,
    pub filename: String,
    pub num_pages: i64,
    pub fields: Vec<FieldRecord>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PdfListResponse {
    pub pdfs: Vec<PdfSummary>,
}

#[derive(Debug, Serialize)]
pub struct PdfDetailResponse {
    pub pdf_id: String,
    pub filename: String,
    pub num_pages: i64,
    pub file_hash: String,
    pub fields: Vec<FieldRecord>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub pdf_id: String,
    pub content: String,
    pub content_type: &'static str,
}

/// Upload a PDF and extract its form fields
async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Upload is missing a filename".to_string()))?;
        upload = Some((filename, field.bytes().await?));
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("Missing 'file' part".to_string()))?;
    if !filename.to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::BadRequest("Only PDF files are allowed".to_string()));
    }

    let data = bytes.clone();
    let form = tokio::task::spawn_blocking(move || forms::extract_fields(&data)).await??;

    let doc = state.documents().create(&filename, &bytes, &form).await?;

    tracing::info!(
        pdf_id = %doc.id,
        filename = %doc.filename,
        fields = form.fields.len(),
        "Uploaded PDF"
    );

    Ok(Json(UploadResponse {
        message: format!("PDF uploaded successfully. Found {} fields.", form.fields.len()),
        pdf_id: doc.id,
        filename: doc.filename,
        num_pages: doc.num_pages,
        fields: form.fields,
    }))
}

/// List uploaded PDFs
async fn list_pdfs(State(state): State<AppState>) -> Result<Json<PdfListResponse>> {
    let pdfs = state.documents().list().await?;
    Ok(Json(PdfListResponse { pdfs }))
}

/// Get a PDF's metadata and fields
async fn get_pdf(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
) -> Result<Json<PdfDetailResponse>> {
    let doc = state
        .documents()
        .get(&pdf_id)
        .await?
        .ok_or_else(|| not_found(&pdf_id))?;
    let fields = state.fields().list(&pdf_id).await?;

    Ok(Json(PdfDetailResponse {
        pdf_id: doc.id,
        filename: doc.filename,
        num_pages: doc.num_pages,
        file_hash: doc.file_hash,
        fields,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    }))
}

/// Delete a PDF and its fields
async fn delete_pdf(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
) -> Result<StatusCode> {
    if state.documents().delete(&pdf_id).await? {
        tracing::info!(pdf_id = %pdf_id, "Deleted PDF");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&pdf_id))
    }
}

/// Get the original PDF as base64
async fn get_content(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
) -> Result<Json<ContentResponse>> {
    let raw = state
        .documents()
        .raw_data(&pdf_id)
        .await?
        .ok_or_else(|| not_found(&pdf_id))?;

    Ok(Json(ContentResponse {
        pdf_id,
        content: STANDARD.encode(raw),
        content_type: PDF_CONTENT_TYPE,
    }))
}

/// Download the PDF with its form layer rebuilt from the current fields
async fn download_pdf(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
) -> Result<impl IntoResponse> {
    let doc = state
        .documents()
        .get(&pdf_id)
        .await?
        .ok_or_else(|| not_found(&pdf_id))?;
    let raw = state
        .documents()
        .raw_data(&pdf_id)
        .await?
        .ok_or_else(|| not_found(&pdf_id))?;
    let fields = state.fields().list(&pdf_id).await?;
    let field_count = fields.len();

    let pdf = tokio::task::spawn_blocking(move || forms::regenerate(&raw, &fields)).await??;

    tracing::info!(pdf_id = %pdf_id, fields = field_count, bytes = pdf.len(), "Regenerated PDF");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        download_name(&doc.filename)
    );
    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    ))
}

/// `edited_<name>.pdf`, restricted to header-safe characters
fn download_name(filename: &str) -> String {
    let stem = filename
        .strip_suffix(".pdf")
        .or_else(|| filename.strip_suffix(".PDF"))
        .unwrap_or(filename);
    let safe: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("edited_{}.pdf", safe)
}

pub(crate) fn not_found(pdf_id: &str) -> AppError {
    AppError::NotFound(format!("PDF not found: {}", pdf_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_name() {
        assert_eq!(download_name("lease.pdf"), "edited_lease.pdf");
        assert_eq!(download_name("Form \"A\".PDF"), "edited_Form _A_.pdf");
        assert_eq!(download_name("créer.pdf"), "edited_cr_er.pdf");
    }
}
