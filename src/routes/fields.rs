//! Field editing API routes
//!
//! Every handler loads the document's field list, edits it in memory and
//! writes the whole list back in one transaction.

use axum::{
    extract::{Path, State},
    routing::{patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::pdf::not_found;
use crate::error::{AppError, Result};
use crate::forms::edit::matches_key;
use crate::forms::{
    apply_update, bulk_update, remove_fields, upsert_field, FieldRecord, FieldUpdate, Upsert,
};
use crate::state::AppState;

/// Create the field editing router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:pdf_id/field", post(save_field))
        .route("/:pdf_id/field/:field_key", patch(update_field).delete(delete_field))
        .route("/:pdf_id/fields/bulk-delete", post(bulk_delete_fields))
        .route("/:pdf_id/fields/bulk-update", post(bulk_update_fields))
}

#[derive(Debug, Deserialize)]
pub struct SaveFieldRequest {
    pub field: FieldRecord,
}

#[derive(Debug, Serialize)]
pub struct SaveFieldResponse {
    pub message: String,
    pub field: FieldRecord,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub field_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: usize,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    pub field_ids: Vec<String>,
    pub updates: FieldUpdate,
}

#[derive(Debug, Serialize)]
pub struct BulkUpdateResponse {
    pub updated: usize,
}

async fn load_fields(state: &AppState, pdf_id: &str) -> Result<Vec<FieldRecord>> {
    if state.documents().get(pdf_id).await?.is_none() {
        return Err(not_found(pdf_id));
    }
    state.fields().list(pdf_id).await
}

/// Add a field, or replace the one with the same id or name
async fn save_field(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
    Json(request): Json<SaveFieldRequest>,
) -> Result<Json<SaveFieldResponse>> {
    let mut fields = load_fields(&state, &pdf_id).await?;
    let (outcome, field) = upsert_field(&mut fields, request.field)?;
    state.fields().replace_all(&pdf_id, &fields).await?;

    let message = match outcome {
        Upsert::Created => "Field added successfully",
        Upsert::Updated => "Field updated successfully",
    };
    tracing::debug!(pdf_id = %pdf_id, field_id = %field.id, ?outcome, "Saved field");

    Ok(Json(SaveFieldResponse {
        message: message.to_string(),
        field,
    }))
}

/// Apply a partial update to one field, addressed by id or name
async fn update_field(
    State(state): State<AppState>,
    Path((pdf_id, field_key)): Path<(String, String)>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<FieldRecord>> {
    let mut fields = load_fields(&state, &pdf_id).await?;
    let record = fields
        .iter_mut()
        .find(|f| matches_key(f, &field_key))
        .ok_or_else(|| AppError::NotFound(format!("Field not found: {}", field_key)))?;

    apply_update(record, &update)?;
    let updated = record.clone();
    state.fields().replace_all(&pdf_id, &fields).await?;

    Ok(Json(updated))
}

/// Delete one field, addressed by name or id
async fn delete_field(
    State(state): State<AppState>,
    Path((pdf_id, field_key)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    let mut fields = load_fields(&state, &pdf_id).await?;
    if remove_fields(&mut fields, &[field_key.clone()]) == 0 {
        return Err(AppError::NotFound(format!("Field not found: {}", field_key)));
    }
    state.fields().replace_all(&pdf_id, &fields).await?;

    Ok(Json(MessageResponse {
        message: format!("Field {} deleted successfully", field_key),
    }))
}

/// Delete several fields at once
async fn bulk_delete_fields(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>> {
    let mut fields = load_fields(&state, &pdf_id).await?;
    let deleted = remove_fields(&mut fields, &request.field_ids);
    if deleted > 0 {
        state.fields().replace_all(&pdf_id, &fields).await?;
    }

    Ok(Json(BulkDeleteResponse { deleted }))
}

/// Apply one partial update to several fields
async fn bulk_update_fields(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
    Json(request): Json<BulkUpdateRequest>,
) -> Result<Json<BulkUpdateResponse>> {
    if request.updates.is_empty() {
        return Err(AppError::BadRequest("No updates given".to_string()));
    }

    let mut fields = load_fields(&state, &pdf_id).await?;
    let updated = bulk_update(&mut fields, &request.field_ids, &request.updates)?;
    if updated > 0 {
        state.fields().replace_all(&pdf_id, &fields).await?;
    }

    Ok(Json(BulkUpdateResponse { updated }))
}
