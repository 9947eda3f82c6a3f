//! Document database operations

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::fields::insert_fields;
use crate::error::{AppError, Result};
use crate::forms::ExtractedForm;

/// Document record, without its bytes
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PdfDocument {
    pub id: String,
    pub filename: String,
    pub num_pages: i64,
    pub file_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Listing entry
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PdfSummary {
    #[serde(rename = "pdf_id")]
    pub id: String,
    pub filename: String,
    pub num_pages: i64,
    pub num_fields: i64,
    pub created_at: String,
}

/// SHA-256 hex digest of a file
pub fn file_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Document repository
pub struct DocumentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DocumentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific document
    pub async fn get(&self, id: &str) -> Result<Option<PdfDocument>> {
        let doc = sqlx::query_as::<_, PdfDocument>(
            r#"
            SELECT id, filename, num_pages, file_hash, created_at, updated_at
            FROM pdfs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(doc)
    }

    /// Original uploaded bytes
    pub async fn raw_data(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT raw_data FROM pdfs WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|(data,)| data))
    }

    /// List documents with their field counts, newest first
    pub async fn list(&self) -> Result<Vec<PdfSummary>> {
        let docs = sqlx::query_as::<_, PdfSummary>(
            r#"
            SELECT p.id, p.filename, p.num_pages, p.created_at,
                   COUNT(f.id) AS num_fields
            FROM pdfs p
            LEFT JOIN fields f ON f.pdf_id = p.id
            GROUP BY p.id
            ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(docs)
    }

    /// Store an uploaded document and its extracted fields
    pub async fn create(
        &self,
        filename: &str,
        bytes: &[u8],
        form: &ExtractedForm,
    ) -> Result<PdfDocument> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO pdfs (id, filename, num_pages, file_hash, raw_data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(filename)
        .bind(form.num_pages as i64)
        .bind(file_hash(bytes))
        .bind(bytes)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        insert_fields(&mut *tx, &id, &form.fields).await?;

        tx.commit().await?;

        tracing::info!(pdf_id = %id, filename, fields = form.fields.len(), "Stored document");

        self.get(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created document".to_string()))
    }

    /// Delete a document and its fields
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pdfs WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
