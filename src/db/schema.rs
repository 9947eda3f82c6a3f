//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Uploaded documents, original bytes kept for regeneration
CREATE TABLE IF NOT EXISTS pdfs (
    id TEXT PRIMARY KEY,
    filename TEXT NOT NULL,
    num_pages INTEGER NOT NULL,
    file_hash TEXT NOT NULL,
    raw_data BLOB NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pdfs_file_hash ON pdfs(file_hash);
CREATE INDEX IF NOT EXISTS idx_pdfs_created_at ON pdfs(created_at);

-- Editable field records, one ordered list per document
CREATE TABLE IF NOT EXISTS fields (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pdf_id TEXT NOT NULL REFERENCES pdfs(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    field_id TEXT NOT NULL,
    field_name TEXT NOT NULL,
    label TEXT NOT NULL DEFAULT '',
    original_name TEXT NOT NULL,
    field_type TEXT NOT NULL,
    value TEXT NOT NULL DEFAULT '',
    checked INTEGER NOT NULL DEFAULT 0,
    radio_group TEXT,
    date_format TEXT,
    monospace INTEGER NOT NULL DEFAULT 0,
    x REAL NOT NULL,
    y REAL NOT NULL,
    width REAL NOT NULL,
    height REAL NOT NULL,
    page INTEGER NOT NULL,
    border_style TEXT NOT NULL DEFAULT 'solid',
    border_width REAL NOT NULL DEFAULT 1,
    border_color TEXT NOT NULL DEFAULT '[0.0,0.0,0.0]',
    font_family TEXT NOT NULL DEFAULT 'Helvetica',
    font_size REAL NOT NULL DEFAULT 12,
    max_length INTEGER,

    UNIQUE(pdf_id, field_id)
);

CREATE INDEX IF NOT EXISTS idx_fields_pdf_position ON fields(pdf_id, position);
"#;
