//! Field list database operations

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::Result;
use crate::forms::{BorderStyle, FieldRecord, FieldType, FontName};

/// Stored field row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FieldRow {
    pub position: i64,
    pub field_id: String,
    pub field_name: String,
    pub label: String,
    pub original_name: String,
    pub field_type: String,
    pub value: String,
    pub checked: bool,
    pub radio_group: Option<String>,
    pub date_format: Option<String>,
    pub monospace: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub page: i64,
    pub border_style: String,
    pub border_width: f64,
    pub border_color: String,
    pub font_family: String,
    pub font_size: f64,
    pub max_length: Option<i64>,
}

impl FieldRow {
    /// Convert to the wire model. Unknown enum strings fall back to defaults.
    pub fn into_record(self) -> Result<FieldRecord> {
        Ok(FieldRecord {
            id: self.field_id,
            name: self.field_name,
            label: self.label,
            original_name: self.original_name,
            field_type: FieldType::from_str_lossy(&self.field_type),
            value: self.value,
            checked: self.checked,
            radio_group: self.radio_group,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            page: u32::try_from(self.page).unwrap_or_default(),
            border_style: BorderStyle::from_str_lossy(&self.border_style),
            border_width: self.border_width,
            border_color: serde_json::from_str(&self.border_color)?,
            font_name: FontName::from_name_lossy(&self.font_family),
            font_size: self.font_size,
            monospace: self.monospace,
            max_length: self
                .max_length
                .filter(|len| *len > 0)
                .and_then(|len| u32::try_from(len).ok()),
            date_format: self.date_format,
        })
    }
}

const FIELD_COLUMNS: &str = r#"
    position, field_id, field_name, label, original_name, field_type, value,
    checked, radio_group, date_format, monospace, x, y, width, height, page,
    border_style, border_width, border_color, font_family, font_size, max_length
"#;

/// Insert `fields` for a document, in order, on an open connection
pub(crate) async fn insert_fields(
    conn: &mut SqliteConnection,
    pdf_id: &str,
    fields: &[FieldRecord],
) -> Result<()> {
    let sql = format!(
        "INSERT INTO fields (pdf_id, {}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        FIELD_COLUMNS
    );

    for (position, field) in fields.iter().enumerate() {
        let border_color = serde_json::to_string(&field.border_color)?;
        sqlx::query(&sql)
            .bind(pdf_id)
            .bind(position as i64)
            .bind(&field.id)
            .bind(&field.name)
            .bind(&field.label)
            .bind(&field.original_name)
            .bind(field.field_type.as_str())
            .bind(&field.value)
            .bind(field.checked)
            .bind(&field.radio_group)
            .bind(&field.date_format)
            .bind(field.monospace)
            .bind(field.x)
            .bind(field.y)
            .bind(field.width)
            .bind(field.height)
            .bind(field.page as i64)
            .bind(field.border_style.as_str())
            .bind(field.border_width)
            .bind(border_color)
            .bind(field.font_name.as_str())
            .bind(field.font_size)
            .bind(field.max_length.map(i64::from))
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Field list repository
pub struct FieldRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FieldRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List a document's fields in order
    pub async fn list(&self, pdf_id: &str) -> Result<Vec<FieldRecord>> {
        let rows = sqlx::query_as::<_, FieldRow>(&format!(
            "SELECT {} FROM fields WHERE pdf_id = ? ORDER BY position ASC",
            FIELD_COLUMNS
        ))
        .bind(pdf_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(FieldRow::into_record).collect()
    }

    /// Replace a document's whole field list in one transaction
    pub async fn replace_all(&self, pdf_id: &str, fields: &[FieldRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM fields WHERE pdf_id = ?")
            .bind(pdf_id)
            .execute(&mut *tx)
            .await?;

        insert_fields(&mut *tx, pdf_id, fields).await?;

        sqlx::query("UPDATE pdfs SET updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(pdf_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(pdf_id, fields = fields.len(), "Replaced field list");
        Ok(())
    }
}
