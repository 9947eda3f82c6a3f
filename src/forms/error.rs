//! Form engine error types
//!
//! Errors raised while extracting or regenerating AcroForm fields.

use thiserror::Error;

/// Form engine error type
#[derive(Debug, Error)]
pub enum FormError {
    /// The bytes could not be parsed as a PDF document
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// The document is missing structure the engine depends on
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// A field references a page the document does not have
    #[error("Field {field_id} is on page {page}, but the document has {page_count} pages")]
    PageOutOfRange {
        field_id: String,
        page: u32,
        page_count: usize,
    },

    /// A field record violates a data model invariant
    #[error("Invalid field {field_id}: {reason}")]
    InvalidField { field_id: String, reason: String },

    /// Underlying object model error
    #[error("PDF object error: {0}")]
    Object(#[from] lopdf::Error),

    /// Failed to serialize the rebuilt document
    #[error("Failed to write PDF: {0}")]
    Write(#[from] std::io::Error),
}

impl FormError {
    pub(crate) fn invalid_field(field_id: &str, reason: impl Into<String>) -> Self {
        FormError::InvalidField {
            field_id: field_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for form operations
pub type Result<T> = std::result::Result<T, FormError>;
