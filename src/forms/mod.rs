//! AcroForm field engine
//!
//! Two pipelines over `lopdf` documents:
//! - extraction: widget annotations -> [`FieldRecord`]s
//!   ([`AnnotationCollector`] then [`FieldClassifier`])
//! - regeneration: [`FieldRecord`]s -> a rebuilt AcroForm
//!   ([`AcroFormAssembler`] driving [`WidgetBuilder`])

pub mod acroform;
pub mod classifier;
pub mod collector;
pub mod edit;
pub mod error;
mod objects;
pub mod text;
pub mod types;
pub mod widget;

#[cfg(test)]
pub(crate) mod fixtures;

pub use acroform::{strip_form_layer, AcroFormAssembler, AssemblySummary, FontResources};
pub use classifier::{ClassifierConfig, FieldClassifier};
pub use collector::{AnnotationCollector, RawWidget};
pub use edit::{apply_update, bulk_update, remove_fields, upsert_field, FieldUpdate, Upsert};
pub use error::{FormError, Result};
pub use types::{
    BorderStyle, ExtractedForm, FieldFlags, FieldRecord, FieldType, FontName, TopLeftRect,
};
pub use widget::{BuiltWidget, WidgetBuilder};

use lopdf::Document;

/// Parse PDF bytes
pub fn load_document(bytes: &[u8]) -> Result<Document> {
    Document::load_mem(bytes).map_err(|e| FormError::InvalidPdf(e.to_string()))
}

/// Number of pages in a PDF
pub fn page_count(bytes: &[u8]) -> Result<usize> {
    Ok(load_document(bytes)?.get_pages().len())
}

/// Extract editable fields from PDF bytes.
///
/// Only unparseable bytes are an error; a document without a usable form
/// yields an empty field list.
pub fn extract_fields(bytes: &[u8]) -> Result<ExtractedForm> {
    let doc = load_document(bytes)?;
    Ok(extract_from_document(&doc, &FieldClassifier::default()))
}

/// Extract editable fields from a parsed document
pub fn extract_from_document(doc: &Document, classifier: &FieldClassifier) -> ExtractedForm {
    let num_pages = doc.get_pages().len();

    let fields = match AnnotationCollector::new().collect(doc) {
        Ok(widgets) => widgets.iter().map(|w| classifier.classify(w)).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "No readable form structure, returning no fields");
            Vec::new()
        }
    };

    tracing::info!(pages = num_pages, fields = fields.len(), "Extracted form fields");
    ExtractedForm { num_pages, fields }
}

/// Rebuild the form layer of a PDF from `fields` and serialize it
pub fn regenerate(bytes: &[u8], fields: &[FieldRecord]) -> Result<Vec<u8>> {
    let mut doc = load_document(bytes)?;
    regenerate_document(&mut doc, fields)?;

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// Rebuild the form layer of a parsed document in place
pub fn regenerate_document(doc: &mut Document, fields: &[FieldRecord]) -> Result<AssemblySummary> {
    let summary = AcroFormAssembler::new().assemble(doc, fields)?;
    tracing::info!(
        fields = summary.fields,
        removed_widgets = summary.removed_widgets,
        "Regenerated AcroForm"
    );
    Ok(summary)
}
