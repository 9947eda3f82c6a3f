//! AcroForm assembly
//!
//! Regeneration is not incremental: the existing form layer is stripped,
//! then every record is rebuilt as a widget and wired into a fresh
//! `/AcroForm` that shares one set of standard font resources.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use super::error::{FormError, Result};
use super::objects::{catalog_id, name_entry, page_height, page_ids, resolve, resolve_dict};
use super::types::{FieldRecord, FontName};
use super::widget::{default_appearance, BuiltWidget, WidgetBuilder};

/// Standard font objects shared by every widget of one regeneration pass
#[derive(Debug, Clone)]
pub struct FontResources {
    fonts: Vec<(FontName, ObjectId)>,
}

impl FontResources {
    /// Add one Type1 WinAnsi font object per supported font
    pub fn register(doc: &mut Document) -> Self {
        let fonts = FontName::ALL
            .iter()
            .map(|font| {
                let id = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.base_font(),
                    "Encoding" => "WinAnsiEncoding",
                });
                (*font, id)
            })
            .collect();
        Self { fonts }
    }

    pub fn font_id(&self, font: FontName) -> Option<ObjectId> {
        self.fonts
            .iter()
            .find(|(name, _)| *name == font)
            .map(|(_, id)| *id)
    }

    /// `/DR` dictionary: `<< /Font << /Helv ref /Times ref /Cour ref >> >>`
    pub fn resource_dictionary(&self) -> Dictionary {
        let mut fonts = Dictionary::new();
        for (font, id) in &self.fonts {
            fonts.set(font.resource_name(), *id);
        }
        dictionary! { "Font" => fonts }
    }
}

/// Outcome of one assembly pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    pub fields: usize,
    pub removed_widgets: usize,
    pub pruned_objects: usize,
}

/// Remove the catalog `/AcroForm` and every widget annotation, keeping other
/// annotations. Returns the number of widgets removed.
pub fn strip_form_layer(doc: &mut Document) -> Result<usize> {
    let catalog = catalog_id(doc)?;
    doc.get_object_mut(catalog)?.as_dict_mut()?.remove(b"AcroForm");

    let mut removed = 0;
    for page_id in page_ids(doc) {
        let page = doc.get_object(page_id)?.as_dict()?;
        let Some(annots) = page
            .get(b"Annots")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
        else {
            continue;
        };

        let kept: Vec<Object> = annots
            .iter()
            .filter(|entry| !is_widget(doc, entry))
            .cloned()
            .collect();
        let dropped = annots.len() - kept.len();
        if dropped == 0 {
            continue;
        }
        removed += dropped;

        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        if kept.is_empty() {
            page.remove(b"Annots");
        } else {
            page.set("Annots", kept);
        }
    }

    Ok(removed)
}

fn is_widget(doc: &Document, entry: &Object) -> bool {
    resolve_dict(doc, entry)
        .and_then(|annot| name_entry(annot, b"Subtype"))
        .is_some_and(|subtype| subtype == "Widget")
}

/// Rebuilds a document's form layer from field records
#[derive(Debug, Default, Clone, Copy)]
pub struct AcroFormAssembler;

impl AcroFormAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Replace the form layer of `doc` with widgets for `fields`.
    ///
    /// Every record is checked before the document is touched, so a bad
    /// record fails the pass without a half-built form.
    pub fn assemble(&self, doc: &mut Document, fields: &[FieldRecord]) -> Result<AssemblySummary> {
        let pages = page_ids(doc);
        for field in fields {
            field.validate()?;
            if field.page as usize >= pages.len() {
                return Err(FormError::PageOutOfRange {
                    field_id: field.id.clone(),
                    page: field.page,
                    page_count: pages.len(),
                });
            }
        }

        let removed_widgets = strip_form_layer(doc)?;
        let fonts = FontResources::register(doc);
        let builder = WidgetBuilder::new(&fonts);

        let mut built: Vec<(ObjectId, BuiltWidget)> = Vec::with_capacity(fields.len());
        for field in fields {
            let page_id = pages[field.page as usize];
            let height = page_height(doc, page_id);
            built.push((page_id, builder.build(doc, field, page_id, height)?));
        }

        let mut field_refs = Vec::with_capacity(built.len());
        for (page_id, widget) in built {
            for (id, stream) in widget.appearance_streams {
                doc.objects.insert(id, Object::Stream(stream));
            }
            doc.objects.insert(widget.id, Object::Dictionary(widget.widget));
            append_annotation(doc, page_id, widget.id)?;
            field_refs.push(Object::Reference(widget.id));
        }

        let acroform = doc.add_object(dictionary! {
            "Fields" => field_refs,
            "NeedAppearances" => true,
            "DA" => Object::string_literal(default_appearance(FontName::Helvetica, 0.0)),
            "DR" => fonts.resource_dictionary(),
        });
        let catalog = catalog_id(doc)?;
        doc.get_object_mut(catalog)?
            .as_dict_mut()?
            .set("AcroForm", acroform);

        let pruned_objects = doc.prune_objects().len();

        tracing::debug!(
            fields = fields.len(),
            removed_widgets,
            pruned_objects,
            "Assembled AcroForm"
        );

        Ok(AssemblySummary {
            fields: fields.len(),
            removed_widgets,
            pruned_objects,
        })
    }
}

/// Append a widget to the page's `/Annots`. An indirect array is copied
/// inline so its existing entries survive.
fn append_annotation(doc: &mut Document, page_id: ObjectId, widget_id: ObjectId) -> Result<()> {
    let mut annots = doc
        .get_object(page_id)?
        .as_dict()?
        .get(b"Annots")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .cloned()
        .unwrap_or_default();
    annots.push(Object::Reference(widget_id));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Annots", annots);
    Ok(())
}
