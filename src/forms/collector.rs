//! Widget annotation collector
//!
//! Walks every page's `/Annots` array and produces one [`RawWidget`] per
//! usable widget annotation. Field attributes are resolved by overlaying the
//! annotation's own entries on top of whatever its `/Parent` chain declares.
//!
//! A failure on one annotation is logged and skipped; it never aborts the
//! pass.

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::error::{FormError, Result};
use super::objects::{
    array_entry, catalog_id, dict_entry, name_entry, number, page_height, page_ids, rect_values,
    resolve, resolve_dict, MAX_TREE_DEPTH,
};
use super::text::{decode_pdf_text, object_text};
use super::types::{BorderStyle, FieldFlags, RawFieldType, RgbColor, TopLeftRect};

const OFF_STATE: &str = "Off";

/// Field-level attributes declared by one dictionary in a field hierarchy.
///
/// Every entry is optional so a child's partial declaration can be laid over
/// its parent's with [`FieldAttributes::overlay`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAttributes {
    pub name: Option<String>,
    pub raw_type: Option<String>,
    pub flags: Option<u32>,
    pub value: Option<String>,
    pub tooltip: Option<String>,
    pub default_appearance: Option<String>,
    pub max_length: Option<i64>,
}

impl FieldAttributes {
    /// Read the inheritable field entries present directly on `dict`
    pub fn read(doc: &Document, dict: &Dictionary) -> Result<Self> {
        let flags = match dict.get(b"Ff") {
            Ok(obj) => match resolve(doc, obj) {
                Some(Object::Integer(bits)) => Some(*bits as u32),
                other => {
                    return Err(FormError::Malformed(format!(
                        "unreadable /Ff entry: {:?}",
                        other
                    )))
                }
            },
            Err(_) => None,
        };

        let max_length = match dict.get(b"MaxLen").ok().and_then(|o| resolve(doc, o)) {
            Some(Object::Integer(len)) => Some(*len),
            _ => None,
        };

        Ok(Self {
            name: text_entry(doc, dict, b"T"),
            raw_type: name_entry(dict, b"FT"),
            flags,
            value: text_entry(doc, dict, b"V"),
            tooltip: text_entry(doc, dict, b"TU"),
            default_appearance: text_entry(doc, dict, b"DA"),
            max_length,
        })
    }

    /// Lay `local` over `self`. Local values win; names are qualified as
    /// `parent.child` when both levels declare one.
    pub fn overlay(self, local: FieldAttributes) -> FieldAttributes {
        let name = match (self.name, local.name) {
            (Some(parent), Some(child)) => Some(format!("{}.{}", parent, child)),
            (parent, child) => child.or(parent),
        };
        FieldAttributes {
            name,
            raw_type: local.raw_type.or(self.raw_type),
            flags: local.flags.or(self.flags),
            value: local.value.or(self.value),
            tooltip: local.tooltip.or(self.tooltip),
            default_appearance: local.default_appearance.or(self.default_appearance),
            max_length: local.max_length.or(self.max_length),
        }
    }
}

/// Border appearance as declared on the widget
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorderInfo {
    pub width: Option<f64>,
    pub style: Option<BorderStyle>,
    pub color: Option<RgbColor>,
}

/// One widget annotation with its field attributes fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RawWidget {
    /// 0-indexed page
    pub page: u32,
    /// Position in the page's `/Annots` array
    pub annotation_index: usize,
    /// Qualified field name
    pub name: String,
    /// Qualified name of the parent field, when the name was inherited
    pub parent_name: Option<String>,
    pub raw_type: RawFieldType,
    pub flags: FieldFlags,
    pub value: Option<String>,
    /// `/AS` appearance state
    pub appearance_state: Option<String>,
    /// On-state of a button widget
    pub export_value: Option<String>,
    pub tooltip: Option<String>,
    pub default_appearance: Option<String>,
    pub max_length: Option<i64>,
    /// Top-left-origin geometry
    pub rect: TopLeftRect,
    pub border: BorderInfo,
}

impl RawWidget {
    /// Stable record id derived from the widget's position
    pub fn record_id(&self) -> String {
        format!("field_{}_{}", self.page, self.annotation_index)
    }
}

/// Collects widget annotations from every page of a document
#[derive(Debug, Default, Clone, Copy)]
pub struct AnnotationCollector;

impl AnnotationCollector {
    pub fn new() -> Self {
        Self
    }

    /// Collect widgets from all pages in document order
    pub fn collect(&self, doc: &Document) -> Result<Vec<RawWidget>> {
        let catalog = doc.get_object(catalog_id(doc)?)?.as_dict()?;
        if !catalog.has(b"Pages") {
            return Err(FormError::Malformed("catalog has no page tree".into()));
        }

        let pages = page_ids(doc);
        if pages.is_empty() {
            return Err(FormError::Malformed("document has no readable pages".into()));
        }

        let mut widgets = Vec::new();
        for (page_index, page_id) in pages.into_iter().enumerate() {
            match self.collect_page(doc, page_index as u32, page_id) {
                Ok(mut found) => widgets.append(&mut found),
                Err(e) => {
                    tracing::warn!(page = page_index, error = %e, "Skipping page annotations");
                }
            }
        }

        tracing::debug!(widgets = widgets.len(), "Collected widget annotations");
        Ok(widgets)
    }

    /// Collect widgets from a single page
    pub fn collect_page(
        &self,
        doc: &Document,
        page: u32,
        page_id: ObjectId,
    ) -> Result<Vec<RawWidget>> {
        let page_dict = doc.get_object(page_id)?.as_dict()?;
        let annots = match page_dict.get(b"Annots") {
            Ok(obj) => resolve(doc, obj)
                .ok_or_else(|| FormError::Malformed("unresolvable /Annots reference".into()))?
                .as_array()?,
            Err(_) => return Ok(Vec::new()),
        };

        let height = page_height(doc, page_id);
        let mut widgets = Vec::new();

        for (index, entry) in annots.iter().enumerate() {
            match read_widget(doc, page, index, height, entry) {
                Ok(Some(widget)) => widgets.push(widget),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        page,
                        annotation = index,
                        error = %e,
                        "Skipping unreadable annotation"
                    );
                }
            }
        }

        Ok(widgets)
    }
}

fn read_widget(
    doc: &Document,
    page: u32,
    index: usize,
    page_height: f64,
    entry: &Object,
) -> Result<Option<RawWidget>> {
    let annot = resolve_dict(doc, entry)
        .ok_or_else(|| FormError::Malformed("annotation is not a dictionary".into()))?;

    if name_entry(annot, b"Subtype").as_deref() != Some("Widget") {
        return Ok(None);
    }

    let inherited = inherited_attributes(doc, annot)?;
    let local = FieldAttributes::read(doc, annot)?;
    let parent_name = match local.name {
        Some(_) => None,
        None => inherited.name.clone(),
    };
    let merged = inherited.overlay(local);

    let Some(name) = merged.name.filter(|n| !n.trim().is_empty()) else {
        tracing::debug!(page, annotation = index, "Dropping widget without a field name");
        return Ok(None);
    };

    let rect = match annot.get(b"Rect") {
        Ok(obj) => {
            let values = resolve(doc, obj)
                .and_then(|o| o.as_array().ok())
                .and_then(|arr| rect_values(doc, arr))
                .ok_or_else(|| FormError::Malformed(format!("malformed /Rect on '{}'", name)))?;
            TopLeftRect::from_pdf_rect(values, page_height)
        }
        Err(_) => {
            tracing::debug!(page, annotation = index, field = %name, "Dropping widget without /Rect");
            return Ok(None);
        }
    };

    let raw_type = merged
        .raw_type
        .as_deref()
        .map(RawFieldType::from_code)
        .unwrap_or_else(|| RawFieldType::Other(String::new()));

    let appearance_state = name_entry(annot, b"AS");
    let export_value = if raw_type == RawFieldType::Button {
        resolve_export_value(doc, annot, appearance_state.as_deref())
    } else {
        None
    };

    Ok(Some(RawWidget {
        page,
        annotation_index: index,
        name,
        parent_name,
        raw_type,
        flags: FieldFlags::from_bits_retain(merged.flags.unwrap_or(0)),
        value: merged.value,
        appearance_state,
        export_value,
        tooltip: merged.tooltip,
        default_appearance: merged.default_appearance,
        max_length: merged.max_length,
        rect,
        border: read_border(doc, annot),
    }))
}

/// Merge the attributes of every ancestor field, outermost first
fn inherited_attributes(doc: &Document, annot: &Dictionary) -> Result<FieldAttributes> {
    let mut chain = Vec::new();
    let mut current = dict_entry(doc, annot, b"Parent");
    while let Some(parent) = current {
        if chain.len() >= MAX_TREE_DEPTH {
            tracing::warn!("Field parent chain exceeds {} levels, truncating", MAX_TREE_DEPTH);
            break;
        }
        chain.push(parent);
        current = dict_entry(doc, parent, b"Parent");
    }

    chain
        .into_iter()
        .rev()
        .try_fold(FieldAttributes::default(), |merged, ancestor| {
            Ok(merged.overlay(FieldAttributes::read(doc, ancestor)?))
        })
}

/// Export value of a button: the first non-Off `/AP /N` key, overridden by
/// a non-Off `/AS`
fn resolve_export_value(
    doc: &Document,
    annot: &Dictionary,
    appearance_state: Option<&str>,
) -> Option<String> {
    let from_appearance = dict_entry(doc, annot, b"AP")
        .and_then(|ap| dict_entry(doc, ap, b"N"))
        .and_then(|normal| {
            normal
                .iter()
                .map(|(key, _)| decode_pdf_text(key))
                .find(|key| key != OFF_STATE)
        });

    match appearance_state {
        Some(state) if state != OFF_STATE && !state.is_empty() => Some(state.to_string()),
        _ => from_appearance,
    }
}

fn read_border(doc: &Document, annot: &Dictionary) -> BorderInfo {
    let mut border = BorderInfo::default();

    if let Some(bs) = dict_entry(doc, annot, b"BS") {
        border.width = bs.get(b"W").ok().and_then(|o| resolve(doc, o)).and_then(number);
        border.style = name_entry(bs, b"S").map(|code| BorderStyle::from_pdf_code(&code));
    }
    if border.width.is_none() {
        // Legacy /Border [hradius vradius width]
        border.width = array_entry(doc, annot, b"Border")
            .and_then(|arr| arr.get(2))
            .and_then(number);
    }

    border.color = dict_entry(doc, annot, b"MK")
        .and_then(|mk| array_entry(doc, mk, b"BC"))
        .and_then(|components| color_components(components));

    border
}

/// Convert a gray, RGB or CMYK color array to RGB
fn color_components(components: &[Object]) -> Option<RgbColor> {
    let values: Vec<f32> = components
        .iter()
        .map(|c| number(c).map(|v| v.clamp(0.0, 1.0) as f32))
        .collect::<Option<_>>()?;
    match values.as_slice() {
        [g] => Some([*g, *g, *g]),
        [r, g, b] => Some([*r, *g, *b]),
        [c, m, y, k] => Some([
            (1.0 - c) * (1.0 - k),
            (1.0 - m) * (1.0 - k),
            (1.0 - y) * (1.0 - k),
        ]),
        _ => None,
    }
}

fn text_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(object_text)
}
