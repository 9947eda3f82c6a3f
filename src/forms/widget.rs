//! Widget annotation builder
//!
//! Builds one widget annotation per [`FieldRecord`]. The builder only
//! reserves object ids; registering the objects and appending the widget to
//! the page is the assembler's job.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::acroform::FontResources;
use super::error::Result;
use super::text::text_object;
use super::types::{BorderStyle, FieldFlags, FieldRecord, FieldType, FontName};

const OFF_STATE: &str = "Off";
const DEFAULT_EXPORT_VALUE: &str = "Yes";
const DASH_PATTERN: [i64; 2] = [3, 3];
/// Annotation flags: print
const ANNOT_PRINT: i64 = 4;

/// A widget and the placeholder appearance streams it references
#[derive(Debug, Clone)]
pub struct BuiltWidget {
    /// Reserved id for the widget dictionary
    pub id: ObjectId,
    pub widget: Dictionary,
    pub appearance_streams: Vec<(ObjectId, Stream)>,
}

/// Builds widget annotations sharing one set of font resources
pub struct WidgetBuilder<'a> {
    fonts: &'a FontResources,
}

impl<'a> WidgetBuilder<'a> {
    pub fn new(fonts: &'a FontResources) -> Self {
        Self { fonts }
    }

    /// Build the widget for `record` on the page `page_id`
    pub fn build(
        &self,
        doc: &mut Document,
        record: &FieldRecord,
        page_id: ObjectId,
        page_height: f64,
    ) -> Result<BuiltWidget> {
        record.validate()?;

        let rect = record.rect().to_pdf_rect(page_height);
        let mut widget = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "F" => ANNOT_PRINT,
            "P" => page_id,
            "T" => text_object(&record.name),
            "Rect" => rect.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            "BS" => border_style(record),
            "MK" => appearance_characteristics(record),
            "DA" => Object::string_literal(default_appearance(record.font_name, record.font_size)),
        };
        if !record.label.is_empty() && record.label != record.name {
            widget.set("TU", text_object(&record.label));
        }
        if record.field_type.is_text_bearing() {
            widget.set("DR", self.fonts.resource_dictionary());
        }

        let mut appearance_streams = Vec::new();
        match record.field_type {
            FieldType::Signature => {
                widget.set("FT", "Sig");
                widget.set("Ff", 0);
            }
            FieldType::Checkbox | FieldType::Radio => {
                let flags = if record.field_type == FieldType::Radio {
                    FieldFlags::RADIO
                } else {
                    FieldFlags::empty()
                };
                widget.set("FT", "Btn");
                widget.set("Ff", flags.bits() as i64);

                let export = export_value(record);
                let state = if record.checked { export.as_str() } else { OFF_STATE };
                widget.set("V", Object::Name(state.as_bytes().to_vec()));
                widget.set("DV", Object::Name(state.as_bytes().to_vec()));
                widget.set("AS", Object::Name(state.as_bytes().to_vec()));

                let on_id = doc.new_object_id();
                let off_id = doc.new_object_id();
                let mut normal = Dictionary::new();
                normal.set(export.as_str(), on_id);
                normal.set(OFF_STATE, off_id);
                widget.set("AP", dictionary! { "N" => normal });

                appearance_streams.push((on_id, placeholder_appearance(record)));
                appearance_streams.push((off_id, placeholder_appearance(record)));
            }
            FieldType::Textarea => {
                widget.set("FT", "Tx");
                widget.set("Ff", FieldFlags::MULTILINE.bits() as i64);
                set_text_value(&mut widget, record);
                set_max_length(&mut widget, record);
            }
            FieldType::Text | FieldType::Date | FieldType::Button | FieldType::Choice => {
                let flags = if record.is_comb() {
                    FieldFlags::COMB
                } else {
                    FieldFlags::empty()
                };
                widget.set("FT", "Tx");
                widget.set("Ff", flags.bits() as i64);
                set_text_value(&mut widget, record);
                set_max_length(&mut widget, record);
            }
        }

        Ok(BuiltWidget {
            id: doc.new_object_id(),
            widget,
            appearance_streams,
        })
    }
}

/// `/DA` string, e.g. `/Helv 12 Tf 0 g`
pub fn default_appearance(font: FontName, size: f64) -> String {
    format!("/{} {} Tf 0 g", font.resource_name(), format_number(size))
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let fixed = format!("{:.2}", value);
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn border_style(record: &FieldRecord) -> Dictionary {
    let width = match record.border_style {
        BorderStyle::None => 0.0,
        _ => record.border_width,
    };
    let mut bs = dictionary! {
        "Type" => "Border",
        "W" => Object::Real(width as f32),
        "S" => record.border_style.pdf_code(),
    };
    if record.border_style == BorderStyle::Dashed {
        bs.set(
            "D",
            DASH_PATTERN.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
        );
    }
    bs
}

fn appearance_characteristics(record: &FieldRecord) -> Dictionary {
    dictionary! {
        "BC" => record.border_color.iter().map(|c| Object::Real(*c)).collect::<Vec<_>>(),
        "BG" => vec![Object::Real(1.0), Object::Real(1.0), Object::Real(1.0)],
    }
}

fn export_value(record: &FieldRecord) -> String {
    let value = record.value.trim();
    let value = value.strip_prefix('/').unwrap_or(value);
    if value.is_empty() || value == OFF_STATE {
        DEFAULT_EXPORT_VALUE.to_string()
    } else {
        value.to_string()
    }
}

fn set_text_value(widget: &mut Dictionary, record: &FieldRecord) {
    if !record.value.is_empty() {
        widget.set("V", text_object(&record.value));
    }
}

fn set_max_length(widget: &mut Dictionary, record: &FieldRecord) {
    if let Some(len) = record.effective_max_length() {
        widget.set("MaxLen", len as i64);
    }
}

/// Empty form XObject sized to the widget
fn placeholder_appearance(record: &FieldRecord) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(record.width as f32),
                Object::Real(record.height as f32),
            ],
        },
        Vec::new(),
    )
}
