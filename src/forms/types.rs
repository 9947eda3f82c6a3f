//! Form field data model
//!
//! `FieldRecord` is the storage- and wire-stable unit shared by the
//! extraction and regeneration pipelines. Geometry is always top-left origin
//! here; only the widget builder converts back to PDF user space.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::error::{FormError, Result};

/// Smallest font size a field may use
pub const MIN_FONT_SIZE: f64 = 6.0;
/// Largest font size a field may use
pub const MAX_FONT_SIZE: f64 = 72.0;
/// Font size used when a document does not declare one
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
/// Page height assumed when a page has no usable MediaBox (US Letter)
pub const DEFAULT_PAGE_HEIGHT: f64 = 792.0;

bitflags! {
    /// Field flags (`/Ff`), PDF 32000-1 tables 221, 226 and 228
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u32 {
        const READ_ONLY = 1;
        const REQUIRED = 1 << 1;
        const NO_EXPORT = 1 << 2;
        const MULTILINE = 1 << 12;
        const PASSWORD = 1 << 13;
        const NO_TOGGLE_TO_OFF = 1 << 14;
        const RADIO = 1 << 15;
        const PUSHBUTTON = 1 << 16;
        const COMB = 1 << 24;
    }
}

/// Raw `/FT` field type code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFieldType {
    /// `/Tx`
    Text,
    /// `/Btn`
    Button,
    /// `/Ch`
    Choice,
    /// `/Sig`
    Signature,
    /// Anything else, kept verbatim
    Other(String),
}

impl RawFieldType {
    pub fn from_code(code: &str) -> Self {
        match code.trim_start_matches('/') {
            "Tx" => RawFieldType::Text,
            "Btn" => RawFieldType::Button,
            "Ch" => RawFieldType::Choice,
            "Sig" => RawFieldType::Signature,
            other => RawFieldType::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            RawFieldType::Text => "Tx",
            RawFieldType::Button => "Btn",
            RawFieldType::Choice => "Ch",
            RawFieldType::Signature => "Sig",
            RawFieldType::Other(code) => code,
        }
    }
}

/// Application-level field classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Checkbox,
    Radio,
    Button,
    Choice,
    Signature,
    Date,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Button => "button",
            FieldType::Choice => "choice",
            FieldType::Signature => "signature",
            FieldType::Date => "date",
        }
    }

    /// Parse a stored classification; unknown values fall back to `Text`
    pub fn from_str_lossy(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "textarea" => FieldType::Textarea,
            "checkbox" => FieldType::Checkbox,
            "radio" => FieldType::Radio,
            "button" => FieldType::Button,
            "choice" => FieldType::Choice,
            "signature" => FieldType::Signature,
            "date" => FieldType::Date,
            _ => FieldType::Text,
        }
    }

    /// Checkbox and radio widgets carry an on/off state
    pub fn is_toggle(&self) -> bool {
        matches!(self, FieldType::Checkbox | FieldType::Radio)
    }

    /// Fields rendered with a font from the shared resources
    pub fn is_text_bearing(&self) -> bool {
        !matches!(
            self,
            FieldType::Checkbox | FieldType::Radio | FieldType::Signature
        )
    }
}

/// Widget border style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Beveled,
    Inset,
    Underline,
    None,
}

impl BorderStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorderStyle::Solid => "solid",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Beveled => "beveled",
            BorderStyle::Inset => "inset",
            BorderStyle::Underline => "underline",
            BorderStyle::None => "none",
        }
    }

    pub fn from_str_lossy(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "dashed" => BorderStyle::Dashed,
            "beveled" => BorderStyle::Beveled,
            "inset" => BorderStyle::Inset,
            "underline" => BorderStyle::Underline,
            "none" => BorderStyle::None,
            _ => BorderStyle::Solid,
        }
    }

    /// `/BS /S` code. `None` is drawn as a zero-width solid border.
    pub fn pdf_code(&self) -> &'static str {
        match self {
            BorderStyle::Solid | BorderStyle::None => "S",
            BorderStyle::Dashed => "D",
            BorderStyle::Beveled => "B",
            BorderStyle::Inset => "I",
            BorderStyle::Underline => "U",
        }
    }

    pub fn from_pdf_code(code: &str) -> Self {
        match code.trim_start_matches('/') {
            "D" => BorderStyle::Dashed,
            "B" => BorderStyle::Beveled,
            "I" => BorderStyle::Inset,
            "U" => BorderStyle::Underline,
            _ => BorderStyle::Solid,
        }
    }
}

/// One of the three standard fonts supported for field text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontName {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl FontName {
    pub const ALL: [FontName; 3] = [FontName::Helvetica, FontName::Times, FontName::Courier];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontName::Helvetica => "Helvetica",
            FontName::Times => "Times",
            FontName::Courier => "Courier",
        }
    }

    /// Resource name used in `/DR /Font` and default appearance strings
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontName::Helvetica => "Helv",
            FontName::Times => "Times",
            FontName::Courier => "Cour",
        }
    }

    /// Standard 14 `/BaseFont` name
    pub fn base_font(&self) -> &'static str {
        match self {
            FontName::Helvetica => "Helvetica",
            FontName::Times => "Times-Roman",
            FontName::Courier => "Courier",
        }
    }

    /// Map a font or resource name to a supported font; unknown names are Helvetica
    pub fn from_name_lossy(name: &str) -> Self {
        let lower = name.trim_start_matches('/').to_ascii_lowercase();
        if lower.starts_with("cour") || lower == "co" {
            FontName::Courier
        } else if lower.starts_with("tim") || lower.starts_with("tiro") {
            FontName::Times
        } else {
            FontName::Helvetica
        }
    }
}

impl From<String> for FontName {
    fn from(value: String) -> Self {
        FontName::from_name_lossy(&value)
    }
}

impl From<FontName> for String {
    fn from(value: FontName) -> Self {
        value.as_str().to_string()
    }
}

/// RGB color with components in 0-1
pub type RgbColor = [f32; 3];

/// Default border color (black)
pub const DEFAULT_BORDER_COLOR: RgbColor = [0.0, 0.0, 0.0];

/// Editable form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Stable id, `field_{page}_{annotationIndex}` for extracted fields
    #[serde(default)]
    pub id: String,
    /// Fully qualified field name
    pub name: String,
    #[serde(default)]
    pub label: String,
    /// Name as first extracted; never edited
    #[serde(default)]
    pub original_name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub radio_group: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 0-indexed page
    pub page: u32,
    #[serde(default)]
    pub border_style: BorderStyle,
    #[serde(default = "default_border_width")]
    pub border_width: f64,
    #[serde(default = "default_border_color")]
    pub border_color: RgbColor,
    #[serde(default, alias = "font_family")]
    pub font_name: FontName,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub monospace: bool,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub date_format: Option<String>,
}

fn default_border_width() -> f64 {
    1.0
}

fn default_border_color() -> RgbColor {
    DEFAULT_BORDER_COLOR
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

impl FieldRecord {
    /// Create a record with default appearance
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        field_type: FieldType,
        page: u32,
        rect: TopLeftRect,
    ) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            label: name.clone(),
            original_name: name.clone(),
            name,
            field_type,
            value: String::new(),
            checked: false,
            radio_group: None,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            page,
            border_style: BorderStyle::Solid,
            border_width: default_border_width(),
            border_color: DEFAULT_BORDER_COLOR,
            font_name: FontName::Helvetica,
            font_size: DEFAULT_FONT_SIZE,
            monospace: false,
            max_length: None,
            date_format: None,
        }
    }

    pub fn rect(&self) -> TopLeftRect {
        TopLeftRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Positive character cap, if any
    pub fn effective_max_length(&self) -> Option<u32> {
        self.max_length.filter(|len| *len > 0)
    }

    /// Comb layout is only meaningful with a character cap
    pub fn is_comb(&self) -> bool {
        self.monospace && self.effective_max_length().is_some()
    }

    /// Check the data model invariants
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(FormError::invalid_field(&self.id, "id must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(FormError::invalid_field(&self.id, "name must not be empty"));
        }
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(FormError::invalid_field(
                &self.id,
                format!(
                    "font_size {} outside {}-{}",
                    self.font_size, MIN_FONT_SIZE, MAX_FONT_SIZE
                ),
            ));
        }
        for (label, value) in [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
            ("border_width", self.border_width),
        ] {
            if !value.is_finite() {
                return Err(FormError::invalid_field(
                    &self.id,
                    format!("{} must be a finite number", label),
                ));
            }
        }
        if self.width < 0.0 || self.height < 0.0 || self.border_width < 0.0 {
            return Err(FormError::invalid_field(
                &self.id,
                "width, height and border_width must not be negative",
            ));
        }
        if self
            .border_color
            .iter()
            .any(|c| !(0.0..=1.0).contains(c))
        {
            return Err(FormError::invalid_field(
                &self.id,
                "border_color components must be within 0-1",
            ));
        }
        if self.max_length == Some(0) {
            return Err(FormError::invalid_field(
                &self.id,
                "max_length must be positive when set",
            ));
        }
        Ok(())
    }
}

/// Rectangle in top-left-origin page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopLeftRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TopLeftRect {
    /// Convert a PDF `/Rect` (bottom-left origin) given the page height
    pub fn from_pdf_rect(rect: [f64; 4], page_height: f64) -> Self {
        let [x1, y1, x2, y2] = normalize_rect(rect);
        Self {
            x: x1,
            y: page_height - y2,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Convert back to integer-rounded PDF user-space corners
    pub fn to_pdf_rect(&self, page_height: f64) -> [i64; 4] {
        let pdf_y = page_height - self.y - self.height;
        [
            self.x.round() as i64,
            pdf_y.round() as i64,
            (self.x + self.width).round() as i64,
            (pdf_y + self.height).round() as i64,
        ]
    }
}

/// Order rectangle corners as `[llx, lly, urx, ury]`
pub fn normalize_rect(rect: [f64; 4]) -> [f64; 4] {
    let [a, b, c, d] = rect;
    [a.min(c), b.min(d), a.max(c), b.max(d)]
}

/// Result of one extraction pass
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedForm {
    pub num_pages: usize,
    pub fields: Vec<FieldRecord>,
}
