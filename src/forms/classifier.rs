//! Field classification
//!
//! Turns a [`RawWidget`] into a [`FieldRecord`] with a user-meaningful
//! [`FieldType`], resolved checked state and read-back appearance.

use super::collector::RawWidget;
use super::types::{
    BorderStyle, FieldFlags, FieldRecord, FieldType, FontName, RawFieldType, DEFAULT_BORDER_COLOR,
    DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE,
};

const OFF_STATE: &str = "Off";
const DEFAULT_EXPORT_VALUE: &str = "Yes";

/// Name fragments (English and French) that suggest a date field
pub const DATE_KEYWORDS: &[&str] = &[
    "date",
    "dob",
    "birth",
    "expir",
    "issued",
    "naissance",
    "echeance",
    "échéance",
    "jour",
    "fait_le",
    "fait le",
    "signe_le",
];

/// Name fragments marking a spelled-out text rendering rather than a date
pub const DATE_EXCLUSIONS: &[&str] = &[
    "lettre",
    "letter",
    "words",
    "spelled",
    "written",
    "texte",
];

/// Classification tuning
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Single-line text widgets taller than this become textareas
    pub textarea_min_height: f64,
    pub date_keywords: Vec<String>,
    pub date_exclusions: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            textarea_min_height: 40.0,
            date_keywords: DATE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            date_exclusions: DATE_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Classifies raw widgets into field records
#[derive(Debug, Clone, Default)]
pub struct FieldClassifier {
    config: ClassifierConfig,
}

impl FieldClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Build the field record for one widget
    pub fn classify(&self, widget: &RawWidget) -> FieldRecord {
        let field_type = self.field_type(widget);
        let mut record = FieldRecord::new(
            widget.record_id(),
            widget.name.clone(),
            field_type,
            widget.page,
            widget.rect,
        );

        record.label = widget
            .tooltip
            .as_deref()
            .map(str::trim)
            .filter(|tip| !tip.is_empty())
            .unwrap_or(&widget.name)
            .to_string();

        if field_type.is_toggle() {
            let (value, checked) = toggle_state(widget);
            record.value = value;
            record.checked = checked;
        } else {
            record.value = widget.value.clone().unwrap_or_default();
        }

        if field_type == FieldType::Radio {
            record.radio_group = widget.parent_name.clone();
        }

        record.max_length = widget
            .max_length
            .filter(|len| *len > 0)
            .and_then(|len| u32::try_from(len).ok());
        record.monospace = widget.raw_type == RawFieldType::Text
            && widget.flags.contains(FieldFlags::COMB)
            && record.max_length.is_some();

        if let Some(da) = widget.default_appearance.as_deref() {
            let (font, size) = parse_default_appearance(da);
            record.font_name = font.unwrap_or_default();
            record.font_size = size.unwrap_or(DEFAULT_FONT_SIZE);
        }

        let width = widget.border.width.unwrap_or(1.0).max(0.0);
        record.border_width = width;
        record.border_color = widget.border.color.unwrap_or(DEFAULT_BORDER_COLOR);
        record.border_style = if width == 0.0 || widget.border.color.is_none() {
            BorderStyle::None
        } else {
            widget.border.style.unwrap_or_default()
        };

        record
    }

    /// Decision table over raw type and flags, then the text overrides
    pub fn field_type(&self, widget: &RawWidget) -> FieldType {
        match widget.raw_type {
            RawFieldType::Button => {
                if widget.flags.contains(FieldFlags::PUSHBUTTON) {
                    FieldType::Button
                } else if widget.flags.contains(FieldFlags::RADIO) {
                    FieldType::Radio
                } else {
                    FieldType::Checkbox
                }
            }
            RawFieldType::Text => {
                if widget.flags.contains(FieldFlags::MULTILINE)
                    || widget.rect.height > self.config.textarea_min_height
                {
                    FieldType::Textarea
                } else if self.looks_like_date(&widget.name) {
                    FieldType::Date
                } else {
                    FieldType::Text
                }
            }
            RawFieldType::Choice => FieldType::Choice,
            RawFieldType::Signature => FieldType::Signature,
            RawFieldType::Other(_) => FieldType::Text,
        }
    }

    /// Name-based date heuristic: a keyword hit with no exclusion hit
    pub fn looks_like_date(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        let contains_any = |needles: &[String]| needles.iter().any(|n| lower.contains(n.as_str()));
        contains_any(&self.config.date_keywords) && !contains_any(&self.config.date_exclusions)
    }
}

/// Resolve the stored export value and checked state of a checkbox or radio
fn toggle_state(widget: &RawWidget) -> (String, bool) {
    let current = widget
        .value
        .as_deref()
        .or(widget.appearance_state.as_deref())
        .map(strip_name_delimiter)
        .unwrap_or("");
    let is_on = |v: &str| !v.is_empty() && v != OFF_STATE;

    let export = widget
        .export_value
        .as_deref()
        .map(strip_name_delimiter)
        .filter(|v| is_on(v))
        .or_else(|| Some(current).filter(|v| is_on(v)))
        .unwrap_or(DEFAULT_EXPORT_VALUE)
        .to_string();

    let checked = is_on(current) && current == export;
    (export, checked)
}

fn strip_name_delimiter(value: &str) -> &str {
    value.strip_prefix('/').unwrap_or(value)
}

/// Parse a default appearance string such as `/Helv 10 Tf 0 g`.
///
/// A zero (auto) size yields `None`; other sizes are clamped to the
/// supported range.
pub fn parse_default_appearance(da: &str) -> (Option<FontName>, Option<f64>) {
    let tokens: Vec<&str> = da.split_whitespace().collect();
    let Some(tf) = tokens.iter().rposition(|t| *t == "Tf") else {
        return (None, None);
    };
    if tf < 2 {
        return (None, None);
    }

    let font = tokens[tf - 2]
        .strip_prefix('/')
        .map(FontName::from_name_lossy);
    let size = tokens[tf - 1]
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| s.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE));
    (font, size)
}
