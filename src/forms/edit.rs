//! Field editing
//!
//! Edits go through [`FieldUpdate`], a closed set of editable attributes.
//! Unknown keys are rejected when the update is deserialized, and every
//! edit is validated before it is committed.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use super::error::Result;
use super::types::{BorderStyle, FieldRecord, FieldType, FontName, RgbColor};

/// Partial update of a field's editable attributes.
///
/// `id` and `original_name` are not editable. Nullable attributes use
/// a double option: a missing key leaves the value alone, `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldUpdate {
    pub name: Option<String>,
    pub label: Option<String>,
    pub field_type: Option<FieldType>,
    pub value: Option<String>,
    pub checked: Option<bool>,
    #[serde(default, deserialize_with = "nullable", alias = "radioGroup")]
    pub radio_group: Option<Option<String>>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub page: Option<u32>,
    #[serde(alias = "borderStyle")]
    pub border_style: Option<BorderStyle>,
    #[serde(alias = "borderWidth")]
    pub border_width: Option<f64>,
    #[serde(alias = "borderColor")]
    pub border_color: Option<RgbColor>,
    #[serde(alias = "fontFamily", alias = "font_family")]
    pub font_name: Option<FontName>,
    #[serde(alias = "fontSize")]
    pub font_size: Option<f64>,
    pub monospace: Option<bool>,
    #[serde(default, deserialize_with = "nullable", alias = "maxLength")]
    pub max_length: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable", alias = "dateFormat")]
    pub date_format: Option<Option<String>>,
}

fn nullable<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl FieldUpdate {
    pub fn is_empty(&self) -> bool {
        *self == FieldUpdate::default()
    }

    fn apply_to(&self, record: &mut FieldRecord) {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(v) = &self.$field {
                    record.$field = v.clone();
                })*
            };
        }
        set!(
            name,
            label,
            field_type,
            value,
            checked,
            radio_group,
            x,
            y,
            width,
            height,
            page,
            border_style,
            border_width,
            border_color,
            font_name,
            font_size,
            monospace,
            max_length,
            date_format
        );
    }
}

/// Whether `key` addresses `record` by id or by name
pub fn matches_key(record: &FieldRecord, key: &str) -> bool {
    record.id == key || record.name == key
}

/// Apply `update` to `record`; on a validation failure `record` is unchanged
pub fn apply_update(record: &mut FieldRecord, update: &FieldUpdate) -> Result<()> {
    let mut candidate = record.clone();
    update.apply_to(&mut candidate);
    candidate.validate()?;
    *record = candidate;
    Ok(())
}

/// Whether an upsert replaced an existing record or appended a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Replace the record matching `incoming` by id (then by name), or append it.
///
/// A replaced record keeps its stored `original_name`. Returns the stored
/// record.
pub fn upsert_field(
    fields: &mut Vec<FieldRecord>,
    mut incoming: FieldRecord,
) -> Result<(Upsert, FieldRecord)> {
    let position = fields
        .iter()
        .position(|f| !incoming.id.is_empty() && f.id == incoming.id)
        .or_else(|| fields.iter().position(|f| f.name == incoming.name));

    if let Some(existing) = position.map(|i| &fields[i]) {
        incoming.id = existing.id.clone();
        incoming.original_name = existing.original_name.clone();
    }
    if incoming.id.trim().is_empty() {
        incoming.id = format!("field_{}", Uuid::new_v4().simple());
    }
    if incoming.original_name.is_empty() {
        incoming.original_name = incoming.name.clone();
    }
    if incoming.label.is_empty() {
        incoming.label = incoming.name.clone();
    }
    incoming.validate()?;

    match position {
        Some(i) => {
            fields[i] = incoming.clone();
            Ok((Upsert::Updated, incoming))
        }
        None => {
            fields.push(incoming.clone());
            Ok((Upsert::Created, incoming))
        }
    }
}

/// Apply one update to every record addressed by `keys`.
///
/// All-or-nothing: if any edited record fails validation nothing changes.
/// Returns the number of records updated.
pub fn bulk_update(fields: &mut [FieldRecord], keys: &[String], update: &FieldUpdate) -> Result<usize> {
    let mut staged = Vec::new();
    for (i, record) in fields.iter().enumerate() {
        if keys.iter().any(|key| matches_key(record, key)) {
            let mut candidate = record.clone();
            apply_update(&mut candidate, update)?;
            staged.push((i, candidate));
        }
    }

    let count = staged.len();
    for (i, candidate) in staged {
        fields[i] = candidate;
    }
    Ok(count)
}

/// Remove every record addressed by `keys`, returning how many were removed
pub fn remove_fields(fields: &mut Vec<FieldRecord>, keys: &[String]) -> usize {
    let before = fields.len();
    fields.retain(|record| !keys.iter().any(|key| matches_key(record, key)));
    before - fields.len()
}
