//! Sample document showing what a preset's fields produce

use serde_json::{Map, Value};

use super::value::FieldType;
use crate::config::PresetField;
use crate::document::key_path::set_value;
use crate::error::{EditorError, Result};

/// Placeholder value for a field: its default, else a type-appropriate stand-in
pub fn sample_value(field: &PresetField) -> Value {
    if let Some(default) = &field.default_value {
        return default.to_json();
    }
    match field.field_type {
        FieldType::Text => Value::String(format!("<{}>", field.label)),
        FieldType::Number => Value::from(0),
        FieldType::Boolean => Value::Bool(false),
        FieldType::Select => Value::String(
            field
                .select_options
                .as_ref()
                .and_then(|options| options.first())
                .cloned()
                .unwrap_or_default(),
        ),
    }
}

/// Document built by writing every field's sample value in field order
///
/// Later fields with the same key-path overwrite earlier ones.
pub fn build_preview(fields: &[PresetField]) -> Result<Value> {
    let mut document = Value::Object(Map::new());
    for field in fields {
        set_value(&mut document, &field.key_path, sample_value(field))?;
    }
    Ok(document)
}

pub fn render_preview(fields: &[PresetField]) -> Result<String> {
    serde_json::to_string_pretty(&build_preview(fields)?).map_err(EditorError::Serialize)
}
