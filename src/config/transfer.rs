//! Preset export/import file format

use serde::Deserialize;
use serde_json::Value;

use super::preset::{AppConfig, PresetField, backfill_field_ids};
use crate::constants::presets::{EXPORT_FILE_SUFFIX, RESERVED_FILE_NAME_CHARS};
use crate::error::{EditorError, Result};

/// A preset rendered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPreset {
    pub file_name: String,
    pub contents: String,
}

impl ExportedPreset {
    pub fn from_preset(preset: &AppConfig) -> Result<Self> {
        let contents = serde_json::to_string_pretty(preset).map_err(EditorError::Serialize)?;
        Ok(Self {
            file_name: export_file_name(&preset.preset_name),
            contents,
        })
    }
}

/// `My Preset` -> `my-preset-preset.json`
///
/// Path separators and other characters not allowed in file names become `-`,
/// so the result is always a single path component.
pub fn export_file_name(preset_name: &str) -> String {
    let mut name = String::with_capacity(preset_name.len() + EXPORT_FILE_SUFFIX.len());
    let mut in_whitespace = false;
    for c in preset_name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                name.push('-');
            }
            in_whitespace = true;
        } else if c.is_control() || RESERVED_FILE_NAME_CHARS.contains(&c) {
            name.push('-');
            in_whitespace = false;
        } else {
            name.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }
    name.push_str(EXPORT_FILE_SUFFIX);
    name
}

/// Preset content accepted by import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedPreset {
    pub preset_name: Option<String>,
    pub fields: Vec<PresetField>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportShape {
    #[serde(default)]
    preset_name: Option<String>,
    fields: Vec<PresetField>,
}

/// Parse an exported preset; the document must carry a `fields` array
///
/// Fields missing an id get a fresh one.
pub fn parse_import(text: &str) -> Result<ImportedPreset> {
    let value: Value = serde_json::from_str(text).map_err(|source| EditorError::InvalidJson {
        name: "preset file".to_string(),
        source,
    })?;
    if !value.get("fields").is_some_and(Value::is_array) {
        return Err(EditorError::InvalidPreset);
    }
    let shape: ImportShape = serde_json::from_value(value).map_err(|_| EditorError::InvalidPreset)?;

    let mut fields = shape.fields;
    backfill_field_ids(&mut fields);
    Ok(ImportedPreset {
        preset_name: shape.preset_name,
        fields,
    })
}
