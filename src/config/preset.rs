//! Preset data model
//!
//! A preset is a named, ordered list of editable fields. The store holds up
//! to `MAX_PRESETS` of them plus the id of the active one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::presets::DEFAULT_PRESET_NAME;
use crate::fields::{FieldType, FieldValue};

/// Fresh random identifier for presets and fields
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// One editable key-path and how to present it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetField {
    #[serde(default)]
    pub id: String,
    pub key_path: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
}

/// Field definition before an id is assigned
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewField {
    pub key_path: String,
    pub label: String,
    pub field_type: FieldType,
    pub select_options: Option<Vec<String>>,
    pub default_value: Option<FieldValue>,
}

impl NewField {
    pub fn new(key_path: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key_path: key_path.into(),
            label: label.into(),
            field_type,
            ..Self::default()
        }
    }

    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.select_options = Some(options);
        self
    }

    /// Assign a fresh id
    pub fn into_field(self) -> PresetField {
        PresetField {
            id: new_id(),
            key_path: self.key_path,
            label: self.label,
            field_type: self.field_type,
            select_options: self.select_options,
            default_value: self.default_value,
        }
    }
}

impl From<PresetField> for NewField {
    fn from(field: PresetField) -> Self {
        Self {
            key_path: field.key_path,
            label: field.label,
            field_type: field.field_type,
            select_options: field.select_options,
            default_value: field.default_value,
        }
    }
}

/// Partial field update; `None` leaves the attribute untouched
///
/// The optional attributes take `Some(None)` to clear them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldUpdate {
    pub key_path: Option<String>,
    pub label: Option<String>,
    pub field_type: Option<FieldType>,
    pub select_options: Option<Option<Vec<String>>>,
    pub default_value: Option<Option<FieldValue>>,
}

impl FieldUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl PresetField {
    /// Shallow-merge an update into this field
    pub fn apply(&mut self, update: FieldUpdate) {
        if let Some(key_path) = update.key_path {
            self.key_path = key_path;
        }
        if let Some(label) = update.label {
            self.label = label;
        }
        if let Some(field_type) = update.field_type {
            self.field_type = field_type;
        }
        if let Some(select_options) = update.select_options {
            self.select_options = select_options;
        }
        if let Some(default_value) = update.default_value {
            self.default_value = default_value;
        }
    }

    /// Same definition under a new id
    pub fn with_fresh_id(&self) -> Self {
        Self {
            id: new_id(),
            ..self.clone()
        }
    }
}

/// A named, ordered field set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub id: String,
    pub preset_name: String,
    #[serde(default)]
    pub fields: Vec<PresetField>,
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            preset_name: name.into(),
            fields: Vec::new(),
        }
    }

    /// The built-in preset covering the common package.json keys
    pub fn default_preset() -> Self {
        Self {
            id: new_id(),
            preset_name: DEFAULT_PRESET_NAME.to_string(),
            fields: default_fields(),
        }
    }

    /// Give the preset and any of its fields an id if they lack one
    ///
    /// Returns how many ids were assigned.
    pub fn backfill_ids(&mut self) -> usize {
        let mut assigned = 0;
        if self.id.is_empty() {
            self.id = new_id();
            assigned += 1;
        }
        assigned + backfill_field_ids(&mut self.fields)
    }
}

/// Assign ids to fields that have none
pub fn backfill_field_ids(fields: &mut [PresetField]) -> usize {
    let mut assigned = 0;
    for field in fields.iter_mut().filter(|f| f.id.is_empty()) {
        field.id = new_id();
        assigned += 1;
    }
    assigned
}

/// Fields of the built-in preset, each with a fresh id
pub fn default_fields() -> Vec<PresetField> {
    vec![
        NewField::new("version", "Version", FieldType::Text)
            .with_default(FieldValue::Text("1.0.0".to_string())),
        NewField::new("name", "Package Name", FieldType::Text),
        NewField::new("description", "Description", FieldType::Text),
        NewField::new("author", "Author", FieldType::Text),
        NewField::new("private", "Private", FieldType::Boolean).with_default(FieldValue::Boolean(false)),
    ]
    .into_iter()
    .map(NewField::into_field)
    .collect()
}

/// Persisted root: every preset plus the active selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetStore {
    #[serde(default)]
    pub active_preset_id: String,
    pub presets: Vec<AppConfig>,
}

impl Default for PresetStore {
    fn default() -> Self {
        Self::from_single(AppConfig::default_preset())
    }
}

impl PresetStore {
    /// Store holding exactly one preset, which is active
    pub fn from_single(preset: AppConfig) -> Self {
        Self {
            active_preset_id: preset.id.clone(),
            presets: vec![preset],
        }
    }

    pub fn find(&self, id: &str) -> Option<&AppConfig> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.presets.iter().position(|p| p.id == id)
    }
}
