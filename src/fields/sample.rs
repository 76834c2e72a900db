//! Deriving preset fields from a sample package.json
//!
//! The sample is turned into a key tree: objects are branches, every other
//! value is a selectable leaf typed by its JSON kind.

use serde_json::{Map, Value};
use tracing::debug;

use super::value::{FieldType, FieldValue};
use crate::config::NewField;
use crate::error::{EditorError, Result};

/// One key of the sample document
#[derive(Debug, Clone, PartialEq)]
pub struct SampleNode {
    pub key: String,
    pub key_path: String,
    pub field_type: FieldType,
    pub value: Value,
    /// Present for objects (possibly empty)
    pub children: Option<Vec<SampleNode>>,
}

impl SampleNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Parse sample text into a key tree; the root must be an object
pub fn parse_sample_text(text: &str) -> Result<Vec<SampleNode>> {
    let value: Value = serde_json::from_str(text).map_err(|source| EditorError::InvalidJson {
        name: "sample file".to_string(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(parse_sample(&map)),
        _ => Err(EditorError::NotAnObject("sample file".to_string())),
    }
}

pub fn parse_sample(root: &Map<String, Value>) -> Vec<SampleNode> {
    parse_level(root, "")
}

fn parse_level(map: &Map<String, Value>, parent: &str) -> Vec<SampleNode> {
    map.iter()
        .map(|(key, value)| {
            let key_path = if parent.is_empty() {
                key.clone()
            } else {
                format!("{parent}.{key}")
            };
            let children = value.as_object().map(|child| parse_level(child, &key_path));
            SampleNode {
                key: key.clone(),
                field_type: if children.is_some() { FieldType::Text } else { FieldType::detect(value) },
                key_path,
                value: value.clone(),
                children,
            }
        })
        .collect()
}

/// Every selectable leaf in document order; empty objects are skipped
pub fn leaves(nodes: &[SampleNode]) -> Vec<&SampleNode> {
    let mut out = Vec::new();
    collect_leaves(nodes, &mut out);
    out
}

fn collect_leaves<'a>(nodes: &'a [SampleNode], out: &mut Vec<&'a SampleNode>) {
    for node in nodes {
        match &node.children {
            None => out.push(node),
            Some(children) => collect_leaves(children, out),
        }
    }
}

/// Build field definitions for the selected key-paths, in selection order
///
/// Unknown or non-leaf key-paths are skipped.
pub fn fields_from_sample<S: AsRef<str>>(nodes: &[SampleNode], selected: &[S]) -> Vec<NewField> {
    let all = leaves(nodes);
    selected
        .iter()
        .filter_map(|key_path| {
            let key_path = key_path.as_ref();
            let found = all.iter().find(|n| n.key_path == key_path);
            if found.is_none() {
                debug!(key_path = %key_path, "Selected key not found among sample leaves");
            }
            found
        })
        .map(|node| NewField {
            key_path: node.key_path.clone(),
            label: capitalize(&node.key),
            field_type: node.field_type,
            select_options: None,
            default_value: Some(sample_default(node)),
        })
        .collect()
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn sample_default(node: &SampleNode) -> FieldValue {
    match (&node.field_type, &node.value) {
        (FieldType::Boolean, Value::Bool(b)) => FieldValue::Boolean(*b),
        (FieldType::Number, Value::Number(n)) => FieldValue::Number(n.clone()),
        (_, Value::Null) => FieldValue::Text(String::new()),
        (_, value) => FieldValue::Text(display_text(value)),
    }
}

/// Text rendering used for leaf defaults (arrays comma-joined, nulls empty)
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
