//! Dot-delimited key-path addressing into JSON documents
//!
//! `scripts.build` addresses `{"scripts": {"build": ...}}`. Segments that
//! look like array indices (`files.0`) address array elements when the node
//! at that point is an array.

use serde_json::{Map, Value};

use crate::constants::key_path::{MAX_INDEX_GAP, SEPARATOR};
use crate::error::{EditorError, Result};

/// Split a key-path into its segments
///
/// Splitting is literal: `"a..b"` yields an empty middle segment and `""`
/// yields a single empty segment.
pub fn parse_key_path(key_path: &str) -> Vec<&str> {
    key_path.split(SEPARATOR).collect()
}

/// Canonical array index (`0`, `12`, never `01` or `+1`)
fn index_of(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical { segment.parse().ok() } else { None }
}

/// Read the value at `key_path`, or `None` if any segment is missing
pub fn get_value<'a>(root: &'a Value, key_path: &str) -> Option<&'a Value> {
    parse_key_path(key_path)
        .into_iter()
        .try_fold(root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => index_of(segment).and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Write `value` at `key_path`, creating intermediate containers as needed
///
/// A missing or scalar intermediate becomes an array when the next segment
/// is an index and an object otherwise. An index more than `MAX_INDEX_GAP`
/// past the end of its array is rejected; containers created before that
/// point stay in `root`, so callers write into a copy.
pub fn set_value(root: &mut Value, key_path: &str, value: Value) -> Result<()> {
    let segments = parse_key_path(key_path);
    let out_of_range = |segment: &str| EditorError::IndexOutOfRange {
        key_path: key_path.to_string(),
        index: segment.to_string(),
    };
    let mut node = root;
    for pair in segments.windows(2) {
        let (segment, next) = (pair[0], pair[1]);
        let slot = slot_mut(node, segment).ok_or_else(|| out_of_range(segment))?;
        if !(slot.is_object() || slot.is_array()) {
            *slot = match index_of(next) {
                Some(_) => Value::Array(Vec::new()),
                None => Value::Object(Map::new()),
            };
        }
        node = slot;
    }
    if let Some(last) = segments.last() {
        *slot_mut(node, last).ok_or_else(|| out_of_range(last))? = value;
    }
    Ok(())
}

/// Child slot for `segment`, inserting `null` if absent
///
/// `None` when an array would have to grow past `MAX_INDEX_GAP`.
fn slot_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    let index = index_of(segment).filter(|_| node.is_array());
    match (node, index) {
        (Value::Array(items), Some(i)) => {
            let len = i.checked_add(1)?;
            if len > items.len().saturating_add(MAX_INDEX_GAP) {
                return None;
            }
            if items.len() < len {
                items.resize(len, Value::Null);
            }
            Some(&mut items[i])
        }
        (node, _) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            Some(&mut node[segment])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_path() {
        assert_eq!(parse_key_path("config.theme.color"), vec!["config", "theme", "color"]);
        assert_eq!(parse_key_path("version"), vec!["version"]);
        assert_eq!(parse_key_path("a..b"), vec!["a", "", "b"]);
        assert_eq!(parse_key_path(""), vec![""]);
    }

    #[test]
    fn test_get_value_present_and_missing() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(get_value(&doc, "a.b"), Some(&json!(1)));
        assert_eq!(get_value(&doc, "a.c"), None);
        assert_eq!(get_value(&doc, "x.y"), None);
        assert_eq!(get_value(&doc, "a.b.c"), None);
    }

    #[test]
    fn test_get_value_array_index() {
        let doc = json!({"files": ["dist", "lib"]});
        assert_eq!(get_value(&doc, "files.1"), Some(&json!("lib")));
        assert_eq!(get_value(&doc, "files.2"), None);
        assert_eq!(get_value(&doc, "files.01"), None);
    }

    #[test]
    fn test_set_value_creates_intermediates() {
        let mut doc = json!({});
        set_value(&mut doc, "a.b.c", json!(5)).unwrap();
        assert_eq!(doc, json!({"a": {"b": {"c": 5}}}));
    }

    #[test]
    fn test_set_value_overwrites_existing() {
        let mut doc = json!({"name": "old", "scripts": {"test": "jest"}});
        set_value(&mut doc, "scripts.build", json!("tsc")).unwrap();
        set_value(&mut doc, "name", json!("new")).unwrap();
        assert_eq!(doc, json!({"name": "new", "scripts": {"test": "jest", "build": "tsc"}}));
    }

    #[test]
    fn test_set_value_replaces_scalar_intermediate() {
        let mut doc = json!({"a": 1});
        set_value(&mut doc, "a.b", json!(true)).unwrap();
        assert_eq!(doc, json!({"a": {"b": true}}));
    }

    #[test]
    fn test_set_value_array_paths() {
        let mut doc = json!({"files": ["dist"]});
        set_value(&mut doc, "files.0", json!("lib")).unwrap();
        assert_eq!(doc, json!({"files": ["lib"]}));

        let mut doc = json!({});
        set_value(&mut doc, "list.1.name", json!("x")).unwrap();
        assert_eq!(doc, json!({"list": [null, {"name": "x"}]}));
    }

    #[test]
    fn test_set_value_preserves_key_order() {
        let mut doc: Value = serde_json::from_str(r#"{"name":"a","version":"1.0.0","main":"index.js"}"#).unwrap();
        set_value(&mut doc, "version", json!("2.0.0")).unwrap();
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["name", "version", "main"]);
    }

    #[test]
    fn test_set_value_rejects_far_index() {
        let mut doc = json!({"files": ["dist"]});
        let err = set_value(&mut doc, "files.4000000000", json!("x")).unwrap_err();
        assert!(matches!(err, EditorError::IndexOutOfRange { ref index, .. } if index == "4000000000"));
        assert_eq!(doc, json!({"files": ["dist"]}));

        let max = format!("files.{}", usize::MAX);
        assert!(set_value(&mut doc, &max, json!("x")).is_err());
        assert_eq!(doc, json!({"files": ["dist"]}));
    }

    #[test]
    fn test_set_value_far_index_in_new_array() {
        let mut doc = json!({});
        assert!(set_value(&mut doc, "list.5000.name", json!("x")).is_err());

        let mut doc = json!({});
        let edge = format!("list.{}", MAX_INDEX_GAP - 1);
        set_value(&mut doc, &edge, json!(true)).unwrap();
        assert_eq!(doc["list"].as_array().unwrap().len(), MAX_INDEX_GAP);
    }
}
