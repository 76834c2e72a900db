//! Decoding of persisted preset state, including the legacy single-preset format
//!
//! Decode order: current `{activePresetId, presets}`, then legacy
//! `{presetName, fields}`, then the built-in default.

use serde::Deserialize;
use tracing::{info, warn};

use super::preset::{AppConfig, PresetField, PresetStore, backfill_field_ids, new_id};
use crate::constants::presets::DEFAULT_PRESET_NAME;

/// Single-preset format written by earlier versions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyConfig {
    #[serde(default = "default_preset_name")]
    preset_name: String,
    fields: Vec<PresetField>,
}

fn default_preset_name() -> String {
    DEFAULT_PRESET_NAME.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredState {
    Current(PresetStore),
    Legacy(LegacyConfig),
}

/// How the loaded state was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Nothing persisted yet
    Empty,
    Current,
    /// Current format with missing ids or a dangling active id fixed up
    Repaired,
    /// Migrated from the legacy single-preset format
    Legacy,
    /// Persisted data was unusable; defaults were used
    Fallback,
}

/// Decode persisted text into a valid store
///
/// Never fails: anything unusable yields the default store.
pub fn decode(text: Option<&str>) -> (PresetStore, LoadSource) {
    let Some(text) = text else {
        return (PresetStore::default(), LoadSource::Empty);
    };

    match serde_json::from_str::<StoredState>(text) {
        Ok(StoredState::Current(store)) => match normalize(store) {
            Some((store, false)) => (store, LoadSource::Current),
            Some((store, true)) => (store, LoadSource::Repaired),
            None => {
                warn!("Stored preset list is empty, using default preset");
                (PresetStore::default(), LoadSource::Fallback)
            }
        },
        Ok(StoredState::Legacy(legacy)) => {
            info!(preset = %legacy.preset_name, fields = legacy.fields.len(), "Migrating legacy preset format");
            (migrate(legacy), LoadSource::Legacy)
        }
        Err(e) => {
            warn!(error = %e, "Failed to decode stored presets, using default preset");
            (PresetStore::default(), LoadSource::Fallback)
        }
    }
}

fn migrate(legacy: LegacyConfig) -> PresetStore {
    let mut fields = legacy.fields;
    backfill_field_ids(&mut fields);
    PresetStore::from_single(AppConfig {
        id: new_id(),
        preset_name: legacy.preset_name,
        fields,
    })
}

/// Backfill ids and repair the active selection
///
/// `None` if there are no presets; otherwise the store and whether anything changed.
fn normalize(mut store: PresetStore) -> Option<(PresetStore, bool)> {
    if store.presets.is_empty() {
        return None;
    }

    let assigned: usize = store.presets.iter_mut().map(AppConfig::backfill_ids).sum();
    if assigned > 0 {
        info!(assigned, "Backfilled missing preset/field ids");
    }

    let dangling = store.find(&store.active_preset_id).is_none();
    if dangling {
        let first = store.presets[0].id.clone();
        warn!(active = %store.active_preset_id, fallback = %first, "Active preset not found, selecting first preset");
        store.active_preset_id = first;
    }
    Some((store, assigned > 0 || dangling))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;

    #[test]
    fn test_decode_nothing_stored() {
        let (store, source) = decode(None);
        assert_eq!(source, LoadSource::Empty);
        assert_eq!(store.presets.len(), 1);
        assert_eq!(store.presets[0].preset_name, DEFAULT_PRESET_NAME);
    }

    #[test]
    fn test_decode_legacy_format() {
        let text = r#"{"presetName":"Old","fields":[{"id":"x","keyPath":"version","label":"V","type":"text"}]}"#;
        let (store, source) = decode(Some(text));

        assert_eq!(source, LoadSource::Legacy);
        assert_eq!(store.presets.len(), 1);
        let preset = &store.presets[0];
        assert_eq!(preset.preset_name, "Old");
        assert!(!preset.id.is_empty());
        assert_eq!(store.active_preset_id, preset.id);
        assert_eq!(preset.fields[0].id, "x");
        assert_eq!(preset.fields[0].key_path, "version");
    }

    #[test]
    fn test_decode_legacy_assigns_fresh_preset_id_each_time() {
        let text = r#"{"presetName":"Old","fields":[]}"#;
        let (a, _) = decode(Some(text));
        let (b, _) = decode(Some(text));
        assert_ne!(a.presets[0].id, b.presets[0].id);
    }

    #[test]
    fn test_decode_current_format() {
        let text = r#"{
            "activePresetId": "p2",
            "presets": [
                {"id": "p1", "presetName": "One", "fields": []},
                {"id": "p2", "presetName": "Two", "fields": [
                    {"id": "f1", "keyPath": "scripts.build", "label": "Build", "type": "text"}
                ]}
            ]
        }"#;
        let (store, source) = decode(Some(text));
        assert_eq!(source, LoadSource::Current);
        assert_eq!(store.active_preset_id, "p2");
        assert_eq!(store.presets[1].fields[0].field_type, FieldType::Text);
    }

    #[test]
    fn test_decode_current_backfills_ids() {
        let text = r#"{
            "activePresetId": "",
            "presets": [{"presetName": "NoId", "fields": [{"keyPath": "name", "label": "Name", "type": "text"}]}]
        }"#;
        let (store, source) = decode(Some(text));
        assert_eq!(source, LoadSource::Repaired);
        let preset = &store.presets[0];
        assert!(!preset.id.is_empty());
        assert!(!preset.fields[0].id.is_empty());
        assert_eq!(store.active_preset_id, preset.id);
    }

    #[test]
    fn test_decode_repairs_dangling_active_id() {
        let text = r#"{"activePresetId":"gone","presets":[{"id":"p1","presetName":"One","fields":[]}]}"#;
        let (store, source) = decode(Some(text));
        assert_eq!(source, LoadSource::Repaired);
        assert_eq!(store.active_preset_id, "p1");
    }

    #[test]
    fn test_decode_empty_presets_falls_back() {
        let (store, source) = decode(Some(r#"{"activePresetId":"x","presets":[]}"#));
        assert_eq!(source, LoadSource::Fallback);
        assert_eq!(store.presets.len(), 1);
    }

    #[test]
    fn test_decode_garbage_falls_back() {
        for text in ["not json", "42", r#"{"unrelated":true}"#, r#"{"presets":"nope"}"#] {
            let (store, source) = decode(Some(text));
            assert_eq!(source, LoadSource::Fallback, "input: {text}");
            assert_eq!(store.presets[0].fields.len(), 5);
        }
    }
}
