//! Preset store: bounded collection of presets with write-through persistence

use tracing::{debug, error, info, warn};

use super::migration::{self, LoadSource};
use super::preset::{AppConfig, FieldUpdate, NewField, PresetField, PresetStore, default_fields};
use super::storage::PresetStorage;
use super::transfer::{self, ExportedPreset};
use crate::constants::presets::{COPY_SUFFIX, MAX_PRESETS};
use crate::error::Result;

/// Owns the preset collection and persists every change
///
/// Writes are suppressed until `load` has run so the transient default
/// state never overwrites what is stored.
pub struct PresetManager<S: PresetStorage> {
    storage: S,
    store: PresetStore,
    loaded: bool,
}

impl<S: PresetStorage> PresetManager<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            store: PresetStore::default(),
            loaded: false,
        }
    }

    /// Construct and load in one step
    pub fn open(storage: S) -> Self {
        let mut manager = Self::new(storage);
        manager.load();
        manager
    }

    /// Restore persisted state, migrating or falling back to defaults as needed
    pub fn load(&mut self) -> LoadSource {
        let (text, readable) = match self.storage.read() {
            Ok(text) => (text, true),
            Err(e) => {
                error!(error = ?e, "Failed to read stored presets");
                (None, false)
            }
        };

        let (store, source) = migration::decode(text.as_deref());
        let source = if readable { source } else { LoadSource::Fallback };
        info!(presets = store.presets.len(), source = ?source, "Loaded presets");

        self.store = store;
        self.loaded = true;
        // Unreadable storage is left alone until the user changes something
        if readable && source != LoadSource::Current {
            self.save();
        }
        source
    }

    /// Write the whole store through the storage port (best effort)
    pub fn save(&mut self) {
        if !self.loaded {
            debug!("Skipping preset save before load");
            return;
        }
        match serde_json::to_string_pretty(&self.store) {
            Ok(contents) => {
                if let Err(e) = self.storage.write(&contents) {
                    error!(error = ?e, "Failed to persist presets");
                }
            }
            Err(e) => error!(error = %e, "Failed to serialize presets"),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn store(&self) -> &PresetStore {
        &self.store
    }

    pub fn presets(&self) -> &[AppConfig] {
        &self.store.presets
    }

    pub fn active_preset_id(&self) -> &str {
        &self.store.active_preset_id
    }

    /// The active preset, or the first one if the active id does not resolve
    pub fn config(&self) -> &AppConfig {
        let index = self.active_index();
        &self.store.presets[index]
    }

    pub fn can_create_preset(&self) -> bool {
        self.store.presets.len() < MAX_PRESETS
    }

    pub fn can_delete_preset(&self) -> bool {
        self.store.presets.len() > 1
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Append an empty preset and make it active; `None` at the cap
    pub fn create_preset(&mut self, name: &str) -> Option<AppConfig> {
        if !self.can_create_preset() {
            warn!(max = MAX_PRESETS, "Preset limit reached, not creating preset");
            return None;
        }
        let preset = AppConfig::new(name);
        info!(preset = %preset.preset_name, id = %preset.id, "Created preset");
        Some(self.push_active(preset))
    }

    /// Copy a preset (fields get new ids) and make the copy active
    ///
    /// `None` at the cap or if `id` is unknown.
    pub fn duplicate_preset(&mut self, id: &str) -> Option<AppConfig> {
        if !self.can_create_preset() {
            warn!(max = MAX_PRESETS, "Preset limit reached, not duplicating preset");
            return None;
        }
        let Some(source) = self.store.find(id) else {
            warn!(id = %id, "Cannot duplicate unknown preset");
            return None;
        };
        let mut copy = AppConfig::new(format!("{}{}", source.preset_name, COPY_SUFFIX));
        copy.fields = source.fields.iter().map(PresetField::with_fresh_id).collect();
        info!(source = %id, preset = %copy.preset_name, "Duplicated preset");
        Some(self.push_active(copy))
    }

    /// Remove a preset; refused for the last remaining one
    ///
    /// If the active preset is removed, the first remaining preset becomes active.
    pub fn delete_preset(&mut self, id: &str) -> bool {
        if !self.can_delete_preset() {
            warn!("Cannot delete the last preset");
            return false;
        }
        let Some(index) = self.store.position(id) else {
            warn!(id = %id, "Cannot delete unknown preset");
            return false;
        };

        let removed = self.store.presets.remove(index);
        if self.store.active_preset_id == removed.id {
            self.store.active_preset_id = self.store.presets[0].id.clone();
        }
        info!(preset = %removed.preset_name, active = %self.store.active_preset_id, "Deleted preset");
        self.save();
        true
    }

    /// Select a preset; ids are trusted to come from this store
    pub fn switch_preset(&mut self, id: &str) {
        self.store.active_preset_id = id.to_string();
        info!(id = %id, "Switched preset");
        self.save();
    }

    /// Append a field to the active preset
    pub fn add_field(&mut self, field: NewField) -> PresetField {
        self.add_fields(vec![field]).remove(0)
    }

    /// Append several fields to the active preset, in order
    pub fn add_fields(&mut self, fields: Vec<NewField>) -> Vec<PresetField> {
        let created: Vec<PresetField> = fields.into_iter().map(NewField::into_field).collect();
        self.active_mut().fields.extend(created.iter().cloned());
        info!(count = created.len(), "Added fields");
        self.save();
        created
    }

    /// Shallow-merge `update` into a field of the active preset
    pub fn update_field(&mut self, id: &str, update: FieldUpdate) -> bool {
        let Some(field) = self.active_mut().fields.iter_mut().find(|f| f.id == id) else {
            warn!(id = %id, "Cannot update unknown field");
            return false;
        };
        field.apply(update);
        debug!(id = %id, key_path = %field.key_path, "Updated field");
        self.save();
        true
    }

    /// Remove a field from the active preset
    pub fn delete_field(&mut self, id: &str) -> bool {
        let fields = &mut self.active_mut().fields;
        let before = fields.len();
        fields.retain(|f| f.id != id);
        if fields.len() == before {
            warn!(id = %id, "Cannot delete unknown field");
            return false;
        }
        debug!(id = %id, "Deleted field");
        self.save();
        true
    }

    /// Move `active_id` to the position currently held by `over_id`
    pub fn reorder_fields(&mut self, active_id: &str, over_id: &str) -> bool {
        let fields = &mut self.active_mut().fields;
        let from = fields.iter().position(|f| f.id == active_id);
        let to = fields.iter().position(|f| f.id == over_id);
        let (Some(from), Some(to)) = (from, to) else {
            debug!(active = %active_id, over = %over_id, "Reorder ignored, field not found");
            return false;
        };
        let moved = fields.remove(from);
        fields.insert(to, moved);
        debug!(from, to, "Reordered fields");
        self.save();
        true
    }

    pub fn update_preset_name(&mut self, name: &str) {
        self.active_mut().preset_name = name.to_string();
        info!(preset = %name, "Renamed preset");
        self.save();
    }

    /// Render the active preset for download
    pub fn export_config(&self) -> Result<ExportedPreset> {
        let exported = ExportedPreset::from_preset(self.config())?;
        info!(file = %exported.file_name, "Exported preset");
        Ok(exported)
    }

    /// Replace the active preset's name and fields with an exported preset
    ///
    /// The active preset keeps its id. Invalid input leaves everything untouched.
    pub fn import_config(&mut self, text: &str) -> Result<()> {
        let imported = transfer::parse_import(text)?;
        let preset = self.active_mut();
        if let Some(name) = imported.preset_name {
            preset.preset_name = name;
        }
        preset.fields = imported.fields;
        info!(preset = %preset.preset_name, fields = preset.fields.len(), "Imported preset");
        self.save();
        Ok(())
    }

    /// Restore the built-in field set on the active preset
    pub fn reset_to_default(&mut self) {
        self.active_mut().fields = default_fields();
        info!("Reset active preset to default fields");
        self.save();
    }

    fn active_index(&self) -> usize {
        self.store.position(&self.store.active_preset_id).unwrap_or(0)
    }

    fn active_mut(&mut self) -> &mut AppConfig {
        let index = self.active_index();
        &mut self.store.presets[index]
    }

    fn push_active(&mut self, preset: AppConfig) -> AppConfig {
        self.store.active_preset_id = preset.id.clone();
        self.store.presets.push(preset.clone());
        self.save();
        preset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::storage::MemoryStorage;
    use crate::constants::presets::DEFAULT_PRESET_NAME;
    use crate::fields::{FieldType, FieldValue};
    use anyhow::anyhow;

    fn manager() -> PresetManager<MemoryStorage> {
        PresetManager::open(MemoryStorage::new())
    }

    fn stored(manager: &PresetManager<MemoryStorage>) -> PresetStore {
        serde_json::from_str(&manager.storage().contents().unwrap()).unwrap()
    }

    fn labels(manager: &PresetManager<MemoryStorage>) -> Vec<String> {
        manager.config().fields.iter().map(|f| f.label.clone()).collect()
    }

    struct BrokenStorage;

    impl PresetStorage for BrokenStorage {
        fn read(&self) -> anyhow::Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }

        fn write(&mut self, _contents: &str) -> anyhow::Result<()> {
            Err(anyhow!("disk on fire"))
        }
    }

    #[test]
    fn test_no_writes_before_load() {
        let storage = MemoryStorage::new();
        let mut manager = PresetManager::new(storage.clone());
        manager.create_preset("Early");
        assert!(!manager.is_loaded());
        assert!(storage.contents().is_none());
    }

    #[test]
    fn test_load_empty_writes_default() {
        let manager = manager();
        assert!(manager.is_loaded());
        let store = stored(&manager);
        assert_eq!(store.presets.len(), 1);
        assert_eq!(store.presets[0].preset_name, DEFAULT_PRESET_NAME);
    }

    #[test]
    fn test_load_legacy_persists_current_format() {
        let storage = MemoryStorage::with_contents(
            r#"{"presetName":"Old","fields":[{"id":"x","keyPath":"version","label":"V","type":"text"}]}"#,
        );
        let mut manager = PresetManager::new(storage.clone());
        assert_eq!(manager.load(), LoadSource::Legacy);

        assert_eq!(manager.presets().len(), 1);
        assert_eq!(manager.config().preset_name, "Old");
        let saved: PresetStore = serde_json::from_str(&storage.contents().unwrap()).unwrap();
        assert_eq!(saved.active_preset_id, manager.active_preset_id());
    }

    #[test]
    fn test_backfilled_ids_are_stable_across_loads() {
        let storage = MemoryStorage::with_contents(
            r#"{"activePresetId":"","presets":[
                {"presetName":"A","fields":[{"keyPath":"name","label":"Name","type":"text"}]},
                {"presetName":"B","fields":[]}
            ]}"#,
        );
        let ids = |manager: &PresetManager<MemoryStorage>| -> Vec<String> {
            manager
                .presets()
                .iter()
                .flat_map(|p| std::iter::once(p.id.clone()).chain(p.fields.iter().map(|f| f.id.clone())))
                .collect()
        };

        let mut first = PresetManager::new(storage.clone());
        assert_eq!(first.load(), LoadSource::Repaired);
        let mut second = PresetManager::new(storage);
        assert_eq!(second.load(), LoadSource::Current);

        assert_eq!(ids(&first), ids(&second));
        assert_eq!(second.active_preset_id(), first.active_preset_id());
    }

    #[test]
    fn test_load_survives_broken_storage() {
        let mut manager = PresetManager::new(BrokenStorage);
        assert_eq!(manager.load(), LoadSource::Fallback);
        assert_eq!(manager.config().fields.len(), 5);
        // Write failures are logged, not surfaced
        assert!(manager.create_preset("Still works").is_some());
    }

    #[test]
    fn test_create_respects_cap() {
        let mut manager = manager();
        for i in 1..MAX_PRESETS {
            assert!(manager.create_preset(&format!("P{i}")).is_some());
        }
        assert_eq!(manager.presets().len(), MAX_PRESETS);
        assert!(!manager.can_create_preset());

        let active = manager.active_preset_id().to_string();
        assert!(manager.create_preset("One too many").is_none());
        assert_eq!(manager.presets().len(), MAX_PRESETS);
        assert_eq!(manager.active_preset_id(), active);
    }

    #[test]
    fn test_create_activates_empty_preset() {
        let mut manager = manager();
        let created = manager.create_preset("Web").unwrap();
        assert_eq!(manager.active_preset_id(), created.id);
        assert!(manager.config().fields.is_empty());
        assert_eq!(stored(&manager).presets.len(), 2);
    }

    #[test]
    fn test_duplicate_copies_with_fresh_ids() {
        let mut manager = manager();
        let original = manager.config().clone();
        let copy = manager.duplicate_preset(&original.id).unwrap();

        assert_eq!(copy.preset_name, "Default Preset (copy)");
        assert_eq!(manager.active_preset_id(), copy.id);
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.fields.len(), original.fields.len());
        for (a, b) in original.fields.iter().zip(copy.fields.iter()) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.key_path, b.key_path);
            assert_eq!(a.default_value, b.default_value);
        }
    }

    #[test]
    fn test_duplicate_respects_cap_and_unknown_id() {
        let mut manager = manager();
        assert!(manager.duplicate_preset("missing").is_none());
        let id = manager.active_preset_id().to_string();
        while manager.can_create_preset() {
            manager.create_preset("filler");
        }
        assert!(manager.duplicate_preset(&id).is_none());
        assert_eq!(manager.presets().len(), MAX_PRESETS);
    }

    #[test]
    fn test_delete_last_preset_rejected() {
        let mut manager = manager();
        let id = manager.active_preset_id().to_string();
        assert!(!manager.can_delete_preset());
        assert!(!manager.delete_preset(&id));
        assert_eq!(manager.presets().len(), 1);
        assert_eq!(manager.active_preset_id(), id);
    }

    #[test]
    fn test_delete_active_falls_back_to_first() {
        let mut manager = manager();
        let first = manager.active_preset_id().to_string();
        manager.create_preset("Second");
        let third = manager.create_preset("Third").unwrap();

        assert!(manager.delete_preset(&third.id));
        assert_eq!(manager.active_preset_id(), first);
        assert!(manager.store().find(manager.active_preset_id()).is_some());
    }

    #[test]
    fn test_delete_inactive_keeps_selection() {
        let mut manager = manager();
        let first = manager.active_preset_id().to_string();
        let second = manager.create_preset("Second").unwrap();
        assert!(manager.delete_preset(&first));
        assert_eq!(manager.active_preset_id(), second.id);
        assert!(!manager.delete_preset("unknown"));
    }

    #[test]
    fn test_switch_preset_and_fallback_read() {
        let mut manager = manager();
        let first = manager.active_preset_id().to_string();
        let second = manager.create_preset("Second").unwrap();

        manager.switch_preset(&first);
        assert_eq!(manager.config().id, first);
        assert_eq!(stored(&manager).active_preset_id, first);

        manager.switch_preset("dangling");
        assert_eq!(manager.config().id, first);
        manager.switch_preset(&second.id);
        assert_eq!(manager.config().preset_name, "Second");
    }

    #[test]
    fn test_add_fields_assigns_ids_in_order() {
        let mut manager = manager();
        manager.create_preset("Fields");
        let created = manager.add_fields(vec![
            NewField::new("scripts.build", "Build", FieldType::Text),
            NewField::new("engines.node", "Node", FieldType::Text),
        ]);
        assert_eq!(created.len(), 2);
        assert_ne!(created[0].id, created[1].id);
        assert_eq!(labels(&manager), ["Build", "Node"]);

        let single = manager.add_field(NewField::new("private", "Private", FieldType::Boolean));
        assert_eq!(manager.config().fields.last(), Some(&single));
    }

    #[test]
    fn test_field_edits_only_touch_active_preset() {
        let mut manager = manager();
        let default_id = manager.active_preset_id().to_string();
        let version_id = manager.config().fields[0].id.clone();
        manager.create_preset("Other");

        assert!(!manager.update_field(&version_id, FieldUpdate {
            label: Some("Changed".into()),
            ..FieldUpdate::default()
        }));
        assert!(!manager.delete_field(&version_id));

        manager.switch_preset(&default_id);
        assert!(manager.update_field(&version_id, FieldUpdate {
            label: Some("Semver".into()),
            default_value: Some(Some(FieldValue::Text("0.1.0".into()))),
            ..FieldUpdate::default()
        }));
        let field = &manager.config().fields[0];
        assert_eq!(field.label, "Semver");
        assert_eq!(field.key_path, "version");

        assert!(manager.delete_field(&version_id));
        assert_eq!(manager.config().fields.len(), 4);
    }

    #[test]
    fn test_reorder_moves_to_over_position() {
        let mut manager = manager();
        manager.create_preset("Order");
        let ids: Vec<String> = manager
            .add_fields(["A", "B", "C", "D"].iter().map(|l| NewField::new(l.to_lowercase(), *l, FieldType::Text)).collect())
            .into_iter()
            .map(|f| f.id)
            .collect();

        assert!(manager.reorder_fields(&ids[0], &ids[2]));
        assert_eq!(labels(&manager), ["B", "C", "A", "D"]);

        assert!(manager.reorder_fields(&ids[3], &ids[1]));
        assert_eq!(labels(&manager), ["D", "B", "C", "A"]);

        assert!(!manager.reorder_fields(&ids[0], "missing"));
        assert_eq!(labels(&manager), ["D", "B", "C", "A"]);
    }

    #[test]
    fn test_rename_active() {
        let mut manager = manager();
        manager.update_preset_name("Renamed");
        assert_eq!(manager.config().preset_name, "Renamed");
        assert_eq!(stored(&manager).presets[0].preset_name, "Renamed");
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut manager = manager();
        manager.add_field(
            NewField::new("license", "License", FieldType::Select)
                .with_options(vec!["MIT".into(), "Apache-2.0".into()])
                .with_default(FieldValue::Text("MIT".into())),
        );
        let original = manager.config().clone();
        let exported = manager.export_config().unwrap();
        assert_eq!(exported.file_name, "default-preset-preset.json");

        let target = manager.create_preset("Target").unwrap();
        manager.import_config(&exported.contents).unwrap();

        let imported = manager.config();
        assert_eq!(imported.id, target.id);
        assert_eq!(imported.preset_name, original.preset_name);
        let strip = |fields: &[PresetField]| -> Vec<NewField> { fields.iter().cloned().map(NewField::from).collect() };
        assert_eq!(strip(&imported.fields), strip(&original.fields));
    }

    #[test]
    fn test_import_invalid_leaves_state() {
        let mut manager = manager();
        let before = manager.config().clone();
        assert!(manager.import_config(r#"{"presetName":"No fields"}"#).is_err());
        assert!(manager.import_config("not json").is_err());
        assert_eq!(manager.config(), &before);
    }

    #[test]
    fn test_import_without_name_keeps_name() {
        let mut manager = manager();
        manager
            .import_config(r#"{"fields":[{"keyPath":"main","label":"Main","type":"text"}]}"#)
            .unwrap();
        assert_eq!(manager.config().preset_name, DEFAULT_PRESET_NAME);
        assert_eq!(manager.config().fields.len(), 1);
        assert!(!manager.config().fields[0].id.is_empty());
    }

    #[test]
    fn test_reset_to_default_keeps_id() {
        let mut manager = manager();
        let created = manager.create_preset("Custom").unwrap();
        manager.add_field(NewField::new("x", "X", FieldType::Number));
        manager.reset_to_default();

        let preset = manager.config();
        assert_eq!(preset.id, created.id);
        assert_eq!(preset.preset_name, "Custom");
        assert_eq!(preset.fields.len(), 5);
        assert_eq!(preset.fields[0].key_path, "version");
    }

    #[test]
    fn test_state_survives_reload() {
        let storage = MemoryStorage::new();
        let mut manager = PresetManager::open(storage.clone());
        let created = manager.create_preset("Persisted").unwrap();
        manager.add_field(NewField::new("homepage", "Homepage", FieldType::Text));

        let mut reloaded = PresetManager::new(storage);
        assert_eq!(reloaded.load(), LoadSource::Current);
        assert_eq!(reloaded.active_preset_id(), created.id);
        assert_eq!(reloaded.config().fields[0].key_path, "homepage");
    }
}
