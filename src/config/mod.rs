//! Preset management for the editor
//!
//! This module provides the preset store and its persistence:
//! - **preset**: data model (fields, presets, the persisted root)
//! - **migration**: decoding of stored state, including the legacy single-preset format
//! - **storage**: persistence port with file and in-memory backends
//! - **store**: `PresetManager`, the operations the UI drives
//! - **transfer**: preset export/import files

pub mod migration;
pub mod preset;
pub mod storage;
pub mod store;
pub mod transfer;

// Re-export commonly used types
pub use migration::LoadSource;
pub use preset::{AppConfig, FieldUpdate, NewField, PresetField, PresetStore, default_fields};
pub use storage::{FileStorage, MemoryStorage, PresetStorage};
pub use store::PresetManager;
pub use transfer::ExportedPreset;
