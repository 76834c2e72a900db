//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Preset store limits and naming
pub mod presets {
    /// Maximum number of presets a store may hold
    pub const MAX_PRESETS: usize = 5;

    /// Name given to the built-in preset
    pub const DEFAULT_PRESET_NAME: &str = "Default Preset";

    /// Suffix appended to the name of a duplicated preset
    pub const COPY_SUFFIX: &str = " (copy)";

    /// Suffix of exported preset file names (`my-preset` + suffix)
    pub const EXPORT_FILE_SUFFIX: &str = "-preset.json";

    /// Characters replaced in exported file names
    pub const RESERVED_FILE_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
}

/// Persisted preset storage location
pub mod storage {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "pkgjson-editor";

    /// File holding the serialized preset store
    pub const FILENAME: &str = "presets.json";
}

/// ZIP archive handling
pub mod archive {
    /// Entry name searched for inside archives
    pub const PACKAGE_JSON: &str = "package.json";

    /// Path segments of an entry one directory deep (`dir/package.json`)
    pub const NESTED_SEGMENTS: usize = 2;

    /// Extension identifying archive sources
    pub const ZIP_EXTENSION: &str = "zip";

    /// Extension identifying plain JSON sources
    pub const JSON_EXTENSION: &str = "json";
}

/// Key-path addressing
pub mod key_path {
    /// Separator between key-path segments (`scripts.build`)
    pub const SEPARATOR: char = '.';

    /// How far past the end of an array an index segment may write
    pub const MAX_INDEX_GAP: usize = 1024;
}
