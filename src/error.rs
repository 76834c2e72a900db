//! Error taxonomy shared by the preset store and the file adapter

use thiserror::Error;

/// Errors surfaced to the UI layer
///
/// Cap-exceeded and last-preset deletion are not errors: those operations
/// return `None`/`false` so callers can pre-disable the controls instead.
#[derive(Debug, Error)]
pub enum EditorError {
    /// No file picker is available on this platform
    #[error("File picking is not supported here. Open the file by path or drop it instead.")]
    CapabilityUnsupported,

    /// The user dismissed the picker; never shown as a message
    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Invalid JSON in {name}: {source}")]
    InvalidJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} does not contain a JSON object")]
    NotAnObject(String),

    #[error("No package.json found in ZIP file")]
    PackageJsonNotFound,

    #[error("Please drop a .json or .zip file")]
    UnsupportedExtension(String),

    #[error("Could not read the dropped file")]
    Unreadable,

    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid ZIP archive: {0}")]
    InvalidArchive(#[source] zip::result::ZipError),

    #[error("Invalid preset format")]
    InvalidPreset,

    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    #[error("Index {index} in '{key_path}' is too far past the end of the array")]
    IndexOutOfRange { key_path: String, index: String },

    #[error("No file loaded")]
    NoFileLoaded,

    #[error("Failed to write {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rebuild ZIP archive: {0}")]
    Archive(#[source] zip::result::ZipError),

    #[error("Failed to serialize JSON: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl EditorError {
    /// Whether this error should be shown to the user at all
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, EditorError::Cancelled)
    }

    /// Unsupported capability is a persistent advisory, not a dismissible error
    pub fn is_advisory(&self) -> bool {
        matches!(self, EditorError::CapabilityUnsupported)
    }
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_silent() {
        assert!(!EditorError::Cancelled.is_user_visible());
        assert!(EditorError::PackageJsonNotFound.is_user_visible());
    }

    #[test]
    fn test_capability_is_advisory() {
        assert!(EditorError::CapabilityUnsupported.is_advisory());
        assert!(!EditorError::InvalidPreset.is_advisory());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            EditorError::PackageJsonNotFound.to_string(),
            "No package.json found in ZIP file"
        );
        assert_eq!(
            EditorError::UnsupportedExtension("notes.txt".into()).to_string(),
            "Please drop a .json or .zip file"
        );
    }
}
