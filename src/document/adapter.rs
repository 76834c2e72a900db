//! File adapter: one edit model over plain JSON and ZIP-wrapped package.json

use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use super::archive;
use super::capability::{DownloadSink, DroppedItem, FilePicker, PickedFile, WritableHandle};
use super::key_path;
use crate::constants::archive::{JSON_EXTENSION, ZIP_EXTENSION};
use crate::error::{EditorError, Result};

/// Where the edited document came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Json,
    /// Archive bytes plus the path of the package.json entry inside them
    Zip {
        archive: Vec<u8>,
        package_json_path: String,
    },
}

/// The currently opened document
#[derive(Debug)]
pub struct FileData {
    pub name: String,
    pub content: Value,
    pub handle: Option<Box<dyn WritableHandle>>,
    pub source: DocumentSource,
}

impl FileData {
    pub fn is_zip(&self) -> bool {
        matches!(self.source, DocumentSource::Zip { .. })
    }

    pub fn package_json_path(&self) -> Option<&str> {
        match &self.source {
            DocumentSource::Zip { package_json_path, .. } => Some(package_json_path),
            DocumentSource::Json => None,
        }
    }

    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// The user dismissed the picker; nothing changed
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written through the writable handle
    Overwritten,
    /// Handed to the download sink under this file name
    Downloaded(String),
}

/// Owns the opened document and persists edits in its original form
pub struct FileAdapter {
    picker: Option<Box<dyn FilePicker>>,
    file_data: Option<FileData>,
    error: Option<String>,
}

impl FileAdapter {
    pub fn new(picker: Option<Box<dyn FilePicker>>) -> Self {
        Self {
            picker,
            file_data: None,
            error: None,
        }
    }

    pub fn file_data(&self) -> Option<&FileData> {
        self.file_data.as_ref()
    }

    /// Last user-visible open/drop failure
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn can_pick(&self) -> bool {
        self.picker.is_some()
    }

    /// Open a file through the picker
    ///
    /// Type is decided by extension: `.zip` is an archive, anything else JSON.
    /// On failure the previously opened document stays in place.
    pub fn open_file(&mut self) -> Result<OpenOutcome> {
        self.error = None;

        let Some(picker) = self.picker.as_mut() else {
            return Err(self.fail(EditorError::CapabilityUnsupported));
        };

        let picked = match picker.pick() {
            Ok(picked) => picked,
            Err(EditorError::Cancelled) => {
                debug!("File picker dismissed");
                return Ok(OpenOutcome::Cancelled);
            }
            Err(e) => return Err(self.fail(e)),
        };

        let PickedFile { name, bytes, handle } = picked;
        let result = if has_extension(&name, ZIP_EXTENSION) {
            load_zip(name, bytes, handle)
        } else {
            load_json(name, bytes, handle)
        };
        self.install(result)?;
        Ok(OpenOutcome::Opened)
    }

    /// Open a dropped item; only `.json` and `.zip` are accepted
    pub fn handle_drop(&mut self, item: DroppedItem) -> Result<()> {
        self.error = None;

        let DroppedItem { name, bytes, handle } = item;
        let Some(bytes) = bytes else {
            return Err(self.fail(EditorError::Unreadable));
        };

        let result = if has_extension(&name, ZIP_EXTENSION) {
            load_zip(name, bytes, handle)
        } else if has_extension(&name, JSON_EXTENSION) {
            load_json(name, bytes, handle)
        } else {
            Err(EditorError::UnsupportedExtension(name))
        };
        self.install(result)
    }

    /// Value at `key_path`, `None` if no file is open or the path is missing
    pub fn get_value(&self, key_path: &str) -> Option<&Value> {
        self.file_data
            .as_ref()
            .and_then(|data| key_path::get_value(&data.content, key_path))
    }

    /// Write `value` at `key_path`; ignored when no file is open
    ///
    /// A rejected key-path leaves the document unchanged.
    pub fn update_value(&mut self, key_path: &str, value: Value) -> Result<()> {
        let Some(data) = self.file_data.as_mut() else {
            debug!(key_path = %key_path, "Ignoring edit with no file open");
            return Ok(());
        };
        let mut content = data.content.clone();
        key_path::set_value(&mut content, key_path, value)?;
        data.content = content;
        Ok(())
    }

    /// Persist the document in its original representation
    ///
    /// Uses the writable handle when there is one, otherwise delivers the
    /// same bytes to `downloads` under the original file name.
    pub fn save_file(&mut self, downloads: &mut dyn DownloadSink) -> Result<SaveOutcome> {
        let data = self.file_data.as_mut().ok_or(EditorError::NoFileLoaded)?;

        let json = serde_json::to_string_pretty(&data.content).map_err(EditorError::Serialize)?;
        let bytes = match &data.source {
            DocumentSource::Json => json.into_bytes(),
            DocumentSource::Zip { archive, package_json_path } => {
                archive::replace_entry(archive, package_json_path, json.as_bytes())?
            }
        };

        let outcome = match data.handle.as_mut() {
            Some(handle) => {
                handle.write(&bytes).map_err(|source| EditorError::Write {
                    name: data.name.clone(),
                    source,
                })?;
                SaveOutcome::Overwritten
            }
            None => {
                downloads
                    .download(&data.name, &bytes)
                    .map_err(|source| EditorError::Write {
                        name: data.name.clone(),
                        source,
                    })?;
                SaveOutcome::Downloaded(data.name.clone())
            }
        };

        if let DocumentSource::Zip { archive, .. } = &mut data.source {
            *archive = bytes;
        }
        info!(file = %data.name, outcome = ?outcome, "Saved file");
        Ok(outcome)
    }

    /// Discard the opened document and any pending error
    pub fn close_file(&mut self) {
        if let Some(data) = self.file_data.take() {
            info!(file = %data.name, "Closed file");
        }
        self.error = None;
    }

    fn install(&mut self, result: Result<FileData>) -> Result<()> {
        let data = result.map_err(|e| self.fail(e))?;
        info!(
            file = %data.name,
            zip = data.is_zip(),
            writable = data.has_handle(),
            "Opened file"
        );
        self.file_data = Some(data);
        Ok(())
    }

    /// Record a user-visible failure and hand it back
    fn fail(&mut self, error: EditorError) -> EditorError {
        if error.is_user_visible() {
            warn!(error = %error, "File operation failed");
            self.error = Some(error.to_string());
        }
        error
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn parse_document(name: &str, text: &[u8]) -> Result<Value> {
    let content: Value = serde_json::from_slice(text).map_err(|source| EditorError::InvalidJson {
        name: name.to_string(),
        source,
    })?;
    if !content.is_object() {
        return Err(EditorError::NotAnObject(name.to_string()));
    }
    Ok(content)
}

fn load_json(name: String, bytes: Vec<u8>, handle: Option<Box<dyn WritableHandle>>) -> Result<FileData> {
    let content = parse_document(&name, &bytes)?;
    Ok(FileData {
        name,
        content,
        handle,
        source: DocumentSource::Json,
    })
}

fn load_zip(name: String, bytes: Vec<u8>, handle: Option<Box<dyn WritableHandle>>) -> Result<FileData> {
    let package = archive::read_package_json(&bytes)?;
    let content = parse_document(&package.path, package.text.as_bytes())?;
    Ok(FileData {
        name,
        content,
        handle,
        source: DocumentSource::Zip {
            archive: bytes,
            package_json_path: package.path,
        },
    })
}
