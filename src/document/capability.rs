//! Platform capabilities the file adapter depends on
//!
//! A picker may be absent entirely, and a source may or may not come with a
//! writable handle. Callers branch on both explicitly: no picker means
//! `CapabilityUnsupported`, no handle means save falls back to a download.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{EditorError, Result};

/// Permission to overwrite a file at its original location
pub trait WritableHandle: fmt::Debug {
    /// Replace the whole file content
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Delivery of a file to the user when no writable handle exists
pub trait DownloadSink {
    fn download(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// A file obtained from the picker
#[derive(Debug)]
pub struct PickedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub handle: Option<Box<dyn WritableHandle>>,
}

/// Native file chooser
pub trait FilePicker {
    /// Ask the user for a file; `Err(EditorError::Cancelled)` if they decline
    fn pick(&mut self) -> Result<PickedFile>;
}

/// A drag-and-dropped item
///
/// `bytes` is `None` when the item could not be read as a file.
#[derive(Debug)]
pub struct DroppedItem {
    pub name: String,
    pub bytes: Option<Vec<u8>>,
    pub handle: Option<Box<dyn WritableHandle>>,
}

impl DroppedItem {
    /// Drop a file from disk, optionally granting write access to it
    pub fn from_path(path: &Path, writable: bool) -> Self {
        let bytes = fs::read(path).ok();
        let handle: Option<Box<dyn WritableHandle>> = if writable && bytes.is_some() {
            Some(Box::new(PathHandle::new(path)))
        } else {
            None
        };
        Self {
            name: file_name(path),
            bytes,
            handle,
        }
    }
}

/// Writable handle backed by a filesystem path
#[derive(Debug, Clone)]
pub struct PathHandle {
    path: PathBuf,
}

impl PathHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WritableHandle for PathHandle {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        fs::write(&self.path, bytes)?;
        info!(path = %self.path.display(), size = bytes.len(), "Wrote file in place");
        Ok(())
    }
}

/// Picker that "chooses" a path given up front (e.g. on the command line)
///
/// With no path it behaves like a dismissed dialog.
#[derive(Debug, Default)]
pub struct PathPicker {
    path: Option<PathBuf>,
}

impl PathPicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl FilePicker for PathPicker {
    fn pick(&mut self) -> Result<PickedFile> {
        let path = self.path.take().ok_or(EditorError::Cancelled)?;
        let name = file_name(&path);
        let bytes = fs::read(&path).map_err(|source| EditorError::Read {
            name: path.display().to_string(),
            source,
        })?;
        Ok(PickedFile {
            name,
            bytes,
            handle: Some(Box::new(PathHandle::new(path))),
        })
    }
}

/// Download sink writing into a directory
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's download directory, falling back to the working directory
    pub fn user_default() -> Self {
        Self::new(dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectoryDownloads {
    /// `file_name` must be a single path component
    fn download(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()> {
        if Path::new(file_name).file_name().and_then(|n| n.to_str()) != Some(file_name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{file_name}' is not a plain file name"),
            ));
        }
        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(file_name);
        fs::write(&target, bytes)?;
        info!(path = %target.display(), size = bytes.len(), "Downloaded file");
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
