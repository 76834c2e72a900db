//! ZIP archives carrying a package.json
//!
//! Only the archive root and exactly one directory level are searched.
//! Rewriting replaces the located entry and raw-copies every other entry so
//! their compressed bytes survive unchanged.

use std::io::{Cursor, Read, Write};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::constants::archive::{NESTED_SEGMENTS, PACKAGE_JSON};
use crate::error::{EditorError, Result};

/// package.json located inside an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedPackage {
    /// Entry path inside the archive (`package.json` or `dir/package.json`)
    pub path: String,
    /// Raw entry text
    pub text: String,
}

/// Pick the package.json entry from archive entry names
///
/// The root entry wins; otherwise the first `dir/package.json` in archive order.
pub fn find_package_json<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut nested = None;
    for name in names {
        if name == PACKAGE_JSON {
            return Some(name);
        }
        if nested.is_none() {
            let segments: Vec<&str> = name.split('/').collect();
            if segments.len() == NESTED_SEGMENTS && segments[1] == PACKAGE_JSON {
                nested = Some(name);
            }
        }
    }
    nested
}

/// Locate and read the package.json entry of an archive
pub fn read_package_json(bytes: &[u8]) -> Result<ArchivedPackage> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(EditorError::InvalidArchive)?;

    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(EditorError::InvalidArchive)?;
        if !entry.is_dir() {
            names.push(entry.name().to_string());
        }
    }

    let path = find_package_json(names.iter().map(String::as_str))
        .ok_or(EditorError::PackageJsonNotFound)?
        .to_string();
    debug!(path = %path, entries = names.len(), "Located package.json in archive");

    let mut entry = archive.by_name(&path).map_err(EditorError::InvalidArchive)?;
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|_| EditorError::Unreadable)?;

    Ok(ArchivedPackage { path, text })
}

/// Rebuild `bytes` with the entry at `path` replaced by `contents`
///
/// Entry order is kept, and the replaced entry keeps its modification time
/// and unix permissions. If `path` is absent it is appended.
pub fn replace_entry(bytes: &[u8], path: &str, contents: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(EditorError::InvalidArchive)?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut replaced = false;

    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(EditorError::Archive)?;
        if entry.name() == path {
            let method = match entry.compression() {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let mut options = SimpleFileOptions::default().compression_method(method);
            if let Some(modified) = entry.last_modified() {
                options = options.last_modified_time(modified);
            }
            if let Some(mode) = entry.unix_mode() {
                options = options.unix_permissions(mode);
            }
            write_entry(&mut writer, path, contents, options)?;
            replaced = true;
        } else {
            writer.raw_copy_file(entry).map_err(EditorError::Archive)?;
        }
    }

    if !replaced {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        write_entry(&mut writer, path, contents, options)?;
    }

    let output = writer.finish().map_err(EditorError::Archive)?.into_inner();
    info!(path = %path, size = output.len(), "Regenerated archive");
    Ok(output)
}

fn write_entry(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    path: &str,
    contents: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    writer.start_file(path, options).map_err(EditorError::Archive)?;
    writer
        .write_all(contents)
        .map_err(|e| EditorError::Archive(e.into()))
}
