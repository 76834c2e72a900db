//! Opened package.json documents
//!
//! - **key_path**: dot-path get/set over JSON values
//! - **archive**: package.json lookup and rewrite inside ZIP archives
//! - **capability**: picker, writable handle and download abstractions
//! - **adapter**: `FileAdapter`, the open/edit/save state machine

pub mod adapter;
pub mod archive;
pub mod capability;
pub mod key_path;

pub use adapter::{DocumentSource, FileAdapter, FileData, OpenOutcome, SaveOutcome};
pub use capability::{
    DirectoryDownloads, DownloadSink, DroppedItem, FilePicker, PathHandle, PathPicker, PickedFile,
    WritableHandle,
};
