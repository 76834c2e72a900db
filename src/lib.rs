#![forbid(unsafe_code)]

//! Preset-driven editing of package.json files, plain or inside ZIP archives

pub mod cli;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod fields;

pub use error::{EditorError, Result};
