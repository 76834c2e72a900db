use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::fields::FieldType;

#[derive(Parser)]
#[command(name = "pkgjson-editor")]
#[command(version)]
#[command(propagate_version = true)]
#[command(about = "Edit package.json files (plain or inside ZIP archives) through presets", long_about = None)]
pub struct Cli {
    /// Preset store file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage presets
    #[command(subcommand)]
    Preset(PresetCommand),
    /// Manage fields of the active preset
    #[command(subcommand)]
    Field(FieldCommand),
    /// Show the active preset's fields with their values in FILE
    Show {
        /// package.json or .zip archive
        file: PathBuf,
    },
    /// Print the value at a key-path
    Get {
        file: PathBuf,
        /// Dot-delimited path (e.g. scripts.build)
        key_path: String,
    },
    /// Set values and save the file
    Set {
        file: PathBuf,
        /// Assignments of the form key.path=value
        #[arg(required = true, value_name = "KEY_PATH=VALUE")]
        assignments: Vec<String>,
        /// Leave FILE untouched and save the edited copy into this directory
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PresetCommand {
    /// List presets (* marks the active one)
    #[command(alias = "ls")]
    List,
    /// Create an empty preset and make it active
    Create { name: String },
    /// Copy a preset and make the copy active
    Duplicate { id: String },
    /// Delete a preset
    #[command(alias = "rm")]
    Delete { id: String },
    /// Make a preset active
    Switch { id: String },
    /// Rename the active preset
    Rename { name: String },
    /// Write the active preset to a JSON file
    Export {
        /// Output directory (defaults to the download directory)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Replace the active preset with an exported preset file
    Import { file: PathBuf },
    /// Restore the default fields on the active preset
    Reset,
    /// Print the sample document the active preset produces
    Preview,
}

#[derive(Subcommand)]
pub enum FieldCommand {
    /// List fields of the active preset
    #[command(alias = "ls")]
    List,
    /// Add a field
    Add(FieldArgs),
    /// Change attributes of a field
    Update {
        id: String,
        #[arg(long)]
        key_path: Option<String>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long = "type")]
        field_type: Option<FieldType>,
        /// Replace the select options
        #[arg(long = "option")]
        options: Vec<String>,
        #[arg(long, conflicts_with = "options")]
        clear_options: bool,
        #[arg(long)]
        default: Option<String>,
        #[arg(long, conflicts_with = "default")]
        clear_default: bool,
    },
    /// Remove a field
    #[command(alias = "rm")]
    Delete { id: String },
    /// Move a field to the position of another field
    Move { id: String, over: String },
    /// Add fields derived from a sample package.json
    FromSample {
        file: PathBuf,
        /// Key-paths to import (all leaves when omitted)
        key_paths: Vec<String>,
    },
}

#[derive(Args)]
pub struct FieldArgs {
    /// Dot-delimited path (e.g. config.theme.color)
    pub key_path: String,
    pub label: String,
    #[arg(long = "type", default_value = "text")]
    pub field_type: FieldType,
    /// Select option (repeatable)
    #[arg(long = "option")]
    pub options: Vec<String>,
    #[arg(long)]
    pub default: Option<String>,
}
