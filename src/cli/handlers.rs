//! Command execution: the CLI acts as the UI on top of the preset store and file adapter

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::commands::{Cli, Commands, FieldArgs, FieldCommand, PresetCommand};
use crate::config::{FieldUpdate, FileStorage, NewField, PresetManager, PresetStorage};
use crate::constants::presets::MAX_PRESETS;
use crate::document::{
    DirectoryDownloads, DownloadSink, DroppedItem, FileAdapter, OpenOutcome, PathPicker, SaveOutcome,
};
use crate::fields::preview::render_preview;
use crate::fields::sample::{fields_from_sample, leaves, parse_sample_text};
use crate::fields::{FieldType, FieldValue};

pub fn run(cli: Cli) -> Result<()> {
    let storage = cli.store.map(FileStorage::new).unwrap_or_default();
    debug!(path = %storage.path().display(), "Using preset store");
    let mut presets = PresetManager::open(storage);

    match cli.command {
        Commands::Preset(command) => run_preset(&mut presets, command),
        Commands::Field(command) => run_field(&mut presets, command),
        Commands::Show { file } => show(&presets, &file),
        Commands::Get { file, key_path } => get(&file, &key_path),
        Commands::Set {
            file,
            assignments,
            download_dir,
        } => set(&presets, &file, &assignments, download_dir),
    }
}

fn run_preset<S: PresetStorage>(presets: &mut PresetManager<S>, command: PresetCommand) -> Result<()> {
    match command {
        PresetCommand::List => {
            for preset in presets.presets() {
                let marker = if preset.id == presets.config().id { '*' } else { ' ' };
                println!(
                    "{marker} {}  {} ({} fields)",
                    preset.id,
                    preset.preset_name,
                    preset.fields.len()
                );
            }
        }
        PresetCommand::Create { name } => {
            let preset = presets
                .create_preset(&name)
                .ok_or_else(|| anyhow!("Preset limit reached ({MAX_PRESETS})"))?;
            println!("Created preset '{}' ({})", preset.preset_name, preset.id);
        }
        PresetCommand::Duplicate { id } => {
            let Some(preset) = presets.duplicate_preset(&id) else {
                if presets.can_create_preset() {
                    bail!("No preset with id {id}");
                }
                bail!("Preset limit reached ({MAX_PRESETS})");
            };
            println!("Created preset '{}' ({})", preset.preset_name, preset.id);
        }
        PresetCommand::Delete { id } => {
            if !presets.delete_preset(&id) {
                if presets.can_delete_preset() {
                    bail!("No preset with id {id}");
                }
                bail!("Cannot delete the last preset");
            }
            println!("Deleted preset {id}; active preset is now '{}'", presets.config().preset_name);
        }
        PresetCommand::Switch { id } => {
            if presets.store().find(&id).is_none() {
                bail!("No preset with id {id}");
            }
            presets.switch_preset(&id);
            println!("Switched to '{}'", presets.config().preset_name);
        }
        PresetCommand::Rename { name } => {
            presets.update_preset_name(&name);
            println!("Renamed active preset to '{name}'");
        }
        PresetCommand::Export { out } => {
            let exported = presets.export_config()?;
            let mut downloads = out.map(DirectoryDownloads::new).unwrap_or_else(DirectoryDownloads::user_default);
            downloads
                .download(&exported.file_name, exported.contents.as_bytes())
                .with_context(|| format!("Failed to write {}", exported.file_name))?;
            println!("Exported to {}", downloads.dir().join(&exported.file_name).display());
        }
        PresetCommand::Import { file } => {
            let text = fs::read_to_string(&file).with_context(|| format!("Failed to read {:?}", file))?;
            presets.import_config(&text)?;
            let config = presets.config();
            println!("Imported '{}' ({} fields)", config.preset_name, config.fields.len());
        }
        PresetCommand::Reset => {
            presets.reset_to_default();
            println!("Restored default fields");
        }
        PresetCommand::Preview => {
            println!("{}", render_preview(&presets.config().fields)?);
        }
    }
    Ok(())
}

fn run_field<S: PresetStorage>(presets: &mut PresetManager<S>, command: FieldCommand) -> Result<()> {
    match command {
        FieldCommand::List => {
            for (index, field) in presets.config().fields.iter().enumerate() {
                let mut line = format!(
                    "{index:>2}. {}  {} [{}] \"{}\"",
                    field.id, field.key_path, field.field_type, field.label
                );
                if let Some(options) = &field.select_options {
                    line.push_str(&format!(" options={}", options.join("|")));
                }
                if let Some(default) = &field.default_value {
                    line.push_str(&format!(" default={default}"));
                }
                println!("{line}");
            }
        }
        FieldCommand::Add(args) => {
            let field = presets.add_field(new_field(args)?);
            println!("Added field {} ({})", field.key_path, field.id);
        }
        FieldCommand::Update {
            id,
            key_path,
            label,
            field_type,
            options,
            clear_options,
            default,
            clear_default,
        } => {
            let current = presets
                .config()
                .fields
                .iter()
                .find(|f| f.id == id)
                .ok_or_else(|| anyhow!("No field with id {id} in the active preset"))?;
            let effective_type = field_type.unwrap_or(current.field_type);

            let update = FieldUpdate {
                key_path,
                label,
                field_type,
                select_options: if clear_options {
                    Some(None)
                } else if options.is_empty() {
                    None
                } else {
                    Some(Some(options))
                },
                default_value: if clear_default {
                    Some(None)
                } else {
                    default
                        .map(|raw| FieldValue::parse(effective_type, &raw).map(Some))
                        .transpose()?
                },
            };
            if update.is_empty() {
                bail!("Nothing to update");
            }
            presets.update_field(&id, update);
            println!("Updated field {id}");
        }
        FieldCommand::Delete { id } => {
            if !presets.delete_field(&id) {
                bail!("No field with id {id} in the active preset");
            }
            println!("Deleted field {id}");
        }
        FieldCommand::Move { id, over } => {
            if !presets.reorder_fields(&id, &over) {
                bail!("Both fields must exist in the active preset");
            }
            println!("Moved field {id}");
        }
        FieldCommand::FromSample { file, key_paths } => {
            let text = fs::read_to_string(&file).with_context(|| format!("Failed to read {:?}", file))?;
            let nodes = parse_sample_text(&text)?;
            let selected: Vec<String> = if key_paths.is_empty() {
                leaves(&nodes).iter().map(|n| n.key_path.clone()).collect()
            } else {
                key_paths
            };
            let fields = fields_from_sample(&nodes, &selected);
            if fields.is_empty() {
                bail!("None of the selected keys exist in the sample");
            }
            let created = presets.add_fields(fields);
            println!("Added {} field(s)", created.len());
        }
    }
    Ok(())
}

fn new_field(args: FieldArgs) -> Result<NewField> {
    let mut field = NewField::new(args.key_path, args.label, args.field_type);
    if args.field_type == FieldType::Select {
        field = field.with_options(args.options);
    } else if !args.options.is_empty() {
        bail!("--option only applies to select fields");
    }
    if let Some(raw) = args.default {
        field = field.with_default(FieldValue::parse(args.field_type, &raw)?);
    }
    Ok(field)
}

/// Open FILE through the picker, so saves go back to it
fn open_in_place(path: &Path) -> Result<FileAdapter> {
    let mut adapter = FileAdapter::new(Some(Box::new(PathPicker::new(Some(path.to_path_buf())))));
    match adapter.open_file()? {
        OpenOutcome::Opened => Ok(adapter),
        OpenOutcome::Cancelled => bail!("No file selected"),
    }
}

/// Open FILE as a dropped item without write access, so saves become downloads
fn open_read_only(path: &Path) -> Result<FileAdapter> {
    let mut adapter = FileAdapter::new(None);
    adapter.handle_drop(DroppedItem::from_path(path, false))?;
    Ok(adapter)
}

fn show<S: PresetStorage>(presets: &PresetManager<S>, file: &Path) -> Result<()> {
    let adapter = open_in_place(file)?;
    let config = presets.config();
    println!("{} (preset '{}')", file.display(), config.preset_name);
    for field in &config.fields {
        let value = match adapter.get_value(&field.key_path) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => match &field.default_value {
                Some(default) => format!("<unset, default {default}>"),
                None => "<unset>".to_string(),
            },
        };
        println!("  {} ({}): {value}", field.label, field.key_path);
    }
    Ok(())
}

fn get(file: &Path, key_path: &str) -> Result<()> {
    let adapter = open_in_place(file)?;
    let value = adapter
        .get_value(key_path)
        .ok_or_else(|| anyhow!("{key_path} is not set in {}", file.display()))?;
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set<S: PresetStorage>(
    presets: &PresetManager<S>,
    file: &Path,
    assignments: &[String],
    download_dir: Option<PathBuf>,
) -> Result<()> {
    let mut adapter = match &download_dir {
        Some(_) => open_read_only(file)?,
        None => open_in_place(file)?,
    };

    for assignment in assignments {
        let (key_path, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected KEY_PATH=VALUE, got '{assignment}'"))?;
        let value = coerce_input(presets, key_path, raw)?;
        debug!(key_path = %key_path, value = %value, "Setting value");
        adapter.update_value(key_path, value)?;
    }

    let mut downloads = download_dir
        .map(DirectoryDownloads::new)
        .unwrap_or_else(DirectoryDownloads::user_default);
    match adapter.save_file(&mut downloads)? {
        SaveOutcome::Overwritten => println!("Saved {}", file.display()),
        SaveOutcome::Downloaded(name) => println!("Saved copy to {}", downloads.dir().join(name).display()),
    }
    Ok(())
}

/// Typed by the matching field of the active preset; otherwise a JSON literal or plain text
fn coerce_input<S: PresetStorage>(presets: &PresetManager<S>, key_path: &str, raw: &str) -> Result<Value> {
    if let Some(field) = presets.config().fields.iter().find(|f| f.key_path == key_path) {
        return Ok(FieldValue::parse(field.field_type, raw)?.to_json());
    }
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}
