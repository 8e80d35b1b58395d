// WHY: Load/save hooks let the external dictionary-management surface mutate the
// store without restarting the engine. Saves are atomic so a crash mid-write
// never leaves a truncated dictionary behind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

use super::{DictionaryStore, Term};
use crate::error::{AbbrevError, Result};

/// Accepted on-disk shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DictionaryFile {
    /// Current format: ordered list of entries
    Entries(Vec<RawEntry>),
    /// Legacy format: {"Original": "Abbr", ...}
    Map(BTreeMap<String, String>),
}

#[derive(Debug, Serialize, Deserialize)]
struct RawEntry {
    original: String,
    abbreviated: String,
}

/// Load a dictionary file; malformed entries fail the load
pub fn load(path: &Path) -> Result<DictionaryStore> {
    let file = File::open(path)?;
    let parsed: DictionaryFile = serde_json::from_reader(BufReader::new(file))?;

    let store = match parsed {
        DictionaryFile::Entries(entries) => {
            DictionaryStore::from_pairs(entries.iter().map(|e| (e.original.as_str(), e.abbreviated.as_str())))?
        }
        DictionaryFile::Map(map) => {
            DictionaryStore::from_pairs(map.iter().map(|(k, v)| (k.as_str(), v.as_str())))?
        }
    };

    info!("Loaded {} abbreviations from {}", store.len(), path.display());
    Ok(store)
}

/// Load the file, or seed it with the built-in table when it does not exist yet
pub fn load_or_init(path: &Path) -> Result<DictionaryStore> {
    if path.exists() {
        return load(path);
    }

    let store = DictionaryStore::with_defaults();
    save(&store, path)?;
    info!("Created default abbreviations file at {}", path.display());
    Ok(store)
}

/// Atomically write the store in insertion order
pub fn save(store: &DictionaryStore, path: &Path) -> Result<()> {
    let entries: Vec<RawEntry> = store
        .terms_in_insertion_order()
        .into_iter()
        .map(|Term { original, abbreviated }| RawEntry { original, abbreviated })
        .collect();

    write_json_atomic(&entries, path)?;
    info!("Saved {} abbreviations to {}", entries.len(), path.display());
    Ok(())
}

/// Write pretty JSON next to `path` and rename it into place
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| AbbrevError::Persistence {
        path: path.to_path_buf(),
        message: e.error.to_string(),
    })?;
    Ok(())
}
