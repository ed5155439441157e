//! Collects records from JSON files on disk.
//!
//! A file holding an array contributes each element; any other JSON value
//! contributes itself. Directories contribute their `.json` files (matched
//! case-insensitively) in file-name order, and their sub-directories only
//! when loading recursively.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Record;

/// Gather every record under `path`.
///
/// A file given directly is parsed whatever its extension.
pub fn collect_records(path: &Path, recursive: bool) -> Result<Vec<Record>> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let mut records = Vec::new();
    if path.is_dir() {
        collect_dir(&mut records, path, recursive)?;
    } else {
        collect_file(&mut records, path)?;
    }
    Ok(records)
}

fn collect_dir(records: &mut Vec<Record>, dir: &Path, recursive: bool) -> Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            if recursive {
                collect_dir(records, &entry, recursive)?;
            }
        } else if is_json(&entry) {
            collect_file(records, &entry)?;
        }
    }
    Ok(())
}

fn collect_file(records: &mut Vec<Record>, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let content: Value = serde_json::from_str(&text).map_err(|source| Error::InvalidFile {
        path: path.to_path_buf(),
        source,
    })?;

    let before = records.len();
    match content {
        Value::Array(items) => records.extend(items),
        other => records.push(other),
    }
    debug!(path = %path.display(), records = records.len() - before, "collected file");
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
