//! Reading the comment archive and its caches from disk.
//!
//! ## Layout
//!
//! ```text
//! data/                        # Archive root (required)
//! ├── alpha.json               # { "<id>": { "name": ..., "comments": [...] }, ... }
//! └── beta/
//!     └── more.json            # Nested directories are walked too
//! cache/
//! ├── card_name_map.json       # { "<card name>": <id>, ... }
//! └── scryfall_data.json       # { "<id>": { "set_name": ..., "oracle_id": ... }, ... }
//! ```
//!
//! Data files are visited in sorted path order so that merging the same
//! printing from several files is deterministic. A file that is not a JSON
//! object is skipped with a warning, as is any single entry inside a file that
//! does not have the expected shape; only a missing archive root is an error. The two
//! cache files are optional: a missing or unreadable cache yields an empty map.

use crate::links::NameMap;
use crate::types::{CardEntry, CardMetadata, PrintingId, RawCardEntry};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Data directory not found: {0}")]
    MissingDataDir(PathBuf),
    #[error("Failed to walk data directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Anything that can yield printing entries for the catalog.
pub trait CardSource {
    /// All entries, in the order they should be merged.
    fn entries(&self) -> Result<Vec<CardEntry>, IngestError>;
}

impl CardSource for Vec<CardEntry> {
    fn entries(&self) -> Result<Vec<CardEntry>, IngestError> {
        Ok(self.clone())
    }
}

/// A directory tree of archive JSON files.
#[derive(Debug, Clone)]
pub struct JsonDataDir {
    root: PathBuf,
}

impl JsonDataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every `*.json` file under the root, sorted by path.
    pub fn files(&self) -> Result<Vec<PathBuf>, IngestError> {
        if !self.root.is_dir() {
            return Err(IngestError::MissingDataDir(self.root.clone()));
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path
                    .extension()
                    .map(|e| e.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
            {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }
}

impl CardSource for JsonDataDir {
    fn entries(&self) -> Result<Vec<CardEntry>, IngestError> {
        let mut entries = Vec::new();
        for path in self.files()? {
            match read_data_file(&path) {
                Ok(file_entries) => {
                    tracing::debug!(path = %path.display(), entries = file_entries.len(), "Read data file");
                    entries.extend(file_entries);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable data file");
                }
            }
        }
        Ok(entries)
    }
}

#[derive(Error, Debug)]
enum FileError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

fn read_data_file(path: &Path) -> Result<Vec<CardEntry>, FileError> {
    let content = fs::read_to_string(path)?;
    let raw: BTreeMap<PrintingId, serde_json::Value> = serde_json::from_str(&content)?;
    let mut entries = Vec::with_capacity(raw.len());
    for (id, value) in raw {
        match serde_json::from_value::<RawCardEntry>(value) {
            Ok(entry) => entries.push(CardEntry {
                id,
                name: entry.name,
                comments: entry.comments.unwrap_or_default(),
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), id, error = %e, "Skipping malformed entry");
            }
        }
    }
    Ok(entries)
}

/// Read an optional JSON cache. Missing or malformed files yield `None`.
fn read_cache<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            tracing::info!(path = %path.display(), "No {} cache found", what);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed {} cache", what);
            None
        }
    }
}

/// Load the card name → identifier map.
pub fn load_name_map(path: &Path) -> NameMap {
    read_cache::<HashMap<String, PrintingId>>(path, "card name")
        .map(|raw| raw.into_iter().collect())
        .unwrap_or_default()
}

/// Load the identifier → metadata cache.
pub fn load_metadata(path: &Path) -> HashMap<PrintingId, CardMetadata> {
    read_cache(path, "metadata").unwrap_or_default()
}
