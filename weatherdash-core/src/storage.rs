//! Key-value persistence used for the favorites list.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Result, anyhow};
use directories::ProjectDirs;

use crate::error::StoreError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-process store; contents are lost on exit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// A JSON object on disk, rewritten in full on every `set`.
///
/// An unreadable or malformed file reads as empty; the next `set` replaces it.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read storage file: {e}");
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "ignoring malformed storage file: {e}");
            BTreeMap::new()
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.read_all();
        entries.insert(key.to_owned(), value);

        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json).map_err(io_err)?;

        Ok(())
    }
}
