//! Key/value persistence collaborator.
//!
//! Settings and templates are persisted as whole JSON blobs under
//! string keys, mirroring the browser-local storage the original
//! consumers use. The store is synchronous and non-transactional:
//! read on load, written on every mutation.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CalmanError, CalmanResult};

pub trait KvStore {
    fn get(&self, key: &str) -> CalmanResult<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> CalmanResult<()>;
}

/// File-backed store: one JSON object per store file, one entry per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> CalmanResult<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| {
            CalmanError::Storage(format!(
                "Failed to parse store at {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, Value>) -> CalmanResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| CalmanError::Serialization(e.to_string()))?;

        // Atomic write via temp file + rename
        let temp = self.path.with_extension("tmp");
        std::fs::write(&temp, contents)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> CalmanResult<Option<Value>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> CalmanResult<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> CalmanResult<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> CalmanResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
