//! Key-value preference storage for saved filter values.
//!
//! Writes are last-write-wins and are never read back for verification.

use crate::error::GridError;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait PreferenceStore {
    fn load(&self, key: &str) -> Result<Option<JsonValue>, GridError>;

    fn save(&mut self, key: &str, value: JsonValue) -> Result<(), GridError>;
}

/// Process-local store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, JsonValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<JsonValue>, GridError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: JsonValue) -> Result<(), GridError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// A single JSON object on disk, one top-level entry per key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, JsonValue>, GridError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&text)? {
            JsonValue::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

impl PreferenceStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<JsonValue>, GridError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&mut self, key: &str, value: JsonValue) -> Result<(), GridError> {
        // A corrupt file is replaced rather than blocking the write.
        let mut entries = self.read_all().unwrap_or_else(|e| {
            log::warn!("Discarding unreadable preferences '{}': {e}", self.path.display());
            Map::new()
        });
        entries.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}
