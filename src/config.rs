//! Grid configuration, loaded from TOML.
//!
//! ```toml
//! page_size = 10
//! auto_submit = true
//! debounce_ms = 300
//! search_fields = ["name", "email"]
//! date_fields = ["createdAt"]
//!
//! [[columns]]
//! key = "name"
//! header = "Name"
//! sortable = true
//! ```

use crate::column::ColumnDefinition;
use crate::debounce::DEFAULT_QUIET_PERIOD;
use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub page_size: usize,
    /// Filter panels apply on their own after `debounce_ms` of quiet.
    pub auto_submit: bool,
    /// Quiet period for auto-submitted filter changes.
    pub debounce_ms: u64,
    pub searchable: bool,
    pub search_fields: Vec<String>,
    /// Paths whose string values are parsed into dates on load.
    pub date_fields: Vec<String>,
    pub columns: Vec<ColumnDefinition>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            auto_submit: false,
            debounce_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
            searchable: true,
            search_fields: Vec::new(),
            date_fields: Vec::new(),
            columns: Vec::new(),
        }
    }
}

impl GridConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, GridError> {
        let config: GridConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!(
            "Loaded grid config from {} (page_size={}, {} columns)",
            path.display(),
            config.page_size,
            config.columns.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.page_size == 0 {
            return Err(GridError::InvalidPageSize);
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Fields searched by the grid: `search_fields` if set, otherwise every
    /// column key. Empty when search is disabled.
    pub fn effective_search_fields(&self) -> Vec<String> {
        if !self.searchable {
            return Vec::new();
        }
        if !self.search_fields.is_empty() {
            return self.search_fields.clone();
        }
        self.columns.iter().map(|c| c.key.clone()).collect()
    }
}
