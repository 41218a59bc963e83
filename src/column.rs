//! Column definitions: how a record field projects to a displayed cell.

use crate::record::Record;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Custom cell text for a column: receives the resolved value (if any) and
/// the whole record.
pub type CellRenderer = Arc<dyn Fn(Option<&Value>, &Record) -> String + Send + Sync>;

#[derive(Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub key: String,
    pub header: String,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip)]
    pub cell_renderer: Option<CellRenderer>,
}

impl ColumnDefinition {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: false,
            width: None,
            cell_renderer: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn with_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(Option<&Value>, &Record) -> String + Send + Sync + 'static,
    {
        self.cell_renderer = Some(Arc::new(render));
        self
    }

    /// Text shown in this column's cell for `record`. Missing and null
    /// values render empty unless a renderer says otherwise.
    pub fn cell_text(&self, record: &Record) -> String {
        let value = record.get(&self.key);
        match &self.cell_renderer {
            Some(render) => render(value, record),
            None => match value {
                None | Some(Value::Null) => String::new(),
                Some(v) => v.to_display_string(),
            },
        }
    }
}

impl fmt::Debug for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("cell_renderer", &self.cell_renderer.is_some())
            .finish()
    }
}
