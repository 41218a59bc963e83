//! Grid records: ordered field maps with dotted-path access.

use crate::error::GridError;
use crate::value::{Value, parse_date};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row of displayable data.
///
/// A record has no identity beyond an optional `id` field, which is used as
/// the row key for selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self, GridError> {
        match Value::from(json) {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(GridError::NotAnObject),
        }
    }

    /// Builder-style field insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Resolve a dotted path such as `"creator.user.fullName"`.
    ///
    /// Returns `None` when any segment is missing; a field explicitly set to
    /// null resolves to `Some(&Value::Null)`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            Some((head, rest)) => self.fields.get(head)?.lookup(rest),
            None => self.fields.get(path),
        }
    }

    fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        match path.split_once('.') {
            Some((head, rest)) => self.fields.get_mut(head)?.lookup_mut(rest),
            None => self.fields.get_mut(path),
        }
    }

    /// Row key taken from the `id` field, when it is a string or number.
    pub fn id(&self) -> Option<String> {
        match self.fields.get("id")? {
            Value::String(s) => Some(s.clone()),
            v @ Value::Number(_) => Some(v.to_display_string()),
            _ => None,
        }
    }

    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert string values at the given paths into dates.
    ///
    /// Values that do not parse are left untouched.
    pub fn parse_dates(&mut self, paths: &[String]) {
        for path in paths {
            if let Some(slot) = self.get_mut(path)
                && let Value::String(text) = &*slot
                && let Some(date) = parse_date(text)
            {
                *slot = Value::Date(date);
            }
        }
    }
}

/// Parse a JSON array of objects into records.
pub fn records_from_json(text: &str) -> Result<Vec<Record>, GridError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(rows) = json else {
        return Err(GridError::NotAnArray);
    };
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match Value::from(row) {
            Value::Object(fields) => Ok(Record { fields }),
            _ => Err(GridError::InvalidRecord { index }),
        })
        .collect()
}
