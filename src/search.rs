//! Free-text search across a configurable set of fields.

use crate::record::Record;
use crate::value::Value;

/// Case-insensitive substring match, OR-ed across `fields`.
///
/// An empty query or an empty field list passes every record. Missing and
/// null fields never match a non-empty query.
pub fn matches(record: &Record, query: &str, fields: &[String]) -> bool {
    if query.is_empty() || fields.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    fields.iter().any(|field| match record.get(field) {
        None | Some(Value::Null) => false,
        Some(value) => value.to_display_string().to_lowercase().contains(&needle),
    })
}
