//! Error type for the fallible edges of the grid: script parsing, record
//! loading, configuration and preference storage.
//!
//! The pipeline itself never fails. Missing fields, unknown operators and
//! out-of-range pages are all absorbed by policy.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    /// A view script line could not be parsed.
    #[error("Line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    #[error("Expected a JSON array of records")]
    NotAnArray,

    #[error("Record {index} is not a JSON object")]
    InvalidRecord { index: usize },

    #[error("Expected a JSON object record")]
    NotAnObject,

    #[error("Unknown filter option: {0}")]
    UnknownFilter(String),

    #[error("Filter option '{0}' does not accept multiple choices")]
    NotMulti(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
