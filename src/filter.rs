//! Filter rules and the predicate evaluator.
//!
//! Two permissive policies are deliberate and must be kept:
//! - a rule whose field path does not resolve passes the record;
//! - a rule with an unrecognized operator passes every record.

use crate::record::Record;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Comparison applied by a [`FilterRule`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    /// Kept verbatim so it can be reported; always passes.
    Unknown(String),
}

impl FilterOperator {
    /// Parse an operator name, case-insensitively. Never fails.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "eq" => FilterOperator::Eq,
            "neq" => FilterOperator::Neq,
            "gt" => FilterOperator::Gt,
            "gte" => FilterOperator::Gte,
            "lt" => FilterOperator::Lt,
            "lte" => FilterOperator::Lte,
            "contains" => FilterOperator::Contains,
            "startswith" => FilterOperator::StartsWith,
            "endswith" => FilterOperator::EndsWith,
            _ => FilterOperator::Unknown(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::Unknown(name) => name,
        }
    }
}

impl From<String> for FilterOperator {
    fn from(name: String) -> Self {
        FilterOperator::parse(&name)
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single constraint on one record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl FilterRule {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }
}

/// Evaluate one rule against one record.
pub fn matches(record: &Record, rule: &FilterRule) -> bool {
    let Some(actual) = record.get(&rule.field) else {
        return true;
    };
    let expected = &rule.value;

    match &rule.operator {
        FilterOperator::Eq => actual == expected,
        FilterOperator::Neq => actual != expected,
        FilterOperator::Gt => actual.native_cmp(expected) == Some(Ordering::Greater),
        FilterOperator::Gte => matches!(
            actual.native_cmp(expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::Lt => actual.native_cmp(expected) == Some(Ordering::Less),
        FilterOperator::Lte => matches!(
            actual.native_cmp(expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::Contains => lowered(actual).contains(&lowered(expected)),
        FilterOperator::StartsWith => lowered(actual).starts_with(&lowered(expected)),
        FilterOperator::EndsWith => lowered(actual).ends_with(&lowered(expected)),
        FilterOperator::Unknown(_) => true,
    }
}

/// A record passes a rule set iff it passes every rule.
pub fn matches_all(record: &Record, rules: &[FilterRule]) -> bool {
    rules.iter().all(|rule| matches(record, rule))
}

fn lowered(value: &Value) -> String {
    value.to_display_string().to_lowercase()
}
