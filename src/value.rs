//! Field values held by records.
//!
//! `Value` is a closed set of variants so that every comparison and string
//! coercion in the pipeline is an exhaustive match. Conversions from JSON
//! never produce `Date`; dates are introduced explicitly (see
//! [`Record::parse_dates`](crate::Record::parse_dates) and [`parse_date`]).

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

/// A single field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Midnight UTC on the given calendar day, or `Null` for an invalid date.
    pub fn date(year: i32, month: u32, day: u32) -> Value {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .map(Value::Date)
            .unwrap_or(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for values that carry no filter constraint: null, empty string,
    /// empty array and empty object.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) | Value::Date(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Resolve a dotted path below this value.
    ///
    /// Objects are traversed by key, arrays by decimal index. Any other
    /// value, or a missing key, ends the walk with `None`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            Some((head, rest)) => self.child(head)?.lookup(rest),
            None => self.child(path),
        }
    }

    pub fn lookup_mut(&mut self, path: &str) -> Option<&mut Value> {
        match path.split_once('.') {
            Some((head, rest)) => self.child_mut(head)?.lookup_mut(rest),
            None => self.child_mut(path),
        }
    }

    fn child(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    fn child_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Object(map) => map.get_mut(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
            _ => None,
        }
    }

    /// String coercion used by search and the text operators.
    ///
    /// Integral numbers print without a fraction, arrays join their elements
    /// with commas (nulls become empty), objects collapse to
    /// `[object Object]`.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Date(d) => d.to_rfc3339_opts(SecondsFormat::Millis, true),
            Value::Array(items) => items
                .iter()
                .map(|v| match v {
                    Value::Null => String::new(),
                    other => other.to_display_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }

    /// Numeric coercion for relational comparisons.
    pub fn to_number(&self) -> Option<f64> {
        let n = match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse::<f64>().ok()?
                }
            }
            Value::Date(d) => d.timestamp_millis() as f64,
            Value::Array(_) | Value::Object(_) => return None,
        };
        if n.is_nan() { None } else { Some(n) }
    }

    /// Relational ordering under native coercion rules.
    ///
    /// Two strings compare lexicographically; any other pair compares
    /// numerically after coercion. `None` means every relational operator
    /// is false for the pair.
    pub fn native_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => self.to_number()?.partial_cmp(&other.to_number()?),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(_) => serde_json::Value::String(self.to_display_string()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

/// Parse an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS` timestamp, or
/// a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if is_integral(n) {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if is_integral(n) {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if is_integral(*n) => serializer.serialize_i64(*n as i64),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(d) => {
                serializer.serialize_str(&d.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Array(items) => items.serialize(serializer),
            Value::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_object() {
        let v = Value::from(json!({"creator": {"user": {"fullName": "Jane Doe"}}}));
        assert_eq!(
            v.lookup("creator.user.fullName"),
            Some(&Value::from("Jane Doe"))
        );
    }

    #[test]
    fn test_lookup_missing_intermediate_is_none() {
        let v = Value::from(json!({"creator": null}));
        assert_eq!(v.lookup("creator.user.fullName"), None);
        assert_eq!(v.lookup("brand.name"), None);
    }

    #[test]
    fn test_lookup_array_index() {
        let v = Value::from(json!({"tags": ["beauty", "travel"]}));
        assert_eq!(v.lookup("tags.1"), Some(&Value::from("travel")));
        assert_eq!(v.lookup("tags.2"), None);
        assert_eq!(v.lookup("tags.x"), None);
        let tags = v.lookup("tags").and_then(Value::as_array).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(Value::from("x").as_array(), None);
    }

    #[test]
    fn test_lookup_present_null_is_some() {
        let v = Value::from(json!({"status": null}));
        assert_eq!(v.lookup("status"), Some(&Value::Null));
    }

    #[test]
    fn test_display_string_numbers() {
        assert_eq!(Value::Number(42.0).to_display_string(), "42");
        assert_eq!(Value::Number(-0.0).to_display_string(), "0");
        assert_eq!(Value::Number(2.5).to_display_string(), "2.5");
        assert_eq!(Value::Number(f64::NAN).to_display_string(), "NaN");
    }

    #[test]
    fn test_display_string_compound() {
        let arr = Value::from(json!(["a", null, 3]));
        assert_eq!(arr.to_display_string(), "a,,3");
        let obj = Value::from(json!({"k": 1}));
        assert_eq!(obj.to_display_string(), "[object Object]");
        assert_eq!(Value::Null.to_display_string(), "null");
    }

    #[test]
    fn test_display_string_date() {
        assert_eq!(
            Value::date(2024, 1, 1).to_display_string(),
            "2024-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn test_native_cmp_coercion() {
        assert_eq!(
            Value::from(10i64).native_cmp(&Value::from(9i64)),
            Some(Ordering::Greater)
        );
        // Strings compare lexicographically with each other.
        assert_eq!(
            Value::from("10").native_cmp(&Value::from("9")),
            Some(Ordering::Less)
        );
        // Mixed string/number coerces the string.
        assert_eq!(
            Value::from("10").native_cmp(&Value::from(9i64)),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::from("abc").native_cmp(&Value::from(1i64)), None);
        assert_eq!(
            Value::Null.native_cmp(&Value::from(-1i64)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::date(2024, 1, 1).native_cmp(&Value::date(2023, 1, 1)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(Value::from(json!([])).is_blank());
        assert!(Value::from(json!({})).is_blank());
        assert!(!Value::from(0i64).is_blank());
        assert!(!Value::Bool(false).is_blank());
    }

    #[test]
    fn test_parse_date_formats() {
        let day = parse_date("2024-03-05").unwrap();
        assert_eq!(Value::Date(day), Value::date(2024, 3, 5));
        assert!(parse_date("2024-03-05T10:00:00Z").is_some());
        assert!(parse_date("2024-03-05T10:00:00").is_some());
        assert!(parse_date("not a date").is_none());
    }

    #[test]
    fn test_serialize_integral_number_as_integer() {
        let v = Value::from(json!({"n": 3, "f": 1.5}));
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"n":3,"f":1.5}"#);
    }

    #[test]
    fn test_deserialize_from_json_text() {
        let v: Value = serde_json::from_str(r#"{"a":[1,"x",true]}"#).unwrap();
        assert_eq!(v.lookup("a.2"), Some(&Value::Bool(true)));
    }
}
