//! Type-aware record ordering with explicit null placement.

use crate::record::Record;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Asc),
            "desc" | "descending" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

/// Compare two records on the value at `key`.
///
/// Nulls (missing or explicit) come first ascending and last descending.
/// That placement is settled before the direction flip, which applies only
/// to the comparison of two present values.
pub fn compare(a: &Record, b: &Record, key: &str, direction: SortDirection) -> Ordering {
    let a_val = a.get(key).filter(|v| !v.is_null());
    let b_val = b.get(key).filter(|v| !v.is_null());

    let (a_val, b_val) = match (a_val, b_val) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => {
            return match direction {
                SortDirection::Asc => Ordering::Less,
                SortDirection::Desc => Ordering::Greater,
            };
        }
        (Some(_), None) => {
            return match direction {
                SortDirection::Asc => Ordering::Greater,
                SortDirection::Desc => Ordering::Less,
            };
        }
        (Some(a), Some(b)) => (a, b),
    };

    let base = compare_values(a_val, b_val);
    match direction {
        SortDirection::Asc => base,
        SortDirection::Desc => base.reverse(),
    }
}

/// Sort class of a present value: dates, then numbers, then everything
/// else by string form.
fn rank(value: &Value) -> u8 {
    match value {
        Value::Date(_) => 0,
        Value::Number(_) => 1,
        _ => 2,
    }
}

/// Total order over present values. Mixed classes order by [`rank`], so a
/// column holding `9`, `10` and `"10"` never forms a cycle.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Date(a), Value::Date(b)) => a.timestamp_millis().cmp(&b.timestamp_millis()),
        (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
        _ => rank(a).cmp(&rank(b)).then_with(|| {
            a.to_display_string()
                .to_lowercase()
                .cmp(&b.to_display_string().to_lowercase())
        }),
    }
}

/// Stable in-place sort of record references.
pub fn sort_records(records: &mut [&Record], key: &str, direction: SortDirection) {
    records.sort_by(|a, b| compare(a, b, key, direction));
}
