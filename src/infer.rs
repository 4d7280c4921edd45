//! Value classification for raw CSV strings.

use std::collections::BTreeSet;

use crate::point::FieldValue;

/// Parse a float literal the way the command line tool always did:
/// surrounding whitespace is allowed, as are `nan` and `inf` spellings.
fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

pub fn is_float(value: &str) -> bool {
    parse_float(value).is_some()
}

pub fn is_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

/// Only `"true"` in any case maps to `true`
pub fn str_to_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// A float with no fractional part. `nan` and `inf` are not integers.
pub fn is_integer_like(value: &str) -> bool {
    parse_float(value).is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Coerce a raw value into a field value: float, then boolean, then text.
pub fn infer_field(value: &str) -> FieldValue {
    if let Some(f) = parse_float(value) {
        FieldValue::Float(f)
    } else if is_bool(value) {
        FieldValue::Boolean(str_to_bool(value))
    } else {
        FieldValue::Text(value.to_string())
    }
}

/// Strings that mark a row as missing data when they appear in a NaN
/// filter column. Matching is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NanSentinels {
    values: BTreeSet<String>,
}

impl Default for NanSentinels {
    fn default() -> Self {
        Self::new(["NaN"])
    }
}

impl NanSentinels {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }
}
