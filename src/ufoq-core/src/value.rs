//! Cell values
//!
//! A [`Value`] is one of text, a 64-bit float, an integer or the [`Value::Missing`]
//! sentinel. Missing is distinct from zero and from empty text: it never compares
//! equal to anything in a predicate, and arithmetic statistics skip it.
//!
//! Two notions of equality live here and must not be confused:
//!
//! - [`PartialEq`]/[`Hash`] are *partition* equality. `Missing == Missing` holds so
//!   that rows with a missing key land in the same group, and `Int(3) == Number(3.0)`.
//! - [`Value::matches`] and [`Value::compare`] are *predicate* semantics, where any
//!   comparison involving Missing is false.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell of a [`Table`](crate::Table)
#[derive(Debug, Clone)]
pub enum Value {
    /// No usable data
    Missing,
    /// Text value
    Text(String),
    /// Floating point value (never NaN when built through [`Value::number`])
    Number(f64),
    /// Integer value, produced by counts and ranks
    Int(i64),
}

impl Value {
    /// Create a text value
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Create a numeric value, mapping NaN to [`Value::Missing`]
    #[must_use]
    pub fn number(f: f64) -> Self {
        if f.is_nan() {
            Value::Missing
        } else {
            Value::Number(f)
        }
    }

    /// Create an integer value
    #[must_use]
    pub fn int(i: i64) -> Self {
        Value::Int(i)
    }

    /// Check if value is missing
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Check if value is numeric (`Number` or `Int`)
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Int(_))
    }

    /// Numeric view of this value
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer view of this value
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Text view of this value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name of this value
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Missing => "missing",
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Int(_) => "integer",
        }
    }

    /// Divide a numeric value by a constant. Anything else yields Missing.
    #[must_use]
    pub fn div(&self, divisor: f64) -> Value {
        match self.as_f64() {
            Some(f) => Value::number(f / divisor),
            None => Value::Missing,
        }
    }

    /// Predicate equality: false whenever either side is Missing.
    #[must_use]
    pub fn matches(&self, other: &Value) -> bool {
        if self.is_missing() || other.is_missing() {
            return false;
        }
        self == other
    }

    /// Predicate ordering.
    ///
    /// Numbers compare numerically and text compares lexicographically. Mixed kinds
    /// and anything involving Missing are unordered.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    /// Total order used for sorting and ranking.
    ///
    /// Missing always sorts last, whatever the direction. Numbers come before text
    /// when a column mixes kinds.
    #[must_use]
    pub fn sort_cmp(&self, other: &Value, descending: bool) -> Ordering {
        match (self.is_missing(), other.is_missing()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        let ord = self.compare(other).unwrap_or_else(|| {
            // only mixed kinds (or an unbuilt NaN) reach here
            self.kind_rank().cmp(&other.kind_rank())
        });
        if descending {
            ord.reverse()
        } else {
            ord
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Number(_) | Value::Int(_) => 0,
            Value::Text(_) => 1,
            Value::Missing => 2,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::Int(i), Value::Number(f)) | (Value::Number(f), Value::Int(i)) => {
                exact_i64(*f) == Some(*i)
            }
            _ => false,
        }
    }
}

/// The integer a float holds exactly, if any. `-0.0` maps to `0`.
fn exact_i64(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX as f64 rounds up to it
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && f >= -LIMIT && f < LIMIT {
        Some(f as i64)
    } else {
        None
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Missing => 0u8.hash(state),
            Value::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
            Value::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Value::Number(f) => {
                2u8.hash(state);
                // integral floats must hash like the equal Int
                match exact_i64(*f) {
                    Some(i) => i.hash(state),
                    None => f.to_bits().hash(state),
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n:?}"),
            Value::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::number(f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}
