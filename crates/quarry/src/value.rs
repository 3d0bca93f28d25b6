//! Value comparison over JSON rows.
//!
//! Rows cross the adapter boundary as JSON objects, so every comparison the
//! engine performs is between [`serde_json::Value`]s. Numbers keep their
//! integer/float distinction through [`Number`] so that `10` and `10.0`
//! compare equal without losing `u64`/`i64` precision.

use std::cmp::Ordering;

use serde_json::Value;

/// Numeric value preserving the precision of the JSON source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Reads a JSON number.
    pub fn from_json(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::I64(i)
        } else if let Some(u) = n.as_u64() {
            Number::U64(u)
        } else {
            Number::F64(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    /// Converts the number to f64 for mixed comparisons.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            // A negative i64 is below every u64
            (Number::I64(a), Number::U64(b)) => Some(if a < 0 {
                Ordering::Less
            } else {
                (a as u64).cmp(&b)
            }),
            (Number::U64(a), Number::I64(b)) => Some(if b < 0 {
                Ordering::Greater
            } else {
                a.cmp(&(b as u64))
            }),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

/// Value equality used by `eq`, `neq`, `in` and `nin`.
///
/// Numbers compare numerically; arrays and objects compare structurally
/// with the same rule applied to their members.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            Number::from_json(x).compare(Number::from_json(y)) == Some(Ordering::Equal)
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, l)| y.get(k).is_some_and(|r| values_equal(l, r)))
        }
        _ => a == b,
    }
}

/// Ordered comparison used by `gt`, `gte`, `lt`, `lte` and `between`.
///
/// Both sides are coerced to a common type: numbers compare numerically,
/// strings lexicographically, booleans `false < true`, and a number against
/// a numeric string compares as numbers. Anything else is incomparable.
pub fn compare_coerced(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Number::from_json(x).compare(Number::from_json(y)),
        (Value::String(x), Value::String(y)) => Some(x.as_str().cmp(y.as_str())),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::String(s)) => {
            let parsed = s.trim().parse::<f64>().ok()?;
            Number::from_json(x).compare(Number::F64(parsed))
        }
        (Value::String(s), Value::Number(y)) => {
            let parsed = s.trim().parse::<f64>().ok()?;
            Number::F64(parsed).compare(Number::from_json(y))
        }
        _ => None,
    }
}

/// Returns `true` for a missing or null value.
pub fn is_nullish(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Compares two sort keys with a total order.
///
/// Missing and null values sort last. Values of the same type compare
/// naturally; values of different types order by type
/// (`bool < number < string < array < object`) so that sorting never sees an
/// inconsistent comparator. Arrays and objects tie with their own kind.
pub fn compare_sort_keys(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(x), Some(y)) => match (x, y) {
            (Value::Number(m), Value::Number(n)) => Number::from_json(m)
                .compare(Number::from_json(n))
                .unwrap_or(Ordering::Equal),
            (Value::String(m), Value::String(n)) => m.cmp(n),
            (Value::Bool(m), Value::Bool(n)) => m.cmp(n),
            _ => type_rank(x).cmp(&type_rank(y)),
        },
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}
