//! Ordering types for query result sorting.
//!
//! Provides [`Direction`] for sort direction and [`OrderBy`] for path-based
//! ordering, plus the stable multi-key comparator the in-memory adapter uses.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::FieldPath;
use crate::value::compare_sort_keys;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Direction {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    /// Returns the wire name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ordering clause specifying a field and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: FieldPath,
    /// The sort direction.
    pub direction: Direction,
}

impl OrderBy {
    /// Creates a new ordering with the given direction.
    pub fn new(field: impl Into<FieldPath>, direction: Direction) -> Self {
        OrderBy {
            field: field.into(),
            direction,
        }
    }

    /// Creates a new ascending ordering for the given field.
    pub fn asc(field: impl Into<FieldPath>) -> Self {
        OrderBy::new(field, Direction::Asc)
    }

    /// Creates a new descending ordering for the given field.
    pub fn desc(field: impl Into<FieldPath>) -> Self {
        OrderBy::new(field, Direction::Desc)
    }

    /// Compares two rows on this clause alone.
    pub fn compare(&self, a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
        let key_a = self.field.resolve(a);
        let key_b = self.field.resolve(b);
        self.direction
            .apply(compare_sort_keys(key_a.sort_key(), key_b.sort_key()))
    }
}

/// Compares two rows using a list of ordering clauses.
///
/// The first clause is the primary key, the second breaks ties, and so on.
/// Used with a stable sort, rows equal on every clause keep their input order.
pub fn compare_rows(
    a: &Map<String, Value>,
    b: &Map<String, Value>,
    orderings: &[OrderBy],
) -> Ordering {
    for order_by in orderings {
        let ordering = order_by.compare(a, b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn direction_apply() {
        assert_eq!(Direction::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Direction::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Direction::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Asc.to_string(), "asc");
        assert_eq!(Direction::Desc.to_string(), "desc");
    }

    #[test]
    fn order_by_constructors() {
        let asc = OrderBy::asc("name");
        assert_eq!(asc.field, FieldPath::parse("name"));
        assert_eq!(asc.direction, Direction::Asc);
        assert_eq!(OrderBy::desc("priority").direction, Direction::Desc);
    }

    #[test]
    fn compare_on_nested_path() {
        let a = row(json!({"supplier": {"name": "Acme"}}));
        let b = row(json!({"supplier": {"name": "Bolt"}}));
        let by_supplier = OrderBy::asc("supplier.name");
        assert_eq!(by_supplier.compare(&a, &b), Ordering::Less);
        assert_eq!(
            OrderBy::desc("supplier.name").compare(&a, &b),
            Ordering::Greater
        );
    }

    #[test]
    fn missing_values_sort_last_ascending() {
        let present = row(json!({"n": 1}));
        let missing = row(json!({}));
        assert_eq!(OrderBy::asc("n").compare(&missing, &present), Ordering::Greater);
        assert_eq!(OrderBy::desc("n").compare(&missing, &present), Ordering::Less);
    }

    #[test]
    fn compare_by_multiple_orderings() {
        let rows = [
            row(json!({"name": "a", "priority": 1})),
            row(json!({"name": "b", "priority": 1})),
            row(json!({"name": "a", "priority": 2})),
        ];
        let orderings = vec![OrderBy::asc("priority"), OrderBy::asc("name")];

        assert_eq!(compare_rows(&rows[0], &rows[1], &orderings), Ordering::Less);
        assert_eq!(compare_rows(&rows[0], &rows[2], &orderings), Ordering::Less);
        assert_eq!(compare_rows(&rows[0], &rows[0], &orderings), Ordering::Equal);
    }

    #[test]
    fn fanned_out_paths_sort_as_missing() {
        let a = row(json!({"items": [{"p": 1}]}));
        let b = row(json!({"items": [{"p": 2}]}));
        assert_eq!(compare_rows(&a, &b, &[OrderBy::asc("items.p")]), Ordering::Equal);
    }
}
