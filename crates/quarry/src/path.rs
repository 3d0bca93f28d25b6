//! Field paths into JSON rows.
//!
//! A [`FieldPath`] is a list of segments. Resolving a path against a row
//! walks embedded objects segment by segment; when it meets an array with
//! segments still to consume, it fans out over every element. The result
//! says whether a fan-out happened so that conditions can apply their
//! any/all array semantics.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A dot-delimited path into an entity (`"supplier.name"`, `"items.unitPrice"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Builds a path from explicit segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldPath {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a dot-delimited path. Empty segments are dropped.
    pub fn parse(path: &str) -> Self {
        FieldPath::new(path.split('.').filter(|s| !s.is_empty()))
    }

    /// Appends another path, returning the joined path.
    pub fn join(&self, other: impl Into<FieldPath>) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.extend(other.into().segments);
        FieldPath { segments }
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the first segment, the top-level field of the entity.
    pub fn root(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Returns `true` if the path has more than one segment.
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// Returns `true` if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolves this path against a row.
    pub fn resolve<'a>(&self, row: &'a Map<String, Value>) -> Resolved<'a> {
        let Some((first, rest)) = self.segments.split_first() else {
            return Resolved::Single(None);
        };
        let Some(start) = row.get(first) else {
            return Resolved::Single(None);
        };

        let mut leaves = Vec::new();
        let mut fanned = false;
        walk(start, rest, &mut fanned, &mut leaves);

        if fanned {
            Resolved::Fanned(leaves)
        } else {
            Resolved::Single(leaves.into_iter().next().flatten())
        }
    }
}

fn walk<'a>(
    value: &'a Value,
    segments: &[String],
    fanned: &mut bool,
    leaves: &mut Vec<Option<&'a Value>>,
) {
    let Some((segment, rest)) = segments.split_first() else {
        leaves.push(Some(value));
        return;
    };

    match value {
        Value::Object(map) => match map.get(segment) {
            Some(next) => walk(next, rest, fanned, leaves),
            None => leaves.push(None),
        },
        Value::Array(items) => {
            *fanned = true;
            for item in items {
                walk(item, segments, fanned, leaves);
            }
        }
        _ => leaves.push(None),
    }
}

/// Outcome of resolving a [`FieldPath`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// The path never crossed an array. `None` means a segment was missing.
    Single(Option<&'a Value>),
    /// The path crossed at least one array; one entry per element reached.
    Fanned(Vec<Option<&'a Value>>),
}

impl<'a> Resolved<'a> {
    /// The value used as a sort key: the single value, or missing for fan-outs.
    pub fn sort_key(&self) -> Option<&'a Value> {
        match self {
            Resolved::Single(value) => *value,
            Resolved::Fanned(_) => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath::parse(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        FieldPath::parse(&path)
    }
}

impl From<&String> for FieldPath {
    fn from(path: &String) -> Self {
        FieldPath::parse(path)
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(path: &FieldPath) -> Self {
        path.clone()
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}
