//! Dotted field paths used as flat record keys.

use std::fmt;

/// Separator between path segments in flat record keys.
pub const PATH_SEPARATOR: char = '.';

/// Field path split into its segments, e.g. `qualifications.construction.level`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Splits a dotted key into segments.
    ///
    /// Empty segments are kept: `a.` is the empty-string key inside `a`, and
    /// the empty key is a single empty segment.
    pub fn parse(key: &str) -> Self {
        Self(key.split(PATH_SEPARATOR).map(str::to_string).collect())
    }

    /// True when no segment is empty. Paths typed by an editor must be.
    pub fn is_well_formed(&self) -> bool {
        !self.0.iter().any(String::is_empty)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Last segment, i.e. the field's own key inside its parent object.
    pub fn leaf(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Segments leading to the parent object of the leaf.
    pub fn parents(&self) -> &[String] {
        match self.0.split_last() {
            Some((_, parents)) => parents,
            None => &[],
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Joins `prefix` and `key` the way flattened keys are built.
pub fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{key}")
    }
}
