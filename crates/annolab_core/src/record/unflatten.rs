//! Flat dotted-path record -> nested object.

use crate::record::field_value::FieldValue;
use crate::record::flatten::FlatRecord;
use crate::record::path::FieldPath;
use crate::record::NestedRecord;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reconstruction failure. No partial tree is returned with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnflattenError {
    /// Two keys imply different node shapes at `at`, e.g. `a` and `a.b`.
    StructuralConflict { key: String, at: String },
}

impl Display for UnflattenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StructuralConflict { key, at } => write!(
                f,
                "field `{key}` conflicts with the value already stored at `{at}`"
            ),
        }
    }
}

impl Error for UnflattenError {}

/// Rebuilds the nested object described by `flat`.
///
/// # Contract
/// - Keys are applied in record order; missing parents are created.
/// - [`FieldValue::Date`] leaves are written as `YYYY-MM-DD` strings.
/// - Empty segments name empty-string keys, so `a.` rebuilds `{"a": {"": ..}}`.
///
/// # Errors
/// - [`UnflattenError::StructuralConflict`] when a key needs an object where
///   a leaf already sits, or a leaf where an object already sits.
pub fn unflatten(flat: &FlatRecord) -> Result<NestedRecord, UnflattenError> {
    let mut root = Map::new();
    for (key, value) in flat {
        assign(&mut root, key, value)?;
    }
    Ok(root)
}

fn assign(root: &mut NestedRecord, key: &str, value: &FieldValue) -> Result<(), UnflattenError> {
    let path = FieldPath::parse(key);

    let mut cursor = root;
    for (depth, segment) in path.parents().iter().enumerate() {
        let node = cursor
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        cursor = match node {
            Value::Object(child) => child,
            _ => {
                return Err(UnflattenError::StructuralConflict {
                    key: key.to_string(),
                    at: path.segments()[..=depth].join("."),
                })
            }
        };
    }

    let leaf = path.leaf();
    if !cursor.contains_key(leaf) {
        cursor.insert(leaf.to_string(), value.to_json());
        return Ok(());
    }
    // An empty group over an existing object changes nothing.
    if *value == FieldValue::EmptyGroup && matches!(cursor.get(leaf), Some(Value::Object(_))) {
        return Ok(());
    }
    Err(UnflattenError::StructuralConflict {
        key: key.to_string(),
        at: key.to_string(),
    })
}
