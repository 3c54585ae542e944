//! Nested object -> flat dotted-path record.

use crate::record::field_value::FieldValue;
use crate::record::path::join_key;
use crate::record::NestedRecord;
use indexmap::IndexMap;
use serde_json::Value;

/// Flat form model: dotted path -> leaf value, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    fields: IndexMap<String, FieldValue>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.fields.get(path)
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    /// Inserts or replaces one field, keeping the original position on replace.
    pub fn insert(&mut self, path: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(path.into(), value)
    }

    /// Removes one field, keeping the order of the remaining ones.
    pub fn remove(&mut self, path: &str) -> Option<FieldValue> {
        self.fields.shift_remove(path)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for FlatRecord {
    fn from_iter<T: IntoIterator<Item = (K, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(path, value)| (path.into(), value))
                .collect(),
        }
    }
}

impl IntoIterator for FlatRecord {
    type Item = (String, FieldValue);
    type IntoIter = indexmap::map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a FlatRecord {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = indexmap::map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Flattens a nested object into dotted-path leaves.
///
/// # Contract
/// - Objects with keys are recursed into; their children get `key.` prefixes.
/// - Strict `YYYY-MM-DD` strings become [`FieldValue::Date`].
/// - Arrays are stored whole under their own key.
/// - Total and pure: every input is accepted.
pub fn flatten(obj: &NestedRecord) -> FlatRecord {
    flatten_with_prefix(obj, "")
}

/// Same as [`flatten`], prefixing every produced key with `prefix.`.
pub fn flatten_with_prefix(obj: &NestedRecord, prefix: &str) -> FlatRecord {
    let mut flat = FlatRecord::new();
    flatten_into(obj, prefix, &mut flat);
    flat
}

fn flatten_into(obj: &NestedRecord, prefix: &str, out: &mut FlatRecord) {
    for (key, value) in obj {
        let path = join_key(prefix, key);
        match value {
            Value::Object(child) if !child.is_empty() => flatten_into(child, &path, out),
            other => {
                if let Some(leaf) = FieldValue::from_json(other) {
                    out.insert(path, leaf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{flatten, flatten_with_prefix, FlatRecord};
    use crate::record::field_value::FieldValue;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn flatten_joins_nested_keys() {
        let doc = json!({
            "qualifications": {"construction": {"level": "A", "expires": "2026-06-30"}},
            "name": "Acme"
        });
        let flat = flatten(doc.as_object().unwrap());

        assert_eq!(flat.len(), 3);
        assert_eq!(
            flat.get("qualifications.construction.level"),
            Some(&FieldValue::from("A"))
        );
        assert_eq!(
            flat.get("qualifications.construction.expires"),
            Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()))
        );
        let keys: Vec<&String> = flat.keys().collect();
        assert_eq!(
            keys,
            [
                "qualifications.construction.level",
                "qualifications.construction.expires",
                "name"
            ]
        );
    }

    #[test]
    fn flatten_with_prefix_prepends_accumulator() {
        let doc = json!({"a": {"b": true}});
        let flat = flatten_with_prefix(doc.as_object().unwrap(), "root");
        assert_eq!(flat.get("root.a.b"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn null_leaves_are_kept() {
        let doc = json!({"owner": null});
        let flat = flatten(doc.as_object().unwrap());
        assert_eq!(flat.get("owner"), Some(&FieldValue::Null));
    }

    #[test]
    fn flat_record_insert_keeps_position_on_replace() {
        let mut flat: FlatRecord = [("a", FieldValue::from(1)), ("b", FieldValue::from(2))]
            .into_iter()
            .collect();
        flat.insert("a", FieldValue::from(3));
        let keys: Vec<&String> = flat.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(flat.get("a"), Some(&FieldValue::from(3)));
    }
}
