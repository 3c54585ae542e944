//! Value classification that drives form widget selection.

use crate::record::date::is_date_like;
use crate::record::flatten::FlatRecord;
use crate::record::path::PATH_SEPARATOR;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of value held by one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Date,
    Array,
    Object,
}

impl FieldKind {
    /// Stable lowercase key used across the UI boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Editor widget used to render a field of this kind.
    pub fn widget(self) -> FieldWidget {
        match self {
            Self::String => FieldWidget::TextInput,
            Self::Number => FieldWidget::NumberInput,
            Self::Boolean => FieldWidget::Switch,
            Self::Date => FieldWidget::DatePicker,
            Self::Array => FieldWidget::TagList,
            Self::Object => FieldWidget::Group,
        }
    }
}

/// Form editor widget for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldWidget {
    TextInput,
    NumberInput,
    Switch,
    DatePicker,
    TagList,
    Group,
}

impl FieldWidget {
    /// Widget key the UI maps to a concrete form control.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextInput => "text_input",
            Self::NumberInput => "number_input",
            Self::Switch => "switch",
            Self::DatePicker => "date_picker",
            Self::TagList => "tag_list",
            Self::Group => "group",
        }
    }
}

/// Classifies one JSON value.
///
/// `null` is treated as a string so it gets a plain text editor.
pub fn detect_field_kind(value: &Value) -> FieldKind {
    match value {
        Value::Null => FieldKind::String,
        Value::Bool(_) => FieldKind::Boolean,
        Value::Number(_) => FieldKind::Number,
        Value::Array(_) => FieldKind::Array,
        Value::Object(_) => FieldKind::Object,
        Value::String(text) if is_date_like(text) => FieldKind::Date,
        Value::String(_) => FieldKind::String,
    }
}

/// Descriptor for one generated form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Flat record key bound by this field.
    pub path: String,
    /// Human-readable label derived from the last path segment.
    pub label: String,
    pub kind: FieldKind,
    pub widget: FieldWidget,
}

/// Builds one form field descriptor per flat key, in record order.
pub fn describe_fields(flat: &FlatRecord) -> Vec<FormField> {
    flat.iter()
        .map(|(path, value)| {
            let kind = value.kind();
            FormField {
                path: path.clone(),
                label: humanize_key(path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)),
                kind,
                widget: kind.widget(),
            }
        })
        .collect()
}

/// Turns `startDate`, `start_date` or `start-date` into `Start date`.
pub fn humanize_key(key: &str) -> String {
    let mut words = String::with_capacity(key.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !words.ends_with(' ') && !words.is_empty() {
                words.push(' ');
            }
            prev_lower_or_digit = false;
            continue;
        }
        if c.is_uppercase() && prev_lower_or_digit {
            words.push(' ');
        }
        prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        words.extend(c.to_lowercase());
    }

    let trimmed = words.trim_end();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{describe_fields, detect_field_kind, humanize_key, FieldKind, FieldWidget};
    use crate::record::flatten::flatten;
    use serde_json::json;

    #[test]
    fn detects_every_kind() {
        assert_eq!(detect_field_kind(&json!(null)), FieldKind::String);
        assert_eq!(detect_field_kind(&json!(true)), FieldKind::Boolean);
        assert_eq!(detect_field_kind(&json!(3.5)), FieldKind::Number);
        assert_eq!(detect_field_kind(&json!(["a"])), FieldKind::Array);
        assert_eq!(detect_field_kind(&json!({"a": 1})), FieldKind::Object);
        assert_eq!(detect_field_kind(&json!("2024-01-15")), FieldKind::Date);
        assert_eq!(detect_field_kind(&json!("2024-99-99")), FieldKind::String);
        assert_eq!(detect_field_kind(&json!("hello")), FieldKind::String);
    }

    #[test]
    fn humanize_key_handles_common_casings() {
        assert_eq!(humanize_key("startDate"), "Start date");
        assert_eq!(humanize_key("start_date"), "Start date");
        assert_eq!(humanize_key("qualification-level"), "Qualification level");
        assert_eq!(humanize_key("level"), "Level");
        assert_eq!(humanize_key("ISO9001"), "Iso9001");
        assert_eq!(humanize_key(""), "");
    }

    #[test]
    fn describe_fields_follows_record_order() {
        let doc = json!({
            "company": {"name": "Acme", "founded": "2001-05-20"},
            "tags": ["a", "b"],
            "active": false
        });
        let flat = flatten(doc.as_object().unwrap());
        let fields = describe_fields(&flat);

        let paths: Vec<&str> = fields.iter().map(|field| field.path.as_str()).collect();
        assert_eq!(
            paths,
            ["company.name", "company.founded", "tags", "active"]
        );
        assert_eq!(fields[1].label, "Founded");
        assert_eq!(fields[1].kind, FieldKind::Date);
        assert_eq!(fields[1].widget, FieldWidget::DatePicker);
        assert_eq!(fields[2].widget, FieldWidget::TagList);
        assert_eq!(fields[3].widget, FieldWidget::Switch);
    }

    #[test]
    fn widget_keys_match_serialized_form() {
        for widget in [
            FieldWidget::TextInput,
            FieldWidget::NumberInput,
            FieldWidget::Switch,
            FieldWidget::DatePicker,
            FieldWidget::TagList,
            FieldWidget::Group,
        ] {
            assert_eq!(serde_json::to_value(widget).unwrap(), json!(widget.as_str()));
        }
    }
}
