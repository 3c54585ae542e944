//! Leaf values of a flat record and form input coercion.

use crate::record::date::{format_date, parse_date_like};
use crate::record::field_kind::FieldKind;
use chrono::NaiveDate;
use serde_json::{Map, Number, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One leaf of a flat record.
///
/// Nested objects never appear here except `EmptyGroup`, which keeps an
/// object without keys alive across a flatten/unflatten cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Date-typed value parsed from a `YYYY-MM-DD` string.
    Date(NaiveDate),
    /// Whole array, edited as one repeated field.
    List(Vec<Value>),
    EmptyGroup,
}

impl FieldValue {
    /// Converts a JSON leaf into a field value.
    ///
    /// Returns `None` for objects with keys; those are flattened, not stored.
    pub fn from_json(value: &Value) -> Option<Self> {
        let field = match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => Self::Number(number.clone()),
            Value::String(text) => match parse_date_like(text) {
                Some(date) => Self::Date(date),
                None => Self::Text(text.clone()),
            },
            Value::Array(items) => Self::List(items.clone()),
            Value::Object(map) if map.is_empty() => Self::EmptyGroup,
            Value::Object(_) => return None,
        };
        Some(field)
    }

    /// Serializes this value back into its document form.
    ///
    /// Dates become canonical `YYYY-MM-DD` strings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => Value::Number(number.clone()),
            Self::Text(text) => Value::String(text.clone()),
            Self::Date(date) => Value::String(format_date(*date)),
            Self::List(items) => Value::Array(items.clone()),
            Self::EmptyGroup => Value::Object(Map::new()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Null | Self::Text(_) => FieldKind::String,
            Self::Bool(_) => FieldKind::Boolean,
            Self::Number(_) => FieldKind::Number,
            Self::Date(_) => FieldKind::Date,
            Self::List(_) => FieldKind::Array,
            Self::EmptyGroup => FieldKind::Object,
        }
    }

    /// Coerces raw form input into a value of `kind`.
    ///
    /// # Errors
    /// - Returns an error when `raw` cannot be read as `kind`.
    /// - Object fields only accept `{}`, which keeps an empty group.
    pub fn parse_input(kind: FieldKind, raw: &str) -> Result<Self, FieldInputError> {
        let trimmed = raw.trim();
        match kind {
            FieldKind::String => Ok(Self::Text(raw.to_string())),
            FieldKind::Number => serde_json::from_str::<Number>(trimmed)
                .map(Self::Number)
                .map_err(|_| FieldInputError::InvalidNumber(raw.to_string())),
            FieldKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(FieldInputError::InvalidBoolean(raw.to_string())),
            },
            FieldKind::Date => parse_date_like(trimmed)
                .map(Self::Date)
                .ok_or_else(|| FieldInputError::InvalidDate(raw.to_string())),
            FieldKind::Array => match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Array(items)) => Ok(Self::List(items)),
                _ => Err(FieldInputError::InvalidList(raw.to_string())),
            },
            FieldKind::Object => match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(map)) if map.is_empty() => Ok(Self::EmptyGroup),
                _ => Err(FieldInputError::UnsupportedKind(kind)),
            },
        }
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Form input that cannot be coerced into the field's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInputError {
    InvalidNumber(String),
    InvalidBoolean(String),
    InvalidDate(String),
    InvalidList(String),
    UnsupportedKind(FieldKind),
}

impl Display for FieldInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber(raw) => write!(f, "`{raw}` is not a number"),
            Self::InvalidBoolean(raw) => {
                write!(f, "`{raw}` is not a boolean (expected true|false)")
            }
            Self::InvalidDate(raw) => {
                write!(f, "`{raw}` is not a calendar date (expected YYYY-MM-DD)")
            }
            Self::InvalidList(raw) => write!(f, "`{raw}` is not a JSON array"),
            Self::UnsupportedKind(kind) => {
                write!(f, "{} fields only accept `{{}}` as text", kind.as_str())
            }
        }
    }
}

impl Error for FieldInputError {}
