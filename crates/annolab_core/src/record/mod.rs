//! Nested document <-> flat form-model conversion.
//!
//! # Responsibility
//! - Flatten nested JSON objects into dotted-path field maps for form binding.
//! - Rebuild nested objects from edited field maps at save time.
//! - Classify values into form field kinds.
//!
//! # Invariants
//! - `unflatten(&flatten(x)) == Ok(x)` for every JSON object `x` whose keys
//!   contain no `.`; empty-string keys are allowed.
//! - Arrays are opaque leaves and are never split by index.
//! - Path segments are joined and split on `.`; keys containing `.` are
//!   not supported.

pub mod date;
pub mod field_kind;
pub mod field_value;
pub mod flatten;
pub mod path;
pub mod unflatten;

/// Nested JSON object as loaded from a document.
pub type NestedRecord = serde_json::Map<String, serde_json::Value>;
