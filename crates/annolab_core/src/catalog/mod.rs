//! Closed catalogs for dashboard status tags.
//!
//! # Responsibility
//! - Replace string-keyed status/label/color tables with exhaustive enums.
//! - Keep stable snake_case keys for storage and UI boundaries.
//!
//! # Invariants
//! - Every variant has exactly one key, label and tone.
//! - Parsing an unknown key is an error, never a silent fallback.

pub mod status;
