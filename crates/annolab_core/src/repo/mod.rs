//! Document repository port and adapters.
//!
//! # Responsibility
//! - Define the storage contract the edit service depends on.
//! - Keep SQL and fixture storage details out of the service layer.
//!
//! # Invariants
//! - Stored bodies are always JSON objects.
//! - Document keys match `[a-z0-9][a-z0-9._-]*`.
//! - Every successful save bumps the document revision by one.

pub mod document_repo;
