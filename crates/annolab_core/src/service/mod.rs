//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and record conversion into edit sessions.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod edit_service;
