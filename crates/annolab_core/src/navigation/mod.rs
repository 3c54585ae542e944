//! Sidebar navigation and breadcrumb resolution.
//!
//! # Responsibility
//! - Turn declarative menu configuration into a validated navigation tree.
//! - Resolve the current location into breadcrumb titles.
//!
//! # Invariants
//! - Every resolved route path is normalized (`/a/b`, root is `/`).
//! - Route paths are unique across the whole configuration.
//! - Hidden entries never appear in the menu but still name breadcrumbs.

pub mod breadcrumb;
pub mod menu;
