//! Core logic for the AnnoLab annotation-platform dashboard.
//! This crate is the single source of truth for document editing, navigation
//! and status catalogs; UI layers only bind to it.

pub mod catalog;
pub mod db;
pub mod logging;
pub mod navigation;
pub mod record;
pub mod repo;
pub mod service;

pub use catalog::status::{
    parse_tag, AnnotationTaskStatus, DatasetStatus, MemberRole, ReviewVerdict, StatusTag,
    TenderStage, Tone, UnknownTag,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use navigation::breadcrumb::{Breadcrumb, BreadcrumbResolver};
pub use navigation::menu::{
    build_navigation, MenuEntry, MenuError, MenuIcon, NavNode, NavigationTree, RouteTitle,
};
pub use record::field_kind::{detect_field_kind, describe_fields, FieldKind, FieldWidget, FormField};
pub use record::field_value::{FieldInputError, FieldValue};
pub use record::flatten::{flatten, flatten_with_prefix, FlatRecord};
pub use record::unflatten::{unflatten, UnflattenError};
pub use record::NestedRecord;
pub use repo::document_repo::{
    DocumentRepository, DocumentSummary, InMemoryDocumentRepository, RepoError, RepoResult,
    SqliteDocumentRepository, StoredDocument,
};
pub use service::edit_service::{DocumentEditService, EditSession, SessionError, SessionResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
