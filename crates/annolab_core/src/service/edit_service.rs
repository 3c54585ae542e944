//! JSON document edit sessions.
//!
//! # Responsibility
//! - Load a stored document and expose it as a flat form model.
//! - Apply field edits and write the rebuilt document back.
//!
//! # Invariants
//! - `set_field` only touches existing paths; new paths go through `add_field`.
//! - Save never writes a partially rebuilt document.
//! - Save is rejected when the stored revision moved since the session opened;
//!   the revision check and the write happen in one repository call.

use crate::record::field_kind::{describe_fields, FormField};
use crate::record::field_value::{FieldInputError, FieldValue};
use crate::record::flatten::{flatten, FlatRecord};
use crate::record::path::FieldPath;
use crate::record::unflatten::{unflatten, UnflattenError};
use crate::record::NestedRecord;
use crate::repo::document_repo::{
    DocumentRepository, DocumentSummary, RepoError, StoredDocument,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type SessionResult<T> = Result<T, SessionError>;

/// Edit session failure.
#[derive(Debug)]
pub enum SessionError {
    UnknownField(String),
    DuplicateField(String),
    /// New field path with an empty segment.
    InvalidPath(String),
    InvalidInput {
        path: String,
        source: FieldInputError,
    },
    Unflatten(UnflattenError),
    StaleRevision {
        key: String,
        expected: u32,
        actual: Option<u32>,
    },
    Repo(RepoError),
}

impl SessionError {
    /// Message shown to the user when an edit or save is blocked.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownField(path) => format!("Field `{path}` does not exist in this document."),
            Self::DuplicateField(path) => format!("Field `{path}` already exists."),
            Self::InvalidPath(path) => {
                format!("`{path}` is not a valid field path (empty segment).")
            }
            Self::InvalidInput { path, source } => format!("Field `{path}`: {source}."),
            Self::Unflatten(UnflattenError::StructuralConflict { key, at }) => format!(
                "Cannot save: field `{key}` conflicts with field `{at}`. Nothing was written."
            ),
            Self::StaleRevision { key, .. } => format!(
                "Document `{key}` was changed elsewhere. Reload it before saving."
            ),
            Self::Repo(RepoError::NotFound(key)) => format!("Document `{key}` was not found."),
            Self::Repo(_) => "The document could not be stored. Try again later.".to_string(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::UnknownField(_) => "unknown_field",
            Self::DuplicateField(_) => "duplicate_field",
            Self::InvalidPath(_) => "invalid_path",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Unflatten(_) => "structural_conflict",
            Self::StaleRevision { .. } => "stale_revision",
            Self::Repo(_) => "repo_error",
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(path) => write!(f, "unknown field `{path}`"),
            Self::DuplicateField(path) => write!(f, "field `{path}` already exists"),
            Self::InvalidPath(path) => write!(f, "invalid field path `{path}`"),
            Self::InvalidInput { path, source } => {
                write!(f, "invalid input for field `{path}`: {source}")
            }
            Self::Unflatten(err) => write!(f, "{err}"),
            Self::StaleRevision {
                key,
                expected,
                actual,
            } => match actual {
                Some(actual) => write!(
                    f,
                    "document `{key}` is at revision {actual}, session expected {expected}"
                ),
                None => write!(f, "document `{key}` was deleted after revision {expected}"),
            },
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput { source, .. } => Some(source),
            Self::Unflatten(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::UnknownField(_)
            | Self::DuplicateField(_)
            | Self::InvalidPath(_)
            | Self::StaleRevision { .. } => None,
        }
    }
}

impl From<UnflattenError> for SessionError {
    fn from(value: UnflattenError) -> Self {
        Self::Unflatten(value)
    }
}

impl From<RepoError> for SessionError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::RevisionConflict {
                key,
                expected,
                actual,
            } => Self::StaleRevision {
                key,
                expected,
                actual,
            },
            other => Self::Repo(other),
        }
    }
}

/// One document opened for editing.
///
/// Owned by a single editor; the flat form model never leaves the session.
#[derive(Debug, Clone)]
pub struct EditSession {
    id: Uuid,
    document_key: String,
    revision: u32,
    fields: FlatRecord,
    dirty: bool,
}

impl EditSession {
    fn open(document: StoredDocument) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields: flatten(&document.body),
            document_key: document.key,
            revision: document.revision,
            dirty: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    /// Stored revision this session is based on.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn fields(&self) -> &FlatRecord {
        &self.fields
    }

    /// Form descriptors for every field, in document order.
    pub fn form_fields(&self) -> Vec<FormField> {
        describe_fields(&self.fields)
    }

    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.fields.get(path)
    }

    /// Replaces the value bound to `path`.
    ///
    /// # Errors
    /// - [`SessionError::UnknownField`] when `path` is not a field of the document.
    pub fn set_field(&mut self, path: &str, value: FieldValue) -> SessionResult<()> {
        let current = self
            .fields
            .get(path)
            .ok_or_else(|| SessionError::UnknownField(path.to_string()))?;
        if *current != value {
            self.fields.insert(path, value);
            self.dirty = true;
        }
        Ok(())
    }

    /// Coerces raw form text by the field's current kind and stores it.
    ///
    /// A `null` field accepts any text as a string.
    pub fn set_field_input(&mut self, path: &str, raw: &str) -> SessionResult<()> {
        let kind = self
            .fields
            .get(path)
            .map(FieldValue::kind)
            .ok_or_else(|| SessionError::UnknownField(path.to_string()))?;
        let value =
            FieldValue::parse_input(kind, raw).map_err(|source| SessionError::InvalidInput {
                path: path.to_string(),
                source,
            })?;
        self.set_field(path, value)
    }

    /// Adds a new field at `path`.
    ///
    /// Shape conflicts with existing fields (`a` vs `a.b`) surface on save.
    ///
    /// # Errors
    /// - [`SessionError::InvalidPath`] when `path` has an empty segment.
    /// - [`SessionError::DuplicateField`] when `path` already exists.
    pub fn add_field(&mut self, path: &str, value: FieldValue) -> SessionResult<()> {
        if !FieldPath::parse(path).is_well_formed() {
            return Err(SessionError::InvalidPath(path.to_string()));
        }
        if self.fields.contains_key(path) {
            return Err(SessionError::DuplicateField(path.to_string()));
        }
        self.fields.insert(path, value);
        self.dirty = true;
        Ok(())
    }

    /// Removes the field at `path` and returns its last value.
    pub fn remove_field(&mut self, path: &str) -> SessionResult<FieldValue> {
        let removed = self
            .fields
            .remove(path)
            .ok_or_else(|| SessionError::UnknownField(path.to_string()))?;
        self.dirty = true;
        Ok(removed)
    }

    /// Rebuilds the nested document from the current field values.
    pub fn to_document(&self) -> Result<NestedRecord, UnflattenError> {
        unflatten(&self.fields)
    }
}

/// Use-case service for editing stored documents.
pub struct DocumentEditService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> DocumentEditService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_documents(&self) -> SessionResult<Vec<DocumentSummary>> {
        Ok(self.repo.list_documents()?)
    }

    /// Stores a new or replacement document body without a session.
    pub fn import_document(&self, key: &str, body: &NestedRecord) -> SessionResult<u32> {
        Ok(self.repo.save_document(key, body)?)
    }

    /// Loads `key` and flattens it into a new edit session.
    pub fn open_session(&self, key: &str) -> SessionResult<EditSession> {
        let document = self
            .repo
            .get_document(key)?
            .ok_or_else(|| RepoError::NotFound(key.to_string()))?;
        let session = EditSession::open(document);

        info!(
            "event=session_open module=service status=ok session_id={} key={} revision={} fields={}",
            session.id,
            session.document_key,
            session.revision,
            session.fields.len()
        );
        Ok(session)
    }

    /// Rebuilds and stores the session's document, returning the new revision.
    ///
    /// # Errors
    /// - [`SessionError::Unflatten`] on conflicting field paths; nothing is written.
    /// - [`SessionError::StaleRevision`] when the stored document moved on.
    /// - [`SessionError::Repo`] on storage failure.
    pub fn save(&self, session: &mut EditSession) -> SessionResult<u32> {
        let base_revision = session.revision;
        self.save_at_revision(session, base_revision)
    }

    /// Same as [`Self::save`], but the write is guarded by `base_revision`,
    /// the revision the caller's form was rendered from.
    ///
    /// A clean session still reports [`SessionError::StaleRevision`] when
    /// `base_revision` is behind the revision it was opened at.
    pub fn save_at_revision(
        &self,
        session: &mut EditSession,
        base_revision: u32,
    ) -> SessionResult<u32> {
        let result = if session.dirty {
            self.write_session(session, base_revision)
        } else if base_revision == session.revision {
            info!(
                "event=session_save module=service status=skipped session_id={} key={} revision={}",
                session.id, session.document_key, session.revision
            );
            return Ok(session.revision);
        } else {
            Err(SessionError::StaleRevision {
                key: session.document_key.clone(),
                expected: base_revision,
                actual: Some(session.revision),
            })
        };

        match result {
            Ok(revision) => {
                session.revision = revision;
                session.dirty = false;
                info!(
                    "event=session_save module=service status=ok session_id={} key={} revision={}",
                    session.id, session.document_key, revision
                );
                Ok(revision)
            }
            Err(err) => {
                warn!(
                    "event=session_save module=service status=error session_id={} key={} error_code={} error={}",
                    session.id,
                    session.document_key,
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn write_session(&self, session: &EditSession, base_revision: u32) -> SessionResult<u32> {
        let document = session.to_document()?;
        Ok(self
            .repo
            .update_document(&session.document_key, &document, base_revision)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentEditService, SessionError};
    use crate::record::field_value::FieldValue;
    use crate::record::unflatten::UnflattenError;
    use crate::repo::document_repo::InMemoryDocumentRepository;
    use serde_json::json;

    #[test]
    fn unknown_field_edit_is_rejected() {
        let repo = InMemoryDocumentRepository::new();
        let service = DocumentEditService::new(&repo);
        service
            .import_document("profile", json!({"name": "Acme"}).as_object().unwrap())
            .unwrap();

        let mut session = service.open_session("profile").unwrap();
        let err = session
            .set_field("address", FieldValue::from("Somewhere"))
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownField(path) if path == "address"));
        assert!(!session.is_dirty());
    }

    #[test]
    fn user_message_names_conflicting_fields() {
        let err = SessionError::Unflatten(UnflattenError::StructuralConflict {
            key: "a.b".to_string(),
            at: "a".to_string(),
        });
        assert_eq!(
            err.user_message(),
            "Cannot save: field `a.b` conflicts with field `a`. Nothing was written."
        );
    }
}
