//! Document repository contract with SQLite and in-memory adapters.

use crate::db::DbError;
use crate::record::NestedRecord;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DOCUMENT_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("valid document key regex"));

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for document storage.
#[derive(Debug)]
pub enum RepoError {
    InvalidKey(String),
    NotFound(String),
    InvalidData(String),
    /// Guarded write found a different revision (`None` when deleted).
    RevisionConflict {
        key: String,
        expected: u32,
        actual: Option<u32>,
    },
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid document key `{key}`"),
            Self::NotFound(key) => write!(f, "document not found: {key}"),
            Self::InvalidData(message) => write!(f, "invalid stored document: {message}"),
            Self::RevisionConflict {
                key,
                expected,
                actual,
            } => match actual {
                Some(actual) => write!(
                    f,
                    "document `{key}` is at revision {actual}, expected {expected}"
                ),
                None => write!(f, "document `{key}` is gone, expected revision {expected}"),
            },
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_)
            | Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::RevisionConflict { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored document with its current revision.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub key: String,
    pub body: NestedRecord,
    pub revision: u32,
}

/// Listing row without the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub key: String,
    pub revision: u32,
    /// Unix epoch milliseconds of the last save.
    pub updated_at: i64,
}

/// Storage contract for editable JSON documents.
pub trait DocumentRepository {
    fn get_document(&self, key: &str) -> RepoResult<Option<StoredDocument>>;
    /// Inserts or replaces a document and returns its new revision.
    fn save_document(&self, key: &str, body: &NestedRecord) -> RepoResult<u32>;
    /// Replaces a document only while it is still at `expected_revision`.
    ///
    /// The check and the write are one atomic step; a mismatch is
    /// [`RepoError::RevisionConflict`] and nothing is written.
    fn update_document(
        &self,
        key: &str,
        body: &NestedRecord,
        expected_revision: u32,
    ) -> RepoResult<u32>;
    /// Lists documents ordered by key.
    fn list_documents(&self) -> RepoResult<Vec<DocumentSummary>>;
    fn delete_document(&self, key: &str) -> RepoResult<()>;
}

impl<R: DocumentRepository + ?Sized> DocumentRepository for &R {
    fn get_document(&self, key: &str) -> RepoResult<Option<StoredDocument>> {
        (**self).get_document(key)
    }

    fn save_document(&self, key: &str, body: &NestedRecord) -> RepoResult<u32> {
        (**self).save_document(key, body)
    }

    fn update_document(
        &self,
        key: &str,
        body: &NestedRecord,
        expected_revision: u32,
    ) -> RepoResult<u32> {
        (**self).update_document(key, body, expected_revision)
    }

    fn list_documents(&self) -> RepoResult<Vec<DocumentSummary>> {
        (**self).list_documents()
    }

    fn delete_document(&self, key: &str) -> RepoResult<()> {
        (**self).delete_document(key)
    }
}

/// Rejects keys outside `[a-z0-9][a-z0-9._-]*`.
pub fn validate_document_key(key: &str) -> RepoResult<()> {
    if DOCUMENT_KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(RepoError::InvalidKey(key.to_string()))
    }
}

/// Parses stored JSON text into a document body.
pub fn parse_document_body(key: &str, text: &str) -> RepoResult<NestedRecord> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(body)) => Ok(body),
        Ok(_) => Err(RepoError::InvalidData(format!(
            "document `{key}` is not a JSON object"
        ))),
        Err(err) => Err(RepoError::InvalidData(format!(
            "document `{key}` is not valid JSON: {err}"
        ))),
    }
}

fn encode_body(key: &str, body: &NestedRecord) -> RepoResult<String> {
    serde_json::to_string(body).map_err(|err| {
        RepoError::InvalidData(format!("document `{key}` cannot be encoded: {err}"))
    })
}

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Wraps a connection opened through [`crate::db::open_db`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn get_document(&self, key: &str) -> RepoResult<Option<StoredDocument>> {
        validate_document_key(key)?;

        let row = self
            .conn
            .query_row(
                "SELECT key, body, revision FROM documents WHERE key = ?1;",
                [key],
                |row| {
                    Ok((
                        row.get::<_, String>("key")?,
                        row.get::<_, String>("body")?,
                        row.get::<_, u32>("revision")?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((key, body, revision)) => Ok(Some(StoredDocument {
                body: parse_document_body(&key, &body)?,
                key,
                revision,
            })),
            None => Ok(None),
        }
    }

    fn save_document(&self, key: &str, body: &NestedRecord) -> RepoResult<u32> {
        validate_document_key(key)?;
        let encoded = encode_body(key, body)?;

        let revision = self.conn.query_row(
            "INSERT INTO documents (key, body) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                revision = documents.revision + 1,
                updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)
             RETURNING revision;",
            params![key, encoded],
            |row| row.get::<_, u32>(0),
        )?;

        info!(
            "event=document_save module=repo status=ok backend=sqlite key={} revision={} bytes={}",
            key,
            revision,
            encoded.len()
        );
        Ok(revision)
    }

    fn update_document(
        &self,
        key: &str,
        body: &NestedRecord,
        expected_revision: u32,
    ) -> RepoResult<u32> {
        validate_document_key(key)?;
        let encoded = encode_body(key, body)?;

        let revision = self
            .conn
            .query_row(
                "UPDATE documents SET
                    body = ?3,
                    revision = revision + 1,
                    updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)
                 WHERE key = ?1 AND revision = ?2
                 RETURNING revision;",
                params![key, expected_revision, encoded],
                |row| row.get::<_, u32>(0),
            )
            .optional()?;

        match revision {
            Some(revision) => {
                info!(
                    "event=document_update module=repo status=ok backend=sqlite key={} revision={} bytes={}",
                    key,
                    revision,
                    encoded.len()
                );
                Ok(revision)
            }
            None => {
                let actual = self
                    .conn
                    .query_row(
                        "SELECT revision FROM documents WHERE key = ?1;",
                        [key],
                        |row| row.get::<_, u32>(0),
                    )
                    .optional()?;
                Err(RepoError::RevisionConflict {
                    key: key.to_string(),
                    expected: expected_revision,
                    actual,
                })
            }
        }
    }

    fn list_documents(&self) -> RepoResult<Vec<DocumentSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, revision, updated_at FROM documents ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(parse_summary_row(row)?);
        }
        Ok(summaries)
    }

    fn delete_document(&self, key: &str) -> RepoResult<()> {
        validate_document_key(key)?;
        let changed = self
            .conn
            .execute("DELETE FROM documents WHERE key = ?1;", [key])?;
        if changed == 0 {
            return Err(RepoError::NotFound(key.to_string()));
        }
        Ok(())
    }
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<DocumentSummary> {
    Ok(DocumentSummary {
        key: row.get("key")?,
        revision: row.get("revision")?,
        updated_at: row.get("updated_at")?,
    })
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    body: NestedRecord,
    revision: u32,
    updated_at: i64,
}

/// Fixture repository kept in process memory.
///
/// Stands in for the backend in demos and tests; same contract as SQLite.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    entries: RefCell<BTreeMap<String, MemoryEntry>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-filled with `documents` at revision 1.
    pub fn with_documents<I, K>(documents: I) -> RepoResult<Self>
    where
        I: IntoIterator<Item = (K, NestedRecord)>,
        K: AsRef<str>,
    {
        let repo = Self::new();
        for (key, body) in documents {
            repo.save_document(key.as_ref(), &body)?;
        }
        Ok(repo)
    }
}

impl DocumentRepository for InMemoryDocumentRepository {
    fn get_document(&self, key: &str) -> RepoResult<Option<StoredDocument>> {
        validate_document_key(key)?;
        Ok(self.entries.borrow().get(key).map(|entry| StoredDocument {
            key: key.to_string(),
            body: entry.body.clone(),
            revision: entry.revision,
        }))
    }

    fn save_document(&self, key: &str, body: &NestedRecord) -> RepoResult<u32> {
        validate_document_key(key)?;
        let now = chrono::Utc::now().timestamp_millis();
        let mut entries = self.entries.borrow_mut();
        let revision = entries.get(key).map_or(1, |entry| entry.revision + 1);
        entries.insert(
            key.to_string(),
            MemoryEntry {
                body: body.clone(),
                revision,
                updated_at: now,
            },
        );

        info!(
            "event=document_save module=repo status=ok backend=memory key={} revision={}",
            key, revision
        );
        Ok(revision)
    }

    fn update_document(
        &self,
        key: &str,
        body: &NestedRecord,
        expected_revision: u32,
    ) -> RepoResult<u32> {
        validate_document_key(key)?;
        let mut entries = self.entries.borrow_mut();
        let entry = match entries.get_mut(key) {
            Some(entry) if entry.revision == expected_revision => entry,
            other => {
                return Err(RepoError::RevisionConflict {
                    key: key.to_string(),
                    expected: expected_revision,
                    actual: other.map(|entry| entry.revision),
                })
            }
        };
        entry.body = body.clone();
        entry.revision += 1;
        entry.updated_at = chrono::Utc::now().timestamp_millis();

        info!(
            "event=document_update module=repo status=ok backend=memory key={} revision={}",
            key, entry.revision
        );
        Ok(entry.revision)
    }

    fn list_documents(&self) -> RepoResult<Vec<DocumentSummary>> {
        Ok(self
            .entries
            .borrow()
            .iter()
            .map(|(key, entry)| DocumentSummary {
                key: key.clone(),
                revision: entry.revision,
                updated_at: entry.updated_at,
            })
            .collect())
    }

    fn delete_document(&self, key: &str) -> RepoResult<()> {
        validate_document_key(key)?;
        match self.entries.borrow_mut().remove(key) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound(key.to_string())),
        }
    }
}
