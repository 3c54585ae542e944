//! FFI use-case API for the dashboard UI.
//!
//! # Responsibility
//! - Expose document form editing, navigation and catalogs to Dart via FRB.
//! - Keep error semantics simple: `ok` flag plus a user-facing message.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Field values cross the boundary as JSON text; dates as `YYYY-MM-DD`.

use annolab_core::db::open_db;
use annolab_core::{
    build_navigation, core_version as core_version_inner, describe_fields, flatten,
    init_logging as init_logging_inner, ping as ping_inner, unflatten, BreadcrumbResolver,
    DocumentEditService, FieldKind, FieldValue, FlatRecord, FormField, MenuEntry, NestedRecord,
    SessionError, SqliteDocumentRepository,
};
use log::warn;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::OnceLock;

const DOCUMENT_DB_FILE_NAME: &str = "annolab_documents.sqlite3";
static DOCUMENT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One generated form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFieldItem {
    /// Dotted flat record key.
    pub path: String,
    pub label: String,
    /// `string|number|boolean|date|array|object`.
    pub kind: String,
    /// `text_input|number_input|switch|date_picker|tag_list|group`.
    pub widget: String,
    /// Current value as JSON text.
    pub value_json: String,
}

/// Form model for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFormResponse {
    pub ok: bool,
    pub message: String,
    pub fields: Vec<FormFieldItem>,
    /// Stored revision, `0` for documents not loaded from the store.
    pub revision: u32,
}

impl DocumentFormResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            fields: Vec::new(),
            revision: 0,
        }
    }
}

/// Edited value of one form field as sent back by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInput {
    pub path: String,
    /// Kind to coerce `raw` into; usually `FormFieldItem::kind`, but a
    /// different kind changes the field's type.
    pub kind: String,
    /// Raw widget text; arrays are JSON array text.
    pub raw: String,
}

/// Result of rebuilding or saving a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSaveResponse {
    pub ok: bool,
    pub message: String,
    /// Rebuilt document as JSON text (empty on failure).
    pub document_json: String,
    pub revision: u32,
}

impl DocumentSaveResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            document_json: String::new(),
            revision: 0,
        }
    }
}

/// One breadcrumb for the page header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbItem {
    pub path: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbResponse {
    pub ok: bool,
    pub message: String,
    pub items: Vec<BreadcrumbItem>,
}

/// Flattens a JSON object text into form fields.
///
/// # FFI contract
/// - Sync, pure; never panics.
/// - Non-object or malformed JSON returns `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn describe_document(document_json: String) -> DocumentFormResponse {
    match parse_object(&document_json) {
        Ok(document) => {
            let flat = flatten(&document);
            DocumentFormResponse {
                ok: true,
                message: format!("{} field(s).", flat.len()),
                fields: to_form_items(&flat),
                revision: 0,
            }
        }
        Err(message) => DocumentFormResponse::failure(message),
    }
}

/// Rebuilds a JSON document from edited form fields.
///
/// # FFI contract
/// - Sync, pure; never panics.
/// - Conflicting paths (`a` and `a.b`) return `ok = false` and no document.
#[flutter_rust_bridge::frb(sync)]
pub fn rebuild_document(fields: Vec<FieldInput>) -> DocumentSaveResponse {
    let flat = match parse_inputs(&fields) {
        Ok(flat) => flat,
        Err(message) => return DocumentSaveResponse::failure(message),
    };
    match unflatten(&flat) {
        Ok(document) => DocumentSaveResponse {
            ok: true,
            message: "Document rebuilt.".to_string(),
            document_json: Value::Object(document).to_string(),
            revision: 0,
        },
        Err(err) => DocumentSaveResponse::failure(SessionError::from(err).user_message()),
    }
}

/// Loads a stored document as form fields.
///
/// # FFI contract
/// - Sync call, DB-backed execution; never panics.
/// - `revision` must be passed back to [`save_document_form`].
#[flutter_rust_bridge::frb(sync)]
pub fn load_document_form(key: String) -> DocumentFormResponse {
    let db_path = resolve_document_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => return DocumentFormResponse::failure(format!("document store failed: {err}")),
    };
    let service = DocumentEditService::new(SqliteDocumentRepository::new(&conn));

    match service.open_session(key.trim()) {
        Ok(session) => DocumentFormResponse {
            ok: true,
            message: format!("{} field(s).", session.fields().len()),
            fields: to_form_items(session.fields()),
            revision: session.revision(),
        },
        Err(err) => DocumentFormResponse::failure(err.user_message()),
    }
}

/// Applies edited fields to a stored document and saves it.
///
/// # FFI contract
/// - Sync call, DB-backed execution; never panics.
/// - Rejected when the stored revision differs from `base_revision`; the
///   check is part of the guarded write.
/// - Every field is coerced by its `kind`, so an existing field may change
///   type; unknown paths are added as new fields.
/// - Nothing is written when any field fails validation or paths conflict.
#[flutter_rust_bridge::frb(sync)]
pub fn save_document_form(
    key: String,
    base_revision: u32,
    fields: Vec<FieldInput>,
) -> DocumentSaveResponse {
    let db_path = resolve_document_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => return DocumentSaveResponse::failure(format!("document store failed: {err}")),
    };
    let service = DocumentEditService::new(SqliteDocumentRepository::new(&conn));

    let result = (|| -> Result<(u32, NestedRecord), String> {
        let mut session = service
            .open_session(key.trim())
            .map_err(|err| err.user_message())?;
        for field in &fields {
            let value = parse_input(field)?;
            let applied = if session.get(&field.path).is_some() {
                session.set_field(&field.path, value)
            } else {
                session.add_field(&field.path, value)
            };
            applied.map_err(|err| err.user_message())?;
        }
        let revision = service
            .save_at_revision(&mut session, base_revision)
            .map_err(|err| err.user_message())?;
        let document = session
            .to_document()
            .map_err(|err| SessionError::from(err).user_message())?;
        Ok((revision, document))
    })();

    match result {
        Ok((revision, document)) => DocumentSaveResponse {
            ok: true,
            message: "Document saved.".to_string(),
            document_json: Value::Object(document).to_string(),
            revision,
        },
        Err(message) => {
            warn!("event=ffi_save module=ffi status=error key={}", key.trim());
            DocumentSaveResponse::failure(message)
        }
    }
}

/// Resolves breadcrumbs for `location` against a JSON menu configuration.
///
/// # FFI contract
/// - Sync, pure; never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn resolve_breadcrumbs(menu_json: String, location: String) -> BreadcrumbResponse {
    let entries = match serde_json::from_str::<Vec<MenuEntry>>(&menu_json) {
        Ok(entries) => entries,
        Err(err) => {
            return BreadcrumbResponse {
                ok: false,
                message: format!("invalid menu configuration: {err}"),
                items: Vec::new(),
            }
        }
    };
    match build_navigation(&entries) {
        Ok(tree) => {
            let items = BreadcrumbResolver::from_navigation(&tree)
                .resolve(&location)
                .into_iter()
                .map(|crumb| BreadcrumbItem {
                    path: crumb.path,
                    title: crumb.title,
                })
                .collect::<Vec<_>>();
            BreadcrumbResponse {
                ok: true,
                message: format!("{} crumb(s).", items.len()),
                items,
            }
        }
        Err(err) => BreadcrumbResponse {
            ok: false,
            message: err.to_string(),
            items: Vec::new(),
        },
    }
}

fn parse_object(document_json: &str) -> Result<NestedRecord, String> {
    match serde_json::from_str::<Value>(document_json) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(_) => Err("document must be a JSON object".to_string()),
        Err(err) => Err(format!("document is not valid JSON: {err}")),
    }
}

fn parse_kind(kind: &str) -> Option<FieldKind> {
    match kind.trim() {
        "string" => Some(FieldKind::String),
        "number" => Some(FieldKind::Number),
        "boolean" => Some(FieldKind::Boolean),
        "date" => Some(FieldKind::Date),
        "array" => Some(FieldKind::Array),
        "object" => Some(FieldKind::Object),
        _ => None,
    }
}

fn parse_input(field: &FieldInput) -> Result<FieldValue, String> {
    let kind = parse_kind(&field.kind)
        .ok_or_else(|| format!("Field `{}`: unknown kind `{}`.", field.path, field.kind))?;
    FieldValue::parse_input(kind, &field.raw)
        .map_err(|err| format!("Field `{}`: {err}.", field.path))
}

fn parse_inputs(fields: &[FieldInput]) -> Result<FlatRecord, String> {
    let mut flat = FlatRecord::new();
    for field in fields {
        let value = parse_input(field)?;
        if flat.insert(field.path.clone(), value).is_some() {
            return Err(format!("Field `{}` is listed twice.", field.path));
        }
    }
    Ok(flat)
}

fn to_form_items(flat: &FlatRecord) -> Vec<FormFieldItem> {
    describe_fields(flat)
        .into_iter()
        .map(|field: FormField| {
            let value_json = flat
                .get(&field.path)
                .map(|value| value.to_json().to_string())
                .unwrap_or_default();
            FormFieldItem {
                label: field.label,
                kind: field.kind.as_str().to_string(),
                widget: field.widget.as_str().to_string(),
                value_json,
                path: field.path,
            }
        })
        .collect()
}

fn resolve_document_db_path() -> PathBuf {
    DOCUMENT_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("ANNOLAB_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DOCUMENT_DB_FILE_NAME)
        })
        .clone()
}
