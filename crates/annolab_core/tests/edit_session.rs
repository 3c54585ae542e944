use annolab_core::db::open_db_in_memory;
use annolab_core::{
    DocumentEditService, DocumentRepository, DocumentSummary, FieldInputError, FieldKind,
    FieldValue, InMemoryDocumentRepository, NestedRecord, RepoError, RepoResult, SessionError,
    SqliteDocumentRepository, StoredDocument,
};
use chrono::NaiveDate;
use serde_json::json;

fn tender_profile() -> NestedRecord {
    json!({
        "company": {"name": "Acme Data", "founded": "2015-04-01"},
        "qualifications": {"construction": {"level": "B", "certified": true}},
        "staff": 40,
        "regions": ["east", "south"]
    })
    .as_object()
    .cloned()
    .unwrap()
}

#[test]
fn edit_and_save_rewrites_nested_document() {
    let conn = open_db_in_memory().unwrap();
    let service = DocumentEditService::new(SqliteDocumentRepository::new(&conn));
    service
        .import_document("tender.profile", &tender_profile())
        .unwrap();

    let mut session = service.open_session("tender.profile").unwrap();
    assert_eq!(session.revision(), 1);
    assert_eq!(session.fields().len(), 6);
    assert_eq!(
        session.get("company.founded"),
        Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2015, 4, 1).unwrap()))
    );

    session
        .set_field_input("qualifications.construction.level", "A")
        .unwrap();
    session.set_field_input("company.founded", "2016-01-20").unwrap();
    session.set_field_input("staff", "42").unwrap();
    session
        .set_field_input("regions", r#"["east", "south", "north"]"#)
        .unwrap();
    assert!(session.is_dirty());

    let revision = service.save(&mut session).unwrap();
    assert_eq!(revision, 2);
    assert!(!session.is_dirty());

    let stored = SqliteDocumentRepository::new(&conn)
        .get_document("tender.profile")
        .unwrap()
        .unwrap();
    assert_eq!(
        serde_json::Value::Object(stored.body),
        json!({
            "company": {"name": "Acme Data", "founded": "2016-01-20"},
            "qualifications": {"construction": {"level": "A", "certified": true}},
            "staff": 42,
            "regions": ["east", "south", "north"]
        })
    );
}

#[test]
fn form_fields_follow_document_order_and_kinds() {
    let repo = InMemoryDocumentRepository::with_documents([("tender.profile", tender_profile())])
        .unwrap();
    let service = DocumentEditService::new(&repo);
    let session = service.open_session("tender.profile").unwrap();

    let fields = session.form_fields();
    let kinds: Vec<(&str, FieldKind)> = fields
        .iter()
        .map(|field| (field.path.as_str(), field.kind))
        .collect();
    assert_eq!(
        kinds,
        [
            ("company.name", FieldKind::String),
            ("company.founded", FieldKind::Date),
            ("qualifications.construction.level", FieldKind::String),
            ("qualifications.construction.certified", FieldKind::Boolean),
            ("staff", FieldKind::Number),
            ("regions", FieldKind::Array),
        ]
    );
}

#[test]
fn invalid_input_keeps_session_clean() {
    let repo = InMemoryDocumentRepository::with_documents([("tender.profile", tender_profile())])
        .unwrap();
    let service = DocumentEditService::new(&repo);
    let mut session = service.open_session("tender.profile").unwrap();

    let err = session.set_field_input("staff", "forty").unwrap_err();
    match err {
        SessionError::InvalidInput { path, source } => {
            assert_eq!(path, "staff");
            assert_eq!(source, FieldInputError::InvalidNumber("forty".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!session.is_dirty());
}

#[test]
fn conflicting_added_field_blocks_save_without_writing() {
    let repo = InMemoryDocumentRepository::with_documents([("tender.profile", tender_profile())])
        .unwrap();
    let service = DocumentEditService::new(&repo);
    let mut session = service.open_session("tender.profile").unwrap();

    session
        .add_field("staff.count", FieldValue::from(12))
        .unwrap();
    let err = service.save(&mut session).unwrap_err();

    assert!(matches!(err, SessionError::Unflatten(_)));
    assert!(err.user_message().contains("staff.count"));
    assert!(session.is_dirty());
    let stored = repo.get_document("tender.profile").unwrap().unwrap();
    assert_eq!(stored.revision, 1);
    assert_eq!(stored.body, tender_profile());
}

#[test]
fn add_and_remove_fields() {
    let repo = InMemoryDocumentRepository::with_documents([("tender.profile", tender_profile())])
        .unwrap();
    let service = DocumentEditService::new(&repo);
    let mut session = service.open_session("tender.profile").unwrap();

    assert!(matches!(
        session.add_field("staff", FieldValue::from(1)),
        Err(SessionError::DuplicateField(_))
    ));
    session
        .add_field("company.contact.email", FieldValue::from("bid@acme.test"))
        .unwrap();
    assert_eq!(session.remove_field("regions").unwrap().kind(), FieldKind::Array);
    service.save(&mut session).unwrap();

    let stored = repo.get_document("tender.profile").unwrap().unwrap();
    assert_eq!(stored.body["company"]["contact"]["email"], json!("bid@acme.test"));
    assert!(!stored.body.contains_key("regions"));
}

#[test]
fn stale_session_is_rejected() {
    let repo = InMemoryDocumentRepository::with_documents([("tender.profile", tender_profile())])
        .unwrap();
    let service = DocumentEditService::new(&repo);
    let mut first = service.open_session("tender.profile").unwrap();
    let mut second = service.open_session("tender.profile").unwrap();

    first.set_field("staff", FieldValue::from(50)).unwrap();
    service.save(&mut first).unwrap();

    second.set_field("staff", FieldValue::from(60)).unwrap();
    let err = service.save(&mut second).unwrap_err();
    assert!(matches!(
        err,
        SessionError::StaleRevision {
            expected: 1,
            actual: Some(2),
            ..
        }
    ));
    let stored = repo.get_document("tender.profile").unwrap().unwrap();
    assert_eq!(stored.body["staff"], json!(50));
}

#[test]
fn clean_save_is_a_no_op() {
    let repo = InMemoryDocumentRepository::with_documents([("tender.profile", tender_profile())])
        .unwrap();
    let service = DocumentEditService::new(&repo);
    let mut session = service.open_session("tender.profile").unwrap();

    session
        .set_field("staff", FieldValue::from(40))
        .unwrap();
    assert!(!session.is_dirty());
    assert_eq!(service.save(&mut session).unwrap(), 1);
    assert_eq!(repo.get_document("tender.profile").unwrap().unwrap().revision, 1);
}

#[test]
fn opening_missing_document_fails() {
    let repo = InMemoryDocumentRepository::new();
    let service = DocumentEditService::new(&repo);
    let err = service.open_session("missing").unwrap_err();
    assert!(matches!(err, SessionError::Repo(RepoError::NotFound(_))));
    assert_eq!(err.user_message(), "Document `missing` was not found.");
}

/// Text a form widget shows for `value`.
fn widget_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        other => other.to_json().to_string(),
    }
}

#[test]
fn resubmitting_every_loaded_field_keeps_session_clean() {
    let mut body = tender_profile();
    body.insert("meta".to_string(), json!({}));
    body.insert("limits".to_string(), json!({"daily": {}}));
    let repo = InMemoryDocumentRepository::with_documents([("tender.profile", body.clone())])
        .unwrap();
    let service = DocumentEditService::new(&repo);
    let mut session = service.open_session("tender.profile").unwrap();

    let submitted: Vec<(String, String)> = session
        .fields()
        .iter()
        .map(|(path, value)| (path.clone(), widget_text(value)))
        .collect();
    for (path, raw) in &submitted {
        session.set_field_input(path, raw).unwrap();
    }

    assert!(!session.is_dirty());
    assert_eq!(session.get("meta"), Some(&FieldValue::EmptyGroup));
    assert_eq!(service.save(&mut session).unwrap(), 1);
    assert_eq!(session.to_document().unwrap(), body);
}

#[test]
fn documents_with_empty_string_keys_can_be_saved() {
    let body = json!({"a": {"": 1}, "name": "x"}).as_object().cloned().unwrap();
    let conn = open_db_in_memory().unwrap();
    let service = DocumentEditService::new(SqliteDocumentRepository::new(&conn));
    service.import_document("odd.keys", &body).unwrap();

    let mut session = service.open_session("odd.keys").unwrap();
    session.set_field_input("name", "y").unwrap();
    assert_eq!(service.save(&mut session).unwrap(), 2);

    let stored = SqliteDocumentRepository::new(&conn)
        .get_document("odd.keys")
        .unwrap()
        .unwrap();
    assert_eq!(
        serde_json::Value::Object(stored.body),
        json!({"a": {"": 1}, "name": "y"})
    );
}

#[test]
fn added_paths_with_empty_segments_are_rejected() {
    let repo = InMemoryDocumentRepository::with_documents([("tender.profile", tender_profile())])
        .unwrap();
    let service = DocumentEditService::new(&repo);
    let mut session = service.open_session("tender.profile").unwrap();

    for path in ["", "company..name", "contact.", ".email"] {
        assert!(matches!(
            session.add_field(path, FieldValue::from("x")),
            Err(SessionError::InvalidPath(_))
        ));
    }
    assert!(!session.is_dirty());
}

/// Commits a competing write just before every guarded update.
struct CompetingWriter<'a> {
    inner: &'a InMemoryDocumentRepository,
    competing_body: NestedRecord,
}

impl DocumentRepository for CompetingWriter<'_> {
    fn get_document(&self, key: &str) -> RepoResult<Option<StoredDocument>> {
        self.inner.get_document(key)
    }

    fn save_document(&self, key: &str, body: &NestedRecord) -> RepoResult<u32> {
        self.inner.save_document(key, body)
    }

    fn update_document(
        &self,
        key: &str,
        body: &NestedRecord,
        expected_revision: u32,
    ) -> RepoResult<u32> {
        self.inner.save_document(key, &self.competing_body)?;
        self.inner.update_document(key, body, expected_revision)
    }

    fn list_documents(&self) -> RepoResult<Vec<DocumentSummary>> {
        self.inner.list_documents()
    }

    fn delete_document(&self, key: &str) -> RepoResult<()> {
        self.inner.delete_document(key)
    }
}

#[test]
fn write_committed_during_save_is_not_overwritten() {
    let repo = InMemoryDocumentRepository::with_documents([("tender.profile", tender_profile())])
        .unwrap();
    let mut competing_body = tender_profile();
    competing_body.insert("staff".to_string(), json!(999));
    let service = DocumentEditService::new(CompetingWriter {
        inner: &repo,
        competing_body: competing_body.clone(),
    });

    let mut session = service.open_session("tender.profile").unwrap();
    session.set_field("staff", FieldValue::from(2)).unwrap();
    let err = service.save(&mut session).unwrap_err();

    assert!(matches!(
        err,
        SessionError::StaleRevision {
            expected: 1,
            actual: Some(2),
            ..
        }
    ));
    assert!(session.is_dirty());
    let stored = repo.get_document("tender.profile").unwrap().unwrap();
    assert_eq!(stored.revision, 2);
    assert_eq!(stored.body, competing_body);
}

#[test]
fn sqlite_guarded_update_rejects_moved_revision() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::new(&conn);
    let service = DocumentEditService::new(&repo);
    service
        .import_document("tender.profile", &tender_profile())
        .unwrap();

    let mut session = service.open_session("tender.profile").unwrap();
    let mut competing_body = tender_profile();
    competing_body.insert("staff".to_string(), json!(999));
    repo.save_document("tender.profile", &competing_body).unwrap();

    session.set_field("staff", FieldValue::from(2)).unwrap();
    assert!(matches!(
        service.save(&mut session),
        Err(SessionError::StaleRevision {
            expected: 1,
            actual: Some(2),
            ..
        })
    ));
    assert_eq!(
        repo.get_document("tender.profile").unwrap().unwrap().body,
        competing_body
    );
}

#[test]
fn save_at_older_base_revision_is_rejected() {
    let repo = InMemoryDocumentRepository::with_documents([("tender.profile", tender_profile())])
        .unwrap();
    let service = DocumentEditService::new(&repo);
    let mut bump = service.open_session("tender.profile").unwrap();
    bump.set_field("staff", FieldValue::from(41)).unwrap();
    assert_eq!(service.save(&mut bump).unwrap(), 2);

    let mut clean = service.open_session("tender.profile").unwrap();
    assert!(matches!(
        service.save_at_revision(&mut clean, 1),
        Err(SessionError::StaleRevision { expected: 1, .. })
    ));

    let mut edited = service.open_session("tender.profile").unwrap();
    edited.set_field("staff", FieldValue::from(43)).unwrap();
    assert!(matches!(
        service.save_at_revision(&mut edited, 1),
        Err(SessionError::StaleRevision {
            expected: 1,
            actual: Some(2),
            ..
        })
    ));
    assert_eq!(service.save_at_revision(&mut edited, 2).unwrap(), 3);
    assert_eq!(repo.get_document("tender.profile").unwrap().unwrap().body["staff"], json!(43));
}
