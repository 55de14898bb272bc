mod common;

use common::{csv_meta, schema};
use csv_table_mapper::{
    ImportSession, ReconcileError, SchemaColumn, SchemaOrigin, TargetSchema, Violation,
    protocol::UploadRunRequest,
};

fn messages(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(ToString::to_string).collect()
}

#[test]
fn ad_hoc_schema_maps_every_column_one_to_one() {
    let mut session = ImportSession::new();
    session
        .ingest_csv(csv_meta("file-a", &["Id", "Name", "Email"]))
        .expect("ingest");
    let schema = session
        .derive_ad_hoc_schema("dbo.contacts", "NVARCHAR(255)")
        .expect("derive");
    assert_eq!(schema.column_names(), vec!["Id", "Name", "Email"]);
    assert!(schema.columns.iter().all(|c| c.nullable));

    let pairs: Vec<(&str, Option<&str>, &str)> = session
        .mappings()
        .iter()
        .map(|m| (m.target_col.as_str(), m.csv_col.as_deref(), m.target_type.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Id", Some("Id"), "NVARCHAR(255)"),
            ("Name", Some("Name"), "NVARCHAR(255)"),
            ("Email", Some("Email"), "NVARCHAR(255)"),
        ]
    );
    assert!(session.validate_for_submission().is_empty());
    assert_eq!(session.schema_origin(), Some(&SchemaOrigin::AdHoc));
}

fn persisted_schema_session() -> ImportSession {
    let mut session = ImportSession::new();
    session
        .ingest_csv(csv_meta("file-b", &["id", "full_name"]))
        .expect("ingest");
    session
        .adopt_named_schema(
            "people.json",
            schema(
                "dbo.people",
                &[("ID", "INT", false), ("Name", "NVARCHAR(50)", true)],
            ),
        )
        .expect("adopt");
    session
}

#[test]
fn persisted_schema_matches_case_insensitively_and_reports_gap() {
    let session = persisted_schema_session();
    let id = session.mapping("ID").expect("ID entry");
    assert_eq!(id.csv_col.as_deref(), Some("id"));
    let name = session.mapping("Name").expect("Name entry");
    assert_eq!(name.csv_col, None);

    assert_eq!(
        messages(&session.validate_for_submission()),
        vec!["\"Name\" has no mapped CSV column"]
    );
    let err = session.build_submission_payload().unwrap_err();
    assert!(matches!(err, ReconcileError::PreconditionFailed(_)));
}

#[test]
fn override_completes_mapping_and_reaches_payload() {
    let mut session = persisted_schema_session();
    session
        .set_mapping_override("Name", Some("full_name"), "NVARCHAR(100)")
        .expect("override");
    assert!(session.validate_for_submission().is_empty());

    let payload = session.build_submission_payload().expect("payload");
    assert_eq!(payload.file_id, "file-b");
    assert_eq!(payload.table, "dbo.people");
    assert_eq!(payload.schema_name.as_deref(), Some("people.json"));
    let name = payload.mapping_for("Name").expect("Name item");
    assert_eq!(name.csv_col.as_deref(), Some("full_name"));
    assert_eq!(name.target_type, "NVARCHAR(100)");

    let request = serde_json::to_value(UploadRunRequest::from(&payload)).expect("json");
    assert_eq!(request["mappings"][1]["target_col"], "Name");
    assert_eq!(request["mappings"][1]["csv_col"], "full_name");
    assert_eq!(request["mappings"][1]["target_type"], "NVARCHAR(100)");
}

#[test]
fn override_keeps_entry_order() {
    let mut session = persisted_schema_session();
    session
        .set_mapping_override("ID", None, "BIGINT")
        .expect("override");
    let targets: Vec<&str> = session
        .mappings()
        .iter()
        .map(|m| m.target_col.as_str())
        .collect();
    assert_eq!(targets, vec!["ID", "Name"]);
    assert_eq!(session.mapping("ID").unwrap().target_type, "BIGINT");
}

#[test]
fn payload_is_detached_from_later_edits() {
    let mut session = persisted_schema_session();
    session
        .set_mapping_override("Name", Some("full_name"), "NVARCHAR(100)")
        .unwrap();
    let payload = session.build_submission_payload().unwrap();
    let before = payload.clone();

    session
        .set_mapping_override("Name", None, "INT")
        .unwrap();
    session
        .ingest_csv(csv_meta("file-c", &["other"]))
        .unwrap();
    session.reset();

    assert_eq!(payload, before);
    assert_eq!(payload.mapping_for("Name").unwrap().csv_col.as_deref(), Some("full_name"));
}

#[test]
fn recompute_discards_overrides_and_is_idempotent() {
    let mut session = persisted_schema_session();
    session
        .set_mapping_override("Name", Some("full_name"), "NVARCHAR(100)")
        .unwrap();
    session.recompute_mapping();
    let first = session.mappings().to_vec();
    session.recompute_mapping();
    assert_eq!(session.mappings(), first.as_slice());
    assert_eq!(session.mapping("Name").unwrap().csv_col, None);
    assert_eq!(session.mapping("Name").unwrap().target_type, "NVARCHAR(50)");
}

#[test]
fn tiers_resolve_independently_per_column() {
    let mut session = ImportSession::new();
    session
        .ingest_csv(csv_meta("f", &["code", "CODE", "label", "legacy_amount"]))
        .unwrap();
    let target = TargetSchema::new(
        "dbo.items",
        vec![
            SchemaColumn::new("CODE", "INT", false),
            SchemaColumn::new("Label", "NVARCHAR(20)", true).with_source_hint("code"),
            SchemaColumn::new("Amount", "DECIMAL(18,2)", true).with_source_hint("legacy_amount"),
            SchemaColumn::new("Missing", "INT", true).with_source_hint("nope"),
        ],
    );
    session.adopt_schema(target).unwrap();

    let chosen: Vec<Option<&str>> = session
        .mappings()
        .iter()
        .map(|m| m.csv_col.as_deref())
        .collect();
    assert_eq!(
        chosen,
        vec![Some("CODE"), Some("label"), Some("legacy_amount"), None]
    );
    assert_eq!(session.schema_origin(), Some(&SchemaOrigin::Adopted { name: None }));
}

#[test]
fn case_collision_takes_first_column_in_file_order() {
    let mut session = ImportSession::new();
    session.ingest_csv(csv_meta("f", &["Id", "ID"])).unwrap();
    session
        .adopt_schema(schema("t", &[("id", "INT", true)]))
        .unwrap();
    assert_eq!(session.mapping("id").unwrap().csv_col.as_deref(), Some("Id"));
}

#[test]
fn ingest_rejects_malformed_headers() {
    let mut session = ImportSession::new();
    let err = session
        .ingest_csv(csv_meta("f", &["a", "a"]))
        .unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidInput(_)));
    let err = session.ingest_csv(csv_meta("f", &["a", ""])).unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidInput(_)));
    assert!(session.csv().is_none());
}

#[test]
fn adopt_rejects_duplicate_or_blank_columns() {
    let mut session = ImportSession::new();
    let err = session
        .adopt_schema(schema("t", &[("a", "INT", true), ("a", "INT", true)]))
        .unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidInput(_)));
    let err = session
        .adopt_schema(schema("t", &[("", "INT", true)]))
        .unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidInput(_)));
    assert!(session.schema().is_none());
}

#[test]
fn schema_without_csv_maps_nothing() {
    let mut session = ImportSession::new();
    session
        .adopt_schema(schema("t", &[("a", "INT", true)]))
        .unwrap();
    assert_eq!(session.mappings().len(), 1);
    assert_eq!(
        messages(&session.validate_for_submission()),
        vec![
            "No CSV file has been uploaded",
            "At least one target column must be mapped to a CSV column",
            "\"a\" has no mapped CSV column",
        ]
    );
    let err = session
        .set_mapping_override("a", Some("a"), "INT")
        .unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidInput(_)));
}

#[test]
fn blank_table_name_blocks_submission() {
    let mut session = ImportSession::new();
    session.ingest_csv(csv_meta("f", &["a"])).unwrap();
    session
        .adopt_schema(schema("  ", &[("a", "INT", true)]))
        .unwrap();
    assert_eq!(
        session.validate_for_submission(),
        vec![Violation::MissingTable]
    );
}

#[test]
fn hand_built_schema_can_start_from_generated_one() {
    let mut session = ImportSession::new();
    session
        .ingest_csv(csv_meta("f", &["first name", "Age"]))
        .unwrap();
    let mut edited = session
        .derive_ad_hoc_schema("dbo.people", "NVARCHAR(100)")
        .unwrap()
        .clone();
    edited.columns[0].name = "FirstName".to_string();
    edited.columns[1].sql_type = "INT".to_string();
    edited.columns[1].nullable = false;
    session.adopt_schema(edited).unwrap();

    let first = session.mapping("FirstName").unwrap();
    assert_eq!(first.csv_col.as_deref(), Some("first name"));
    assert_eq!(session.mapping("Age").unwrap().target_type, "INT");

    session.ingest_csv(csv_meta("g", &["first name", "Age"])).unwrap();
    assert!(session.schema().is_some());
    assert!(session.validate_for_submission().is_empty());
}

#[test]
fn unsupported_types_are_advisory() {
    let mut session = ImportSession::new();
    session.ingest_csv(csv_meta("f", &["notes"])).unwrap();
    session
        .adopt_schema(schema("t", &[("notes", "TEXT", true)]))
        .unwrap();
    assert!(session.validate_for_submission().is_empty());
    assert_eq!(
        messages(&session.unsupported_types()),
        vec!["\"notes\" uses unsupported type \"TEXT\""]
    );
}
