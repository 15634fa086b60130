//! Schema Invariant Tests
//!
//! Primary-key validation and record parsing:
//! - An empty partition key never validates
//! - Every key must name a declared field; the first offender is reported
//! - Valid declarations yield primary_key == partition ++ clustering
//! - Parsing drops unmapped keys and maps null to null

use serde::Deserialize;
use serde_json::json;
use widerow::schema::{
    FieldDef, FieldSet, FieldType, PartitionKey, PrimaryKeySpec, RowTypeDraft, SchemaErrorCode,
    SchemaRegistry, SchemaValidator,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn field_set(names: &[&str]) -> FieldSet {
    FieldSet::try_from_defs(names.iter().map(|n| FieldDef::new(*n, FieldType::Text))).unwrap()
}

fn field_sets() -> Vec<FieldSet> {
    vec![
        field_set(&["a"]),
        field_set(&["a", "b"]),
        field_set(&["id", "bucket", "ts", "payload"]),
    ]
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Partition Key Presence
// =============================================================================

/// Empty partition fails regardless of fields or clustering keys.
#[test]
fn test_empty_partition_always_fails() {
    for fields in field_sets() {
        for clustering in [vec![], strings(&["a"]), strings(&["nope"])] {
            let pk = PrimaryKeySpec::new(PartitionKey::Composite(vec![])).with_clustering(clustering);
            let err = SchemaValidator::validate("t", fields.clone(), Some(&pk)).unwrap_err();
            assert_eq!(err.code(), SchemaErrorCode::EmptyPartitionKey);
        }
    }
}

/// Absent primary key fails as missing, not empty.
#[test]
fn test_absent_primary_key_is_missing() {
    for fields in field_sets() {
        let err = SchemaValidator::validate("t", fields.clone(), None).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MissingPrimaryKey);

        let err = SchemaValidator::validate("t", fields, Some(&PrimaryKeySpec::default())).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MissingPrimaryKey);
    }
}

// =============================================================================
// Unknown Identifiers
// =============================================================================

/// The specific undeclared partition identifier is reported.
#[test]
fn test_unknown_partition_identifier_reported() {
    let fields = field_set(&["id", "bucket", "ts"]);
    for (partition, offender) in [
        (vec!["region"], "region"),
        (vec!["bucket", "region"], "region"),
        (vec!["zone", "region"], "zone"),
        (vec!["bucket", "ts", "shard"], "shard"),
    ] {
        let pk = PrimaryKeySpec::new(partition);
        let err = SchemaValidator::validate("t", fields.clone(), Some(&pk)).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownPartitionKey);
        assert_eq!(err.identifier(), Some(offender));
        assert!(err.is_fatal());
    }
}

/// The specific undeclared clustering identifier is reported.
#[test]
fn test_unknown_clustering_identifier_reported() {
    let fields = field_set(&["id", "bucket", "ts"]);
    for (clustering, offender) in [
        (vec!["seq"], "seq"),
        (vec!["ts", "seq"], "seq"),
        (vec!["x", "ts"], "x"),
    ] {
        let pk = PrimaryKeySpec::new("bucket").with_clustering(clustering);
        let err = SchemaValidator::validate("t", fields.clone(), Some(&pk)).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownClusteringKey);
        assert_eq!(err.identifier(), Some(offender));
    }
}

/// A field used as both partition and clustering key is rejected.
#[test]
fn test_overlapping_keys_rejected() {
    let pk = PrimaryKeySpec::new(["a", "b"]).with_clustering(["b"]);
    let err = SchemaValidator::validate("t", field_set(&["a", "b"]), Some(&pk)).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::UnknownClusteringKey);
    assert_eq!(err.identifier(), Some("b"));
}

// =============================================================================
// Valid Declarations
// =============================================================================

/// primary_key is partition followed by clustering, in input order.
#[test]
fn test_primary_key_preserves_input_order() {
    let fields = field_set(&["a", "b", "c", "d", "e"]);
    for (partition, clustering) in [
        (vec!["a"], vec![]),
        (vec!["e", "a"], vec!["c"]),
        (vec!["c"], vec!["e", "d", "a"]),
        (vec!["b", "a", "e"], vec!["d", "c"]),
    ] {
        let pk = PrimaryKeySpec::new(partition.clone()).with_clustering(clustering.clone());
        let d = SchemaValidator::validate("t", fields.clone(), Some(&pk)).unwrap();

        let expected: Vec<String> = strings(&partition).into_iter().chain(strings(&clustering)).collect();
        assert_eq!(d.primary_key(), expected.as_slice());
        assert_eq!(d.partition_keys(), strings(&partition).as_slice());
        assert_eq!(d.clustering_keys(), strings(&clustering).as_slice());
    }
}

/// Single and one-element composite partition keys are equivalent.
#[test]
fn test_single_partition_flattens() {
    let fields = field_set(&["a", "b"]);
    let single = SchemaValidator::validate("t", fields.clone(), Some(&PrimaryKeySpec::new("a"))).unwrap();
    let composite = SchemaValidator::validate("t", fields, Some(&PrimaryKeySpec::new(["a"]))).unwrap();
    assert_eq!(single, composite);
}

/// Declaration JSON accepts both partition forms.
#[test]
fn test_partition_forms_from_json() {
    let single: PrimaryKeySpec = serde_json::from_value(json!({ "partition": "a" })).unwrap();
    let composite: PrimaryKeySpec =
        serde_json::from_value(json!({ "partition": ["a", "b"], "clustering": ["c"] })).unwrap();
    assert_eq!(single.partition.unwrap().as_slice(), ["a".to_string()]);
    assert_eq!(composite.partition.unwrap().as_slice().len(), 2);
    assert_eq!(composite.clustering, vec!["c".to_string()]);
}

// =============================================================================
// Record Parsing
// =============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct Event {
    id: String,
    bucket: String,
    ts: i64,
    payload: String,
}

fn events_draft() -> RowTypeDraft {
    RowTypeDraft::new("events")
        .field("id", FieldType::Uuid)
        .field("bucket", FieldType::Text)
        .field("ts", FieldType::Timestamp)
        .field("payload", FieldType::Text)
        .partition_key("bucket")
        .clustering_keys(["ts"])
}

/// Null in, null out.
#[test]
fn test_parse_null_is_null() {
    let d = events_draft().finish().unwrap();
    assert!(d.parse(None).is_none());
    assert_eq!(d.parse_as::<Event>(None).unwrap(), None);
}

/// Every declared field is carried over; unmapped keys vanish.
#[test]
fn test_parse_maps_declared_fields() {
    let d = events_draft().finish().unwrap();
    let record = json!({
        "id": "a7f1",
        "bucket": "b1",
        "ts": 1700000000,
        "payload": "hello",
        "ttl": 3600,
        "writetime": 1
    });

    let row = d.parse(record.as_object()).unwrap();
    assert_eq!(row.len(), 4);
    for field in ["id", "bucket", "ts", "payload"] {
        assert_eq!(row.get(field), record.get(field));
    }
    assert!(row.get("ttl").is_none());

    let event: Event = d.parse_as(record.as_object()).unwrap().unwrap();
    assert_eq!(
        event,
        Event {
            id: "a7f1".into(),
            bucket: "b1".into(),
            ts: 1700000000,
            payload: "hello".into(),
        }
    );
}

// =============================================================================
// Registry
// =============================================================================

/// A failed declaration leaves no descriptor behind.
#[test]
fn test_failed_declaration_registers_nothing() {
    let mut registry = SchemaRegistry::new();
    let err = registry
        .declare_json(
            r#"{
                "name": "events",
                "fields": [{ "name": "bucket", "type": "text" }, { "name": "ts", "type": "timestamp" }],
                "primary_key": { "partition": [], "clustering": ["ts"] }
            }"#,
        )
        .unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::EmptyPartitionKey);
    assert!(registry.get("events").is_none());
}

/// Collection types survive a declaration round trip.
#[test]
fn test_collection_field_types_from_json() {
    let mut registry = SchemaRegistry::new();
    let d = registry
        .declare_json(
            r#"{
                "name": "profiles",
                "fields": [
                    { "name": "user", "type": "uuid" },
                    { "name": "tags", "type": "set", "element_type": { "type": "text" } },
                    { "name": "scores", "type": "map", "key_type": { "type": "text" }, "value_type": { "type": "int" } }
                ],
                "primary_key": { "partition": "user" }
            }"#,
        )
        .unwrap();
    assert_eq!(d.field("tags").unwrap().field_type, FieldType::set_of(FieldType::Text));
    assert_eq!(
        d.field("scores").unwrap().field_type.to_string(),
        "map<text, int>"
    );
}
