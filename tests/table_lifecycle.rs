//! Table Lifecycle Tests
//!
//! End-to-end orchestration against the in-memory backends:
//! - Creation materializes main table, history table, trigger and metadata
//! - Invalid definitions have no side effects
//! - Duplicate names are rejected and leave one table pair
//! - Failures roll back every object the call created
//! - Fields can be added; tables can be deleted; orphans are reported

use std::sync::Arc;

use serde_json::json;
use tableforge::catalog::DataKind;
use tableforge::database::MemoryDatabase;
use tableforge::metadata::{MemoryMetadataStore, PhysicalRole};
use tableforge::orchestrator::{CreationOutcome, SchemaOrchestrator, TableError};
use tableforge::schema::{FieldDefinition, TableDefinition};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (SchemaOrchestrator, MemoryDatabase, Arc<MemoryMetadataStore>) {
    let db = MemoryDatabase::new();
    let metadata = Arc::new(MemoryMetadataStore::new());
    let orchestrator = SchemaOrchestrator::new(Arc::new(db.clone()), metadata.clone());
    (orchestrator, db, metadata)
}

fn widgets() -> TableDefinition {
    TableDefinition::new("widgets", "Widgets").field(
        FieldDefinition::new("sku", "SKU", DataKind::Varchar)
            .max_length(20)
            .required()
            .unique()
            .order(0),
    )
}

fn sites() -> TableDefinition {
    TableDefinition::new("sites", "Sites")
        .field(FieldDefinition::new("label", "Label", DataKind::Text).order(0))
        .field(
            FieldDefinition::new("location", "Location", DataKind::GeometryPoint)
                .srid(4326)
                .required()
                .order(1),
        )
        .field(
            FieldDefinition::new("surveyed_at", "Surveyed", DataKind::TimestampTz)
                .timeseries()
                .order(2),
        )
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
async fn test_widgets_scenario() {
    let (orchestrator, db, metadata) = setup();

    let created = orchestrator.create_table(&widgets(), "alice").await.unwrap();
    assert_eq!(created.table.name, "widgets");
    assert_eq!(created.table.created_by, "alice");
    assert_eq!(created.fields.len(), 1);

    assert!(db.has_table("custom_widgets"));
    assert!(db.has_table("custom_widgets_history"));
    assert_eq!(
        db.columns("custom_widgets").unwrap(),
        vec!["id", "sku", "created_at", "updated_at", "deleted_at"]
    );
    assert!(db.has_function("custom_widgets_history_trigger"));
    assert_eq!(db.trigger_count("custom_widgets"), 1);
    assert_eq!(metadata.len(), 1);

    let err = orchestrator.create_table(&widgets(), "bob").await.unwrap_err();
    assert!(matches!(err, TableError::TableAlreadyExists(ref name) if name == "widgets"));
    assert_eq!(err.status_code(), 409);
}

/// A second create leaves exactly one main/history pair.
#[tokio::test]
async fn test_duplicate_create_leaves_one_pair() {
    let (orchestrator, db, metadata) = setup();

    orchestrator.create_table(&widgets(), "system").await.unwrap();
    let before = db.executed().len();

    for _ in 0..3 {
        assert!(orchestrator.create_table(&widgets(), "system").await.is_err());
    }

    assert_eq!(
        db.table_names(),
        vec!["custom_widgets", "custom_widgets_history"]
    );
    assert_eq!(db.executed().len(), before);
    assert_eq!(metadata.len(), 1);
}

#[tokio::test]
async fn test_history_table_columns() {
    let (orchestrator, db, _) = setup();
    orchestrator.create_table(&widgets(), "system").await.unwrap();

    let columns = db.columns("custom_widgets_history").unwrap();
    for expected in ["history_id", "record_id", "operation", "changed_by", "changed_at", "sku"] {
        assert!(columns.iter().any(|c| c == expected), "missing {}", expected);
    }
    assert!(!columns.iter().any(|c| c == "id"));
}

/// Fields come back in submitted order with their kinds unchanged.
#[tokio::test]
async fn test_order_and_kind_round_trip() {
    let (orchestrator, _, _) = setup();

    let definition = TableDefinition::new("readings", "Readings")
        .field(FieldDefinition::new("value", "Value", DataKind::Decimal).precision(10, 2).order(2))
        .field(FieldDefinition::new("taken_at", "Taken", DataKind::Timestamp).order(0))
        .field(FieldDefinition::new("flags", "Flags", DataKind::Tags).order(1))
        .field(
            FieldDefinition::new("sensor", "Sensor", DataKind::IotSensor)
                .iot_config(json!({"sensorType": "temperature", "unit": "C"}))
                .order(3),
        );

    orchestrator.create_table(&definition, "system").await.unwrap();
    let stored = orchestrator
        .get_table_by_name("readings")
        .await
        .unwrap()
        .unwrap();

    let names: Vec<&str> = stored.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["taken_at", "flags", "value", "sensor"]);

    let kinds: Vec<DataKind> = stored.fields.iter().map(|f| f.data_type).collect();
    assert_eq!(
        kinds,
        vec![DataKind::Timestamp, DataKind::Tags, DataKind::Decimal, DataKind::IotSensor]
    );
    assert_eq!(stored.fields[2].precision, Some(10));
    assert_eq!(stored.fields[2].scale, Some(2));
}

/// Geometry columns exist on both tables with the same type.
#[tokio::test]
async fn test_geometry_symmetry() {
    let (orchestrator, db, _) = setup();
    orchestrator.create_table(&sites(), "system").await.unwrap();

    assert!(db.columns("custom_sites").unwrap().contains(&"location".to_string()));
    assert!(db
        .columns("custom_sites_history")
        .unwrap()
        .contains(&"location".to_string()));

    let geometry_sql: Vec<String> = db
        .executed()
        .into_iter()
        .filter(|s| s.sql.contains("ADD COLUMN \"location\""))
        .map(|s| s.sql)
        .collect();
    assert_eq!(geometry_sql.len(), 2);
    assert!(geometry_sql
        .iter()
        .all(|sql| sql.contains("geometry(POINT, 4326)")));

    assert_eq!(db.indexes("custom_sites").len(), 2);
    assert_eq!(db.indexes("custom_sites_history").len(), 1);
}

// =============================================================================
// Validation
// =============================================================================

/// An invalid field name is reported by position and nothing is created.
#[tokio::test]
async fn test_invalid_field_name_has_no_side_effects() {
    let (orchestrator, db, metadata) = setup();

    let definition = TableDefinition::new("gadgets", "Gadgets")
        .field(FieldDefinition::new("ok_name", "Ok", DataKind::Text).order(0))
        .field(FieldDefinition::new("Bad-Name", "Bad", DataKind::Text).order(1));

    let report = orchestrator.validate(&definition);
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("fields[1]")));

    let err = orchestrator.create_table(&definition, "system").await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(err.violations().iter().any(|e| e.contains("fields[1]")));

    assert!(db.executed().is_empty());
    assert!(db.table_names().is_empty());
    assert!(metadata.is_empty());
}

/// A name that would land on another table's history table is a 400, not a
/// failed creation.
#[tokio::test]
async fn test_history_suffixed_name_rejected() {
    let (orchestrator, db, metadata) = setup();
    orchestrator.create_table(&widgets(), "system").await.unwrap();
    let executed = db.executed().len();

    let mut definition = widgets();
    definition.name = "widgets_history".to_string();

    let err = orchestrator.create_table(&definition, "system").await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(err.violations().iter().any(|e| e.contains("_history")));

    assert_eq!(db.executed().len(), executed);
    assert_eq!(metadata.len(), 1);
}

/// Every violation is reported at once.
#[tokio::test]
async fn test_all_violations_reported() {
    let (orchestrator, _, _) = setup();

    let definition = TableDefinition::new("1bad", "")
        .field(FieldDefinition::new("code", "Code", DataKind::Varchar).order(0))
        .field(FieldDefinition::new("amount", "Amount", DataKind::Numeric).order(1));

    let err = orchestrator.create_table(&definition, "system").await.unwrap_err();
    let violations = err.violations();
    assert!(violations.len() >= 4, "{:?}", violations);
    assert!(violations.iter().any(|e| e.contains("maxLength")));
    assert!(violations.iter().any(|e| e.contains("precision")));
}

// =============================================================================
// Rollback
// =============================================================================

/// Trigger failure after both tables exist drops both.
#[tokio::test]
async fn test_rollback_on_trigger_failure() {
    let (orchestrator, db, metadata) = setup();
    db.fail_on("CREATE TRIGGER");

    let err = orchestrator.create_table(&widgets(), "system").await.unwrap_err();
    match err {
        TableError::CreationFailed {
            outcome, orphaned, ..
        } => {
            assert_eq!(outcome, CreationOutcome::RolledBackClean);
            assert!(orphaned.is_empty());
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert!(!db.has_table("custom_widgets"));
    assert!(!db.has_table("custom_widgets_history"));
    assert!(!db.has_function("custom_widgets_history_trigger"));
    assert!(metadata.is_empty());
}

/// Metadata failure after all DDL succeeded drops every object.
#[tokio::test]
async fn test_rollback_on_metadata_failure() {
    let (orchestrator, db, metadata) = setup();
    metadata.set_fail_inserts(true);

    let err = orchestrator.create_table(&sites(), "system").await.unwrap_err();
    assert!(matches!(
        err,
        TableError::CreationFailed {
            outcome: CreationOutcome::RolledBackClean,
            ..
        }
    ));
    assert!(db.table_names().is_empty());
    assert!(metadata.is_empty());

    metadata.set_fail_inserts(false);
    orchestrator.create_table(&sites(), "system").await.unwrap();
    assert!(db.has_table("custom_sites"));
}

/// Failed drops are reported as orphans.
#[tokio::test]
async fn test_partial_rollback_reports_orphans() {
    let (orchestrator, db, _) = setup();
    db.fail_on("CREATE TRIGGER");
    db.fail_drops();

    let err = orchestrator.create_table(&widgets(), "system").await.unwrap_err();
    match err {
        TableError::CreationFailed {
            outcome, orphaned, ..
        } => {
            assert!(outcome.may_have_orphans());
            assert!(orphaned.contains(&"custom_widgets".to_string()));
            assert!(orphaned.contains(&"custom_widgets_history".to_string()));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    db.heal();
    let orphans = orchestrator.find_orphans().await.unwrap();
    assert_eq!(orphans.len(), 2);
    assert!(orphans
        .iter()
        .any(|o| o.role == PhysicalRole::History && o.logical_name == "widgets"));
}

/// A failing first statement creates nothing.
#[tokio::test]
async fn test_failure_on_first_statement() {
    let (orchestrator, db, _) = setup();
    db.insert_table("custom_widgets", &["id"]);

    let err = orchestrator.create_table(&widgets(), "system").await.unwrap_err();
    assert!(matches!(
        err,
        TableError::CreationFailed {
            outcome: CreationOutcome::RolledBackClean,
            ..
        }
    ));
    assert!(db.has_table("custom_widgets"));
    assert!(!db.has_table("custom_widgets_history"));
}

// =============================================================================
// Add Field / Delete / Orphans
// =============================================================================

#[tokio::test]
async fn test_add_field() {
    let (orchestrator, db, _) = setup();
    let created = orchestrator.create_table(&widgets(), "system").await.unwrap();
    let id = created.table.id;

    let field = orchestrator
        .add_field_to_table(id, &FieldDefinition::new("price", "Price", DataKind::Decimal).precision(8, 2))
        .await
        .unwrap();
    assert_eq!(field.order, 1);

    assert!(db.columns("custom_widgets").unwrap().contains(&"price".to_string()));
    assert!(db
        .columns("custom_widgets_history")
        .unwrap()
        .contains(&"price".to_string()));

    let function_sql = db
        .executed()
        .into_iter()
        .filter(|s| s.object == "custom_widgets_history_trigger")
        .last()
        .unwrap()
        .sql;
    assert!(function_sql.contains("\"price\""));
    assert!(function_sql.contains("\"sku\""));

    let stored = orchestrator.get_table_by_id(id).await.unwrap().unwrap();
    let names: Vec<&str> = stored.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["sku", "price"]);

    let err = orchestrator
        .add_field_to_table(id, &FieldDefinition::new("sku", "SKU", DataKind::Text))
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::FieldAlreadyExists { .. }));
}

#[tokio::test]
async fn test_add_field_to_missing_table() {
    let (orchestrator, _, _) = setup();
    let err = orchestrator
        .add_field_to_table(uuid::Uuid::new_v4(), &FieldDefinition::new("x", "X", DataKind::Text))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_delete_table() {
    let (orchestrator, db, metadata) = setup();
    let created = orchestrator.create_table(&widgets(), "system").await.unwrap();

    orchestrator.delete_table(created.table.id).await.unwrap();
    assert!(db.table_names().is_empty());
    assert!(!db.has_function("custom_widgets_history_trigger"));
    assert!(metadata.is_empty());
    assert!(orchestrator.get_tables().await.unwrap().is_empty());

    let err = orchestrator.delete_table(created.table.id).await.unwrap_err();
    assert!(matches!(err, TableError::TableNotFound(_)));

    orchestrator.create_table(&widgets(), "system").await.unwrap();
    assert_eq!(metadata.len(), 1);
}

#[tokio::test]
async fn test_orphans_ignore_recorded_tables() {
    let (orchestrator, db, _) = setup();
    orchestrator.create_table(&widgets(), "system").await.unwrap();
    db.insert_table("custom_stray", &["id"]);

    let orphans = orchestrator.find_orphans().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].physical_name, "custom_stray");
    assert_eq!(orphans[0].logical_name, "stray");
    assert_eq!(orphans[0].role, PhysicalRole::Main);
}
