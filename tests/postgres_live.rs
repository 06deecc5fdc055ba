//! Live PostgreSQL Tests
//!
//! Require a PostgreSQL server with PostGIS reachable at `DATABASE_URL`:
//!
//! ```text
//! DATABASE_URL=postgres://postgres@localhost/tableforge_test cargo test -- --ignored
//! ```

use std::sync::Arc;
use std::time::Duration;

use sqlx::{PgPool, Row};
use tableforge::catalog::DataKind;
use tableforge::database::{connect, PgDdlExecutor};
use tableforge::metadata::{MetadataStore, PgMetadataStore};
use tableforge::orchestrator::SchemaOrchestrator;
use tableforge::schema::{FieldDefinition, TableDefinition};

async fn setup() -> (SchemaOrchestrator, PgPool) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = connect(&url, 2, Duration::from_secs(10)).await.unwrap();

    let metadata = PgMetadataStore::new(pool.clone());
    metadata.ensure_schema().await.unwrap();

    let orchestrator = SchemaOrchestrator::new(
        Arc::new(PgDdlExecutor::new(pool.clone())),
        Arc::new(metadata),
    );
    (orchestrator, pool)
}

/// Table name unique to this run
fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}

#[tokio::test]
#[ignore]
async fn test_history_captures_insert_update_delete() {
    let (orchestrator, pool) = setup().await;
    let name = unique_name("widgets");

    let definition = TableDefinition::new(name.as_str(), "Widgets").field(
        FieldDefinition::new("sku", "SKU", DataKind::Varchar)
            .max_length(20)
            .required()
            .unique()
            .order(0),
    );
    let created = orchestrator.create_table(&definition, "system").await.unwrap();
    let main = created.table.physical_name();
    let history = created.table.history_name();

    let id: uuid::Uuid = sqlx::query(&format!(
        "INSERT INTO \"{}\" (\"sku\") VALUES ('A-1') RETURNING \"id\"",
        main
    ))
    .fetch_one(&pool)
    .await
    .unwrap()
    .get("id");
    sqlx::query(&format!("UPDATE \"{}\" SET \"sku\" = 'A-2' WHERE \"id\" = $1", main))
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(&format!("DELETE FROM \"{}\" WHERE \"id\" = $1", main))
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let rows = sqlx::query(&format!(
        "SELECT \"record_id\", \"operation\", \"sku\" FROM \"{}\" ORDER BY \"changed_at\", \"history_id\"",
        history
    ))
    .fetch_all(&pool)
    .await
    .unwrap();

    let operations: Vec<String> = rows.iter().map(|r| r.get("operation")).collect();
    assert_eq!(operations, vec!["INSERT", "UPDATE", "DELETE"]);
    for row in &rows {
        let record_id: uuid::Uuid = row.get("record_id");
        assert_eq!(record_id, id);
    }
    let last_sku: String = rows[2].get("sku");
    assert_eq!(last_sku, "A-2");

    orchestrator.delete_table(created.table.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_geometry_columns_match() {
    let (orchestrator, pool) = setup().await;
    let name = unique_name("sites");

    let definition = TableDefinition::new(name.as_str(), "Sites").field(
        FieldDefinition::new("location", "Location", DataKind::GeometryPoint)
            .srid(4326)
            .order(0),
    );
    let created = orchestrator.create_table(&definition, "system").await.unwrap();

    let rows = sqlx::query(
        "SELECT f_table_name, type, srid FROM geometry_columns \
         WHERE f_geometry_column = 'location' AND f_table_name = ANY($1) \
         ORDER BY f_table_name",
    )
    .bind(vec![created.table.physical_name(), created.table.history_name()])
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    for row in &rows {
        let kind: String = row.get("type");
        let srid: i32 = row.get("srid");
        assert_eq!(kind, "POINT");
        assert_eq!(srid, 4326);
    }

    orchestrator.delete_table(created.table.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_failed_creation_leaves_nothing() {
    let (orchestrator, pool) = setup().await;
    let name = unique_name("broken");

    // A relation to a table that does not exist fails at CREATE TABLE.
    let definition = TableDefinition::new(name.as_str(), "Broken").field(
        FieldDefinition::new("owner", "Owner", DataKind::Uuid).relation("no_such_table", "id"),
    );
    assert!(orchestrator.create_table(&definition, "system").await.is_err());

    let exists: bool = sqlx::query("SELECT to_regclass($1) IS NOT NULL AS present")
        .bind(format!("custom_{}", name))
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("present");
    assert!(!exists);
    assert!(orchestrator.get_table_by_name(&name).await.unwrap().is_none());
}
