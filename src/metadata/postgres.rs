//! PostgreSQL metadata store

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::errors::{MetadataError, MetadataResult};
use super::store::MetadataStore;
use super::types::{CustomField, CustomTable, CustomTableWithFields};

/// Catalog bootstrap, executed statement by statement
const SCHEMA: [&str; 5] = [
    "CREATE EXTENSION IF NOT EXISTS pgcrypto",
    "CREATE EXTENSION IF NOT EXISTS postgis",
    "CREATE TABLE IF NOT EXISTS meta_custom_tables (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL UNIQUE,
        display_name TEXT NOT NULL,
        description TEXT,
        icon TEXT,
        created_by TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )",
    "CREATE TABLE IF NOT EXISTS meta_custom_fields (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        table_id UUID NOT NULL REFERENCES meta_custom_tables(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        display_name TEXT NOT NULL,
        data_type TEXT NOT NULL,
        max_length INTEGER,
        precision INTEGER,
        scale INTEGER,
        is_required BOOLEAN NOT NULL DEFAULT FALSE,
        is_unique BOOLEAN NOT NULL DEFAULT FALSE,
        is_timeseries BOOLEAN NOT NULL DEFAULT FALSE,
        default_value TEXT,
        srid INTEGER,
        geometry_type TEXT,
        iot_config JSONB,
        relation_table TEXT,
        relation_field TEXT,
        on_delete TEXT,
        validation_options JSONB,
        \"order\" INTEGER NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (table_id, name)
    )",
    "CREATE INDEX IF NOT EXISTS idx_meta_custom_fields_table ON meta_custom_fields (table_id, \"order\")",
];

const TABLE_COLUMNS: &str =
    "id, name, display_name, description, icon, created_by, created_at, updated_at, deleted_at";

const FIELD_COLUMNS: &str = "id, table_id, name, display_name, data_type, max_length, precision, \
     scale, is_required, is_unique, is_timeseries, default_value, srid, geometry_type, iot_config, \
     relation_table, relation_field, on_delete, validation_options, \"order\", created_at";

/// Metadata persisted in `meta_custom_tables` / `meta_custom_fields`
#[derive(Debug, Clone)]
pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fields_for(&self, table_id: Uuid) -> MetadataResult<Vec<CustomField>> {
        let sql = format!(
            "SELECT {} FROM meta_custom_fields WHERE table_id = $1 ORDER BY \"order\", name",
            FIELD_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(table_id).fetch_all(&self.pool).await?;
        rows.iter().map(field_from_row).collect()
    }

    async fn with_fields(&self, row: Option<PgRow>) -> MetadataResult<Option<CustomTableWithFields>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let table = table_from_row(&row)?;
        let fields = self.fields_for(table.id).await?;
        Ok(Some(CustomTableWithFields::new(table, fields)))
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn ensure_schema(&self) -> MetadataResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> MetadataResult<Option<CustomTableWithFields>> {
        let sql = format!(
            "SELECT {} FROM meta_custom_tables WHERE name = $1 AND deleted_at IS NULL",
            TABLE_COLUMNS
        );
        let row = sqlx::query(&sql).bind(name).fetch_optional(&self.pool).await?;
        self.with_fields(row).await
    }

    async fn find_by_id(&self, id: Uuid) -> MetadataResult<Option<CustomTableWithFields>> {
        let sql = format!(
            "SELECT {} FROM meta_custom_tables WHERE id = $1 AND deleted_at IS NULL",
            TABLE_COLUMNS
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        self.with_fields(row).await
    }

    async fn list(&self) -> MetadataResult<Vec<CustomTableWithFields>> {
        let sql = format!(
            "SELECT {} FROM meta_custom_tables WHERE deleted_at IS NULL \
             ORDER BY created_at DESC, name",
            TABLE_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(record) = self.with_fields(Some(row)).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn insert_table(
        &self,
        table: CustomTable,
        fields: Vec<CustomField>,
    ) -> MetadataResult<CustomTableWithFields> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO meta_custom_tables \
             (id, name, display_name, description, icon, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(table.id)
        .bind(&table.name)
        .bind(&table.display_name)
        .bind(&table.description)
        .bind(&table.icon)
        .bind(&table.created_by)
        .bind(table.created_at)
        .bind(table.updated_at)
        .execute(&mut *tx)
        .await?;

        for field in &fields {
            insert_field_query(field)?.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(CustomTableWithFields::new(table, fields))
    }

    async fn insert_field(&self, field: CustomField) -> MetadataResult<CustomField> {
        insert_field_query(&field)?.execute(&self.pool).await?;
        Ok(field)
    }

    async fn delete(&self, id: Uuid) -> MetadataResult<bool> {
        let result = sqlx::query("DELETE FROM meta_custom_tables WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn table_names(&self) -> MetadataResult<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM meta_custom_tables ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(MetadataError::from))
            .collect()
    }
}

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>;

fn insert_field_query(field: &CustomField) -> MetadataResult<PgQuery<'_>> {
    let options = field
        .validation_options
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| MetadataError::Corrupt(e.to_string()))?;

    let sql = "INSERT INTO meta_custom_fields \
        (id, table_id, name, display_name, data_type, max_length, precision, scale, is_required, \
         is_unique, is_timeseries, default_value, srid, geometry_type, iot_config, relation_table, \
         relation_field, on_delete, validation_options, \"order\", created_at) \
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, \
         $19, $20, $21)";

    Ok(sqlx::query(sql)
        .bind(field.id)
        .bind(field.table_id)
        .bind(&field.name)
        .bind(&field.display_name)
        .bind(field.data_type.as_str())
        .bind(field.max_length)
        .bind(field.precision)
        .bind(field.scale)
        .bind(field.is_required)
        .bind(field.is_unique)
        .bind(field.is_timeseries)
        .bind(&field.default_value)
        .bind(field.srid)
        .bind(&field.geometry_type)
        .bind(&field.iot_config)
        .bind(&field.relation_table)
        .bind(&field.relation_field)
        .bind(&field.on_delete)
        .bind(options)
        .bind(field.order)
        .bind(field.created_at))
}

fn table_from_row(row: &PgRow) -> MetadataResult<CustomTable> {
    Ok(CustomTable {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        display_name: row.try_get("display_name")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

fn field_from_row(row: &PgRow) -> MetadataResult<CustomField> {
    let data_type: String = row.try_get("data_type")?;
    let data_type = data_type
        .parse()
        .map_err(|e: crate::catalog::UnsupportedKind| MetadataError::Corrupt(e.to_string()))?;

    let options: Option<Value> = row.try_get("validation_options")?;
    let validation_options = options
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| MetadataError::Corrupt(e.to_string()))?;

    Ok(CustomField {
        id: row.try_get("id")?,
        table_id: row.try_get("table_id")?,
        name: row.try_get("name")?,
        display_name: row.try_get("display_name")?,
        data_type,
        max_length: row.try_get("max_length")?,
        precision: row.try_get("precision")?,
        scale: row.try_get("scale")?,
        is_required: row.try_get("is_required")?,
        is_unique: row.try_get("is_unique")?,
        is_timeseries: row.try_get("is_timeseries")?,
        default_value: row.try_get("default_value")?,
        srid: row.try_get("srid")?,
        geometry_type: row.try_get("geometry_type")?,
        iot_config: row.try_get("iot_config")?,
        relation_table: row.try_get("relation_table")?,
        relation_field: row.try_get("relation_field")?,
        on_delete: row.try_get("on_delete")?,
        validation_options,
        order: row.try_get("order")?,
        created_at: row.try_get("created_at")?,
    })
}
