//! Persisted catalog records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::DataKind;
use crate::ddl::naming::{history_table_name, physical_table_name};
use crate::schema::{FieldSpec, TableSpec};

/// One logical table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTable {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CustomTable {
    pub fn new(spec: &TableSpec, created_by: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: spec.name.clone(),
            display_name: spec.display_name.clone(),
            description: spec.description.clone(),
            icon: spec.icon.clone(),
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn physical_name(&self) -> String {
        physical_table_name(&self.name)
    }

    pub fn history_name(&self) -> String {
        history_table_name(&self.name)
    }
}

/// One field of a logical table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: Uuid,
    pub table_id: Uuid,
    pub name: String,
    pub display_name: String,
    pub data_type: DataKind,
    pub max_length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub is_required: bool,
    pub is_unique: bool,
    pub is_timeseries: bool,
    pub default_value: Option<String>,
    pub srid: Option<i32>,
    pub geometry_type: Option<String>,
    pub iot_config: Option<Value>,
    pub relation_table: Option<String>,
    pub relation_field: Option<String>,
    pub on_delete: Option<String>,
    pub validation_options: Option<Vec<String>>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl CustomField {
    pub fn from_spec(table_id: Uuid, field: &FieldSpec) -> Self {
        let to_i32 = |v: Option<u32>| v.map(|n| n as i32);
        Self {
            id: Uuid::new_v4(),
            table_id,
            name: field.name.clone(),
            display_name: field.display_name.clone(),
            data_type: field.kind,
            max_length: to_i32(field.params.max_length),
            precision: to_i32(field.params.precision),
            scale: to_i32(field.params.scale),
            is_required: field.is_required,
            is_unique: field.is_unique,
            is_timeseries: field.is_timeseries,
            default_value: field.default_value.clone(),
            srid: field.geometry.map(|g| g.srid),
            geometry_type: field.geometry.map(|g| g.subtype.as_str().to_string()),
            iot_config: field
                .iot
                .as_ref()
                .and_then(|c| serde_json::to_value(c).ok()),
            relation_table: field.relation.as_ref().map(|r| r.table.clone()),
            relation_field: field.relation.as_ref().map(|r| r.field.clone()),
            on_delete: field
                .relation
                .as_ref()
                .and_then(|r| r.on_delete)
                .map(|a| a.as_sql().to_string()),
            validation_options: if field.options.is_empty() {
                None
            } else {
                Some(field.options.clone())
            },
            order: field.order,
            created_at: Utc::now(),
        }
    }
}

/// A table with its fields ordered by `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTableWithFields {
    #[serde(flatten)]
    pub table: CustomTable,
    pub fields: Vec<CustomField>,
}

impl CustomTableWithFields {
    pub fn new(table: CustomTable, mut fields: Vec<CustomField>) -> Self {
        fields.sort_by_key(|f| f.order);
        Self { table, fields }
    }

    pub fn field(&self, name: &str) -> Option<&CustomField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn max_order(&self) -> Option<i32> {
        self.fields.iter().map(|f| f.order).max()
    }
}

/// Which half of the main/history pair a physical table is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicalRole {
    Main,
    History,
}

/// A physical `custom_*` table with no metadata row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedTable {
    pub physical_name: String,
    pub logical_name: String,
    pub role: PhysicalRole,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{check, FieldDefinition, TableDefinition};
    use serde_json::json;

    fn sites() -> TableSpec {
        check(
            &TableDefinition::new("sites", "Sites")
                .field(
                    FieldDefinition::new("status", "Status", DataKind::Varchar)
                        .max_length(12)
                        .options(["open", "closed"])
                        .order(1),
                )
                .field(
                    FieldDefinition::new("location", "Location", DataKind::GeometryPoint)
                        .srid(3857)
                        .order(0),
                ),
        )
        .unwrap()
    }

    #[test]
    fn test_field_from_spec() {
        let spec = sites();
        let table = CustomTable::new(&spec, "alice");
        let status = CustomField::from_spec(table.id, &spec.fields[0]);
        assert_eq!(status.data_type, DataKind::Varchar);
        assert_eq!(status.max_length, Some(12));
        assert_eq!(
            status.validation_options,
            Some(vec!["open".to_string(), "closed".to_string()])
        );

        let location = CustomField::from_spec(table.id, &spec.fields[1]);
        assert_eq!(location.srid, Some(3857));
        assert_eq!(location.geometry_type.as_deref(), Some("POINT"));
    }

    #[test]
    fn test_fields_sorted_by_order() {
        let spec = sites();
        let table = CustomTable::new(&spec, "alice");
        let fields = spec
            .fields
            .iter()
            .map(|f| CustomField::from_spec(table.id, f))
            .collect();
        let record = CustomTableWithFields::new(table, fields);
        assert_eq!(record.fields[0].name, "location");
        assert_eq!(record.max_order(), Some(1));
    }

    #[test]
    fn test_wire_shape() {
        let spec = sites();
        let table = CustomTable::new(&spec, "alice");
        let fields = vec![CustomField::from_spec(table.id, &spec.fields[0])];
        let value = serde_json::to_value(CustomTableWithFields::new(table, fields)).unwrap();
        assert_eq!(value["name"], "sites");
        assert_eq!(value["createdBy"], "alice");
        assert_eq!(value["fields"][0]["dataType"], json!("VARCHAR"));
        assert_eq!(value["fields"][0]["maxLength"], 12);
    }
}
