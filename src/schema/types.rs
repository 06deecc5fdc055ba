//! Table definition wire types
//!
//! These mirror the JSON a caller submits:
//!
//! ```json
//! {"name": "widgets", "displayName": "Widgets",
//!  "fields": [{"name": "sku", "displayName": "SKU", "dataType": "VARCHAR",
//!              "maxLength": 20, "isRequired": true, "isUnique": true, "order": 0}]}
//! ```
//!
//! Every member is lenient on input (missing strings default to empty) so the
//! validator, not the deserializer, reports what is wrong.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::DataKind;

/// A caller-submitted table definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    /// Logical table name, `^[a-z][a-z0-9_]*$`
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Ordered field list
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Appends a field
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }
}

/// Enumerated options attached to a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default)]
    pub options: Vec<String>,
}

/// One column's logical description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// Wire kind name; parsed into `DataKind` by the validator
    #[serde(default)]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_timeseries: bool,
    /// String, number or boolean literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iot_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    /// Display position; the list position is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            data_type: kind.as_str().to_string(),
            ..Self::default()
        }
    }

    pub fn max_length(mut self, max_length: i64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn precision(mut self, precision: i64, scale: i64) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn timeseries(mut self) -> Self {
        self.is_timeseries = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn srid(mut self, srid: i64) -> Self {
        self.srid = Some(srid);
        self
    }

    pub fn geometry_type(mut self, geometry_type: impl Into<String>) -> Self {
        self.geometry_type = Some(geometry_type.into());
        self
    }

    pub fn iot_config(mut self, config: Value) -> Self {
        self.iot_config = Some(config);
        self
    }

    pub fn relation(mut self, table: impl Into<String>, field: impl Into<String>) -> Self {
        self.relation_table = Some(table.into());
        self.relation_field = Some(field.into());
        self
    }

    pub fn on_delete(mut self, action: impl Into<String>) -> Self {
        self.on_delete = Some(action.into());
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validation = Some(FieldValidation {
            options: options.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Whether this field declares a foreign key
    pub fn is_relation(&self) -> bool {
        self.relation_table.is_some() || self.relation_field.is_some()
    }
}
