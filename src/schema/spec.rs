//! Checked table and field specifications
//!
//! A `TableSpec` only exists for a definition that passed every validation
//! rule. The DDL synthesizer and the orchestrator consume these, never the raw
//! wire types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{resolve_column_type, ColumnParams, DataKind, GeometrySubtype};

use super::iot::IotConfig;

/// Referential action for a foreign-key column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnDeleteAction {
    Cascade,
    SetNull,
    Restrict,
    NoAction,
    SetDefault,
}

impl OnDeleteAction {
    pub const ALL: [OnDeleteAction; 5] = [
        OnDeleteAction::Cascade,
        OnDeleteAction::SetNull,
        OnDeleteAction::Restrict,
        OnDeleteAction::NoAction,
        OnDeleteAction::SetDefault,
    ];

    /// SQL keyword form
    pub fn as_sql(&self) -> &'static str {
        match self {
            OnDeleteAction::Cascade => "CASCADE",
            OnDeleteAction::SetNull => "SET NULL",
            OnDeleteAction::Restrict => "RESTRICT",
            OnDeleteAction::NoAction => "NO ACTION",
            OnDeleteAction::SetDefault => "SET DEFAULT",
        }
    }

    /// Accepts `SET NULL`, `set_null` and `SetNull` spellings
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_uppercase();
        OnDeleteAction::ALL.iter().copied().find(|action| {
            action.as_sql().replace(' ', "") == normalized
        })
    }
}

impl fmt::Display for OnDeleteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Foreign-key target of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Logical name of the referenced custom table
    pub table: String,
    pub field: String,
    pub on_delete: Option<OnDeleteAction>,
}

/// SRID-bound geometry column parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryColumn {
    pub subtype: GeometrySubtype,
    pub srid: i32,
}

/// A validated field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub display_name: String,
    pub kind: DataKind,
    pub params: ColumnParams,
    pub is_required: bool,
    pub is_unique: bool,
    pub is_timeseries: bool,
    /// Default in literal text form, before quoting
    pub default_value: Option<String>,
    pub relation: Option<Relation>,
    pub geometry: Option<GeometryColumn>,
    pub iot: Option<IotConfig>,
    pub options: Vec<String>,
    pub order: i32,
}

impl FieldSpec {
    /// Concrete column type from the catalog
    pub fn column_type(&self) -> String {
        resolve_column_type(self.kind, &self.params)
    }

    pub fn is_geometry(&self) -> bool {
        self.geometry.is_some()
    }
}

/// A validated table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// Fields in definition order
    pub fields: Vec<FieldSpec>,
}

impl TableSpec {
    /// Fields expressible in a CREATE TABLE column list
    pub fn column_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.is_geometry())
    }

    /// Fields added out-of-band by the geometry extension
    pub fn geometry_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_geometry())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}
