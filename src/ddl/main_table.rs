//! Main table synthesis

use crate::schema::{FieldSpec, TableSpec};

use super::naming::{physical_table_name, quote_ident, render_default};
use super::statement::{DdlStatement, StatementKind};

/// Surrogate key column prepended to every main table
pub const ID_COLUMN: &str = "\"id\" UUID PRIMARY KEY DEFAULT gen_random_uuid()";

/// Audit columns appended to every main and history table
pub const AUDIT_COLUMNS: [&str; 3] = [
    "\"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()",
    "\"updated_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()",
    "\"deleted_at\" TIMESTAMPTZ",
];

/// Names of the audit columns, in table order
pub const AUDIT_COLUMN_NAMES: [&str; 3] = ["created_at", "updated_at", "deleted_at"];

/// `CREATE TABLE "custom_<name>"` with the surrogate key, every non-geometry
/// field and the audit columns.
pub fn main_table_ddl(table: &TableSpec) -> DdlStatement {
    let physical = physical_table_name(&table.name);

    let mut columns = Vec::with_capacity(table.fields.len() + 4);
    columns.push(ID_COLUMN.to_string());
    columns.extend(table.column_fields().map(column_definition));
    columns.extend(AUDIT_COLUMNS.iter().map(|c| c.to_string()));

    let sql = format!(
        "CREATE TABLE {} (\n  {}\n)",
        quote_ident(&physical),
        columns.join(",\n  ")
    );

    DdlStatement::new(StatementKind::CreateTable, physical, sql)
}

/// `name type [NOT NULL] [UNIQUE] [DEFAULT ...] [REFERENCES ...]`
pub fn column_definition(field: &FieldSpec) -> String {
    let mut column = format!("{} {}", quote_ident(&field.name), field.column_type());

    if field.is_required {
        column.push_str(" NOT NULL");
    }
    if field.is_unique {
        column.push_str(" UNIQUE");
    }
    if let Some(default) = &field.default_value {
        column.push_str(" DEFAULT ");
        column.push_str(&render_default(field.kind, default));
    }
    if let Some(relation) = &field.relation {
        column.push_str(&format!(
            " REFERENCES {}({})",
            quote_ident(&physical_table_name(&relation.table)),
            quote_ident(&relation.field)
        ));
        if let Some(action) = relation.on_delete {
            column.push_str(" ON DELETE ");
            column.push_str(action.as_sql());
        }
    }

    column
}

/// `ALTER TABLE "custom_<name>" ADD COLUMN <definition>` for a scalar field.
pub fn add_column_ddl(table: &str, field: &FieldSpec) -> DdlStatement {
    let physical = physical_table_name(table);
    let sql = format!(
        "ALTER TABLE {} ADD COLUMN {}",
        quote_ident(&physical),
        column_definition(field)
    );
    DdlStatement::new(StatementKind::AddColumn, physical, sql)
}
