//! History table synthesis
//!
//! The history table mirrors every declared column by type only. Constraints,
//! defaults and foreign keys are left off since a snapshot of a deleted row
//! may be partial or reference rows that no longer exist.

use crate::schema::{FieldSpec, TableSpec};

use super::main_table::AUDIT_COLUMNS;
use super::naming::{history_table_name, quote_ident};
use super::statement::{DdlStatement, StatementKind};

/// Audit-trail columns leading every history table
pub const HISTORY_COLUMNS: [&str; 5] = [
    "\"history_id\" UUID PRIMARY KEY DEFAULT gen_random_uuid()",
    "\"record_id\" UUID NOT NULL",
    "\"operation\" VARCHAR(10) NOT NULL",
    "\"changed_by\" TEXT",
    "\"changed_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()",
];

/// `CREATE TABLE "custom_<name>_history"`
pub fn history_table_ddl(table: &TableSpec) -> DdlStatement {
    let physical = history_table_name(&table.name);

    let mut columns: Vec<String> = HISTORY_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(table.column_fields().map(history_column));
    columns.extend(AUDIT_COLUMNS.iter().map(|c| c.to_string()));

    let sql = format!(
        "CREATE TABLE {} (\n  {}\n)",
        quote_ident(&physical),
        columns.join(",\n  ")
    );

    DdlStatement::new(StatementKind::CreateTable, physical, sql)
}

/// Unconstrained `name type`
pub fn history_column(field: &FieldSpec) -> String {
    format!("{} {}", quote_ident(&field.name), field.column_type())
}

/// `ALTER TABLE "custom_<name>_history" ADD COLUMN name type`
pub fn add_history_column_ddl(table: &str, field: &FieldSpec) -> DdlStatement {
    let physical = history_table_name(table);
    let sql = format!(
        "ALTER TABLE {} ADD COLUMN {}",
        quote_ident(&physical),
        history_column(field)
    );
    DdlStatement::new(StatementKind::AddColumn, physical, sql)
}
