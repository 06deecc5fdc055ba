//! Ordered statement plans

use serde::Serialize;

use crate::geometry::{geometry_column_statements, spatial_index_statements, TableRole};
use crate::schema::{FieldSpec, TableSpec};

use super::history::{add_history_column_ddl, history_table_ddl};
use super::index::timeseries_index_ddl;
use super::main_table::{add_column_ddl, main_table_ddl};
use super::naming::{
    history_table_name, physical_table_name, quote_ident, trigger_function_name,
};
use super::statement::{DdlStatement, StatementKind};
use super::trigger::{history_function_ddl, history_trigger_ddl};

/// Every statement needed to materialize one table, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreationPlan {
    pub table: String,
    pub main_table: String,
    pub history_table: String,
    pub statements: Vec<DdlStatement>,
}

impl CreationPlan {
    /// Builds the plan for a validated table.
    ///
    /// Order: main table, main geometry columns, history table, history
    /// geometry columns, trigger function and trigger, timeseries indexes,
    /// spatial indexes on main then history.
    pub fn build(table: &TableSpec) -> Self {
        let main = physical_table_name(&table.name);
        let history = history_table_name(&table.name);

        let mut statements = Vec::new();
        statements.push(main_table_ddl(table));
        statements.extend(geometry_column_statements(&main, TableRole::Main, &table.fields));
        statements.push(history_table_ddl(table));
        statements.extend(geometry_column_statements(
            &history,
            TableRole::History,
            &table.fields,
        ));
        statements.extend(history_trigger_ddl(&table.name, &table.fields));
        statements.extend(timeseries_index_ddl(&table.name, &table.fields));
        statements.extend(spatial_index_statements(&main, &table.fields));
        statements.extend(spatial_index_statements(&history, &table.fields));

        Self {
            table: table.name.clone(),
            main_table: main,
            history_table: history,
            statements,
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// SQL text only, joined as a script.
    pub fn to_sql(&self) -> String {
        let mut script = String::new();
        for statement in &self.statements {
            script.push_str(&statement.sql);
            script.push_str(";\n");
        }
        script
    }
}

/// Statements that add one field to an existing table.
///
/// `columns` names every field after the addition, in definition order; the
/// trigger function is replaced so history snapshots include the new column.
pub fn add_field_statements<S: AsRef<str>>(
    table: &str,
    field: &FieldSpec,
    columns: &[S],
) -> Vec<DdlStatement> {
    let main = physical_table_name(table);
    let history = history_table_name(table);
    let added = std::slice::from_ref(field);

    let mut statements = Vec::new();
    if field.is_geometry() {
        statements.extend(geometry_column_statements(&main, TableRole::Main, added));
        statements.extend(geometry_column_statements(&history, TableRole::History, added));
    } else {
        statements.push(add_column_ddl(table, field));
        statements.push(add_history_column_ddl(table, field));
    }
    statements.push(history_function_ddl(table, columns));
    statements.extend(timeseries_index_ddl(table, added));
    statements.extend(spatial_index_statements(&main, added));
    statements.extend(spatial_index_statements(&history, added));
    statements
}

/// `DROP ... IF EXISTS ... CASCADE` for one object created by a plan.
///
/// Returns `None` for statement kinds that do not own a top-level object.
pub fn drop_statement(kind: StatementKind, object: &str) -> Option<DdlStatement> {
    match kind {
        StatementKind::CreateTable => Some(DdlStatement::new(
            StatementKind::DropTable,
            object,
            format!("DROP TABLE IF EXISTS {} CASCADE", quote_ident(object)),
        )),
        StatementKind::CreateFunction => Some(DdlStatement::new(
            StatementKind::DropFunction,
            object,
            format!("DROP FUNCTION IF EXISTS {}() CASCADE", quote_ident(object)),
        )),
        _ => None,
    }
}

/// Statements that remove a table pair and its trigger function.
pub fn deletion_statements(table: &str) -> Vec<DdlStatement> {
    [
        (StatementKind::CreateTable, history_table_name(table)),
        (StatementKind::CreateTable, physical_table_name(table)),
        (StatementKind::CreateFunction, trigger_function_name(table)),
    ]
    .iter()
    .filter_map(|(kind, object)| drop_statement(*kind, object))
    .collect()
}
