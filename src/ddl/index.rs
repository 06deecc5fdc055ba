//! Timeseries index synthesis

use crate::schema::FieldSpec;

use super::naming::{physical_table_name, quote_ident, timeseries_index_name};
use super::statement::{DdlStatement, StatementKind};

/// One descending, idempotent index per `isTimeseries` field.
pub fn timeseries_index_ddl(table: &str, fields: &[FieldSpec]) -> Vec<DdlStatement> {
    let physical = physical_table_name(table);
    fields
        .iter()
        .filter(|f| f.is_timeseries)
        .map(|field| {
            let sql = format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({} DESC)",
                quote_ident(&timeseries_index_name(table, &field.name)),
                quote_ident(&physical),
                quote_ident(&field.name)
            );
            DdlStatement::new(StatementKind::CreateIndex, physical.clone(), sql)
        })
        .collect()
}
