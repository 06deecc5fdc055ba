//! Geometry extension
//!
//! Geometry fields cannot appear in a CREATE TABLE column list with their
//! SRID and subtype, so they are added afterwards with PostGIS typmods:
//!
//! ```text
//! ALTER TABLE "custom_sites" ADD COLUMN "location" geometry(POINT, 4326)
//! CREATE INDEX IF NOT EXISTS "idx_custom_sites_location_c43be2fd_gist" ON "custom_sites" USING GIST ("location")
//! ```
//!
//! Both functions are called once with the main table name and once with the
//! history table name, so live and historical storage carry identical columns.

use crate::ddl::naming::{quote_ident, spatial_index_name};
use crate::ddl::{DdlStatement, StatementKind};
use crate::schema::FieldSpec;

/// Which side of the main/history pair a statement targets.
///
/// NOT NULL is only applied on the main table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    Main,
    History,
}

/// One `ADD COLUMN ... geometry(SUBTYPE, srid)` per geometry field.
pub fn geometry_column_statements(
    physical: &str,
    role: TableRole,
    fields: &[FieldSpec],
) -> Vec<DdlStatement> {
    fields
        .iter()
        .filter_map(|field| geometry_column_statement(physical, role, field))
        .collect()
}

/// The column statement for a single field, `None` for non-geometry fields.
pub fn geometry_column_statement(
    physical: &str,
    role: TableRole,
    field: &FieldSpec,
) -> Option<DdlStatement> {
    let geometry = field.geometry?;

    let mut sql = format!(
        "ALTER TABLE {} ADD COLUMN {} geometry({}, {})",
        quote_ident(physical),
        quote_ident(&field.name),
        geometry.subtype.as_str(),
        geometry.srid
    );
    if role == TableRole::Main && field.is_required {
        sql.push_str(" NOT NULL");
    }

    Some(DdlStatement::new(StatementKind::AddColumn, physical, sql))
}

/// One GIST index per geometry field.
pub fn spatial_index_statements(physical: &str, fields: &[FieldSpec]) -> Vec<DdlStatement> {
    fields
        .iter()
        .filter(|f| f.is_geometry())
        .map(|field| {
            let sql = format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} USING GIST ({})",
                quote_ident(&spatial_index_name(physical, &field.name)),
                quote_ident(physical),
                quote_ident(&field.name)
            );
            DdlStatement::new(StatementKind::CreateIndex, physical, sql)
        })
        .collect()
}
