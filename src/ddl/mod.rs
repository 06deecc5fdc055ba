//! DDL synthesis
//!
//! Pure, deterministic SQL generation from a validated `TableSpec`. Nothing in
//! this module performs I/O; execution belongs to `database`.
//!
//! Physical objects per logical table `<name>`:
//! - `custom_<name>`: main table
//! - `custom_<name>_history`: append-only history table
//! - `custom_<name>_history_trigger`: capture function and its trigger
//! - `idx_custom_<name>_<field>_<crc>_ts`: timeseries indexes, capped at 63 bytes

mod history;
mod index;
mod main_table;
pub mod naming;
mod plan;
mod statement;
mod trigger;

pub use history::{add_history_column_ddl, history_table_ddl, HISTORY_COLUMNS};
pub use index::timeseries_index_ddl;
pub use main_table::{add_column_ddl, column_definition, main_table_ddl, AUDIT_COLUMN_NAMES};
pub use plan::{add_field_statements, deletion_statements, drop_statement, CreationPlan};
pub use statement::{DdlStatement, StatementKind};
pub use trigger::{bind_trigger_ddl, history_function_ddl, history_trigger_ddl};
