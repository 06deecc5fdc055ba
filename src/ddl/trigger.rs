//! History capture trigger synthesis
//!
//! One plpgsql function per table copies the affected row into the history
//! table; one AFTER ROW trigger binds INSERT, UPDATE and DELETE to it. Both
//! sides of the copy use the same column order:
//! `id, <fields in definition order>, created_at, updated_at, deleted_at`.

use crate::schema::FieldSpec;

use super::main_table::AUDIT_COLUMN_NAMES;
use super::naming::{
    history_table_name, physical_table_name, quote_ident, trigger_function_name, trigger_name,
};
use super::statement::{DdlStatement, StatementKind};

/// The function and the trigger binding it, in execution order.
pub fn history_trigger_ddl(table: &str, fields: &[FieldSpec]) -> [DdlStatement; 2] {
    let columns: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    [history_function_ddl(table, &columns), bind_trigger_ddl(table)]
}

/// `CREATE OR REPLACE FUNCTION "custom_<name>_history_trigger"()`
///
/// `columns` are the declared field names in definition order. Re-emitting
/// this after a column is added keeps history snapshots complete; the
/// existing trigger picks up the replaced body.
pub fn history_function_ddl<S: AsRef<str>>(table: &str, columns: &[S]) -> DdlStatement {
    let function = trigger_function_name(table);
    let history = quote_ident(&history_table_name(table));

    let mut targets = vec![
        quote_ident("record_id"),
        quote_ident("operation"),
        quote_ident("changed_by"),
    ];
    let mut copied = vec![quote_ident("id")];
    for name in columns
        .iter()
        .map(|c| c.as_ref())
        .chain(AUDIT_COLUMN_NAMES.iter().copied())
    {
        targets.push(quote_ident(name));
        copied.push(quote_ident(name));
    }
    let target_list = targets.join(", ");

    let values = |row: &str, operation: &str| {
        let mut values = Vec::with_capacity(copied.len() + 2);
        values.push(format!("{}.{}", row, copied[0]));
        values.push(operation.to_string());
        values.push("current_user".to_string());
        values.extend(copied[1..].iter().map(|c| format!("{}.{}", row, c)));
        values.join(", ")
    };

    let sql = format!(
        "CREATE OR REPLACE FUNCTION {function}() RETURNS TRIGGER AS $$\n\
         BEGIN\n\
         \x20 IF TG_OP = 'DELETE' THEN\n\
         \x20   INSERT INTO {history} ({targets}) VALUES ({old});\n\
         \x20   RETURN OLD;\n\
         \x20 END IF;\n\
         \x20 INSERT INTO {history} ({targets}) VALUES ({new});\n\
         \x20 RETURN NEW;\n\
         END;\n\
         $$ LANGUAGE plpgsql",
        function = quote_ident(&function),
        history = history,
        targets = target_list,
        old = values("OLD", "'DELETE'"),
        new = values("NEW", "TG_OP"),
    );

    DdlStatement::new(StatementKind::CreateFunction, function, sql)
}

/// `CREATE TRIGGER ... AFTER INSERT OR UPDATE OR DELETE ... FOR EACH ROW`
pub fn bind_trigger_ddl(table: &str) -> DdlStatement {
    let physical = physical_table_name(table);
    let sql = format!(
        "CREATE TRIGGER {} AFTER INSERT OR UPDATE OR DELETE ON {} \
         FOR EACH ROW EXECUTE FUNCTION {}()",
        quote_ident(&trigger_name(table)),
        quote_ident(&physical),
        quote_ident(&trigger_function_name(table))
    );
    DdlStatement::new(StatementKind::CreateTrigger, physical, sql)
}
