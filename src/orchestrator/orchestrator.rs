//! Schema orchestrator
//!
//! Drives validation, DDL execution and metadata persistence for custom
//! tables. Collaborators are injected, so the same code runs against
//! PostgreSQL or the in-memory backends.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::database::{DdlExecutor, DdlSession};
use crate::ddl::naming::{logical_name, HISTORY_SUFFIX, TABLE_PREFIX};
use crate::ddl::{add_field_statements, deletion_statements, CreationPlan, DdlStatement};
use crate::metadata::{
    CustomField, CustomTable, CustomTableWithFields, MetadataStore, OrphanedTable, PhysicalRole,
};
use crate::observability::{Event, Logger, Timer};
use crate::schema::{self, FieldDefinition, TableDefinition, ValidationReport};

use super::errors::{CreationOutcome, TableError, TableResult};
use super::rollback::{roll_back, CreatedObjects, RollbackReport};

/// Creates, extends and deletes custom tables.
#[derive(Clone)]
pub struct SchemaOrchestrator {
    executor: Arc<dyn DdlExecutor>,
    metadata: Arc<dyn MetadataStore>,
}

impl SchemaOrchestrator {
    pub fn new(executor: Arc<dyn DdlExecutor>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { executor, metadata }
    }

    pub fn metadata(&self) -> &Arc<dyn MetadataStore> {
        &self.metadata
    }

    /// Validates without side effects.
    pub fn validate(&self, definition: &TableDefinition) -> ValidationReport {
        schema::validate(definition)
    }

    /// Validates and returns the statements `create_table` would run.
    pub fn plan(&self, definition: &TableDefinition) -> TableResult<CreationPlan> {
        let spec = schema::check(definition).map_err(TableError::InvalidDefinition)?;
        Ok(CreationPlan::build(&spec))
    }

    /// Materializes `definition` as a main table, history table, trigger and
    /// indexes, then records it in the metadata store.
    ///
    /// On any failure after the first statement, every object this call
    /// created is dropped before the error is returned.
    pub async fn create_table(
        &self,
        definition: &TableDefinition,
        creator: &str,
    ) -> TableResult<CustomTableWithFields> {
        let timer = Timer::new();
        let table = definition.name.as_str();

        let spec = match schema::check(definition) {
            Ok(spec) => spec,
            Err(errors) => {
                Logger::event(
                    Event::TableCreateRejected,
                    &[
                        ("table", table),
                        ("reason", "invalid definition"),
                        ("violations", &errors.len().to_string()),
                    ],
                );
                return Err(TableError::InvalidDefinition(errors));
            }
        };

        if self.metadata.find_by_name(&spec.name).await?.is_some() {
            Logger::event(
                Event::TableCreateRejected,
                &[("table", table), ("reason", "already exists")],
            );
            return Err(TableError::TableAlreadyExists(spec.name));
        }

        let plan = CreationPlan::build(&spec);
        Logger::event(
            Event::TableCreateBegin,
            &[
                ("table", table),
                ("creator", creator),
                ("statements", &plan.len().to_string()),
            ],
        );

        let mut session = match self.executor.session().await {
            Ok(session) => session,
            Err(e) => return Err(self.creation_failed(table, e.to_string(), None).await),
        };

        let mut created = CreatedObjects::new();
        for statement in &plan.statements {
            if let Err(e) = run(session.as_mut(), table, statement).await {
                return Err(self
                    .creation_failed(table, e.to_string(), Some((session.as_mut(), &created)))
                    .await);
            }
            created.record(statement);
        }

        let record = CustomTable::new(&spec, creator);
        let fields = spec
            .fields
            .iter()
            .map(|f| CustomField::from_spec(record.id, f))
            .collect();

        match self.metadata.insert_table(record, fields).await {
            Ok(record) => {
                Logger::event(
                    Event::TableCreated,
                    &[
                        ("table", table),
                        ("id", &record.table.id.to_string()),
                        ("fields", &record.fields.len().to_string()),
                        ("outcome", CreationOutcome::CreatedClean.as_str()),
                        ("duration_ms", &timer.elapsed_ms()),
                    ],
                );
                Ok(record)
            }
            Err(e) => Err(self
                .creation_failed(table, e.to_string(), Some((session.as_mut(), &created)))
                .await),
        }
    }

    /// Adds one field to an existing table.
    ///
    /// The column is added to both the main and history tables and the
    /// capture function is replaced. A metadata failure after the ALTERs is
    /// returned as-is; the columns are not removed.
    pub async fn add_field_to_table(
        &self,
        table_id: Uuid,
        field: &FieldDefinition,
    ) -> TableResult<CustomField> {
        let record = self
            .metadata
            .find_by_id(table_id)
            .await?
            .ok_or_else(|| TableError::TableNotFound(table_id.to_string()))?;
        let table = record.table.name.as_str();

        if record.field(&field.name).is_some() {
            return Err(TableError::FieldAlreadyExists {
                table: record.table.name.clone(),
                field: field.name.clone(),
            });
        }

        let order = record.max_order().map_or(0, |max| i64::from(max) + 1);
        let spec = schema::check_field(field, record.fields.len(), order)
            .map_err(TableError::InvalidDefinition)?;

        let mut columns: Vec<&str> = record.fields.iter().map(|f| f.name.as_str()).collect();
        columns.push(&spec.name);

        let mut session = self.executor.session().await?;
        for statement in add_field_statements(table, &spec, &columns) {
            run(session.as_mut(), table, &statement).await?;
        }

        let added = self
            .metadata
            .insert_field(CustomField::from_spec(record.table.id, &spec))
            .await?;

        Logger::event(
            Event::FieldAdded,
            &[
                ("table", table),
                ("field", &added.name),
                ("order", &added.order.to_string()),
            ],
        );
        Ok(added)
    }

    /// Drops the main table, history table and capture function, then the
    /// metadata row.
    pub async fn delete_table(&self, table_id: Uuid) -> TableResult<()> {
        let timer = Timer::new();
        let record = self
            .metadata
            .find_by_id(table_id)
            .await?
            .ok_or_else(|| TableError::TableNotFound(table_id.to_string()))?;
        let table = record.table.name.as_str();

        let mut session = self.executor.session().await?;
        for statement in deletion_statements(table) {
            run(session.as_mut(), table, &statement).await?;
        }

        if !self.metadata.delete(table_id).await? {
            return Err(TableError::TableNotFound(table_id.to_string()));
        }

        Logger::event(
            Event::TableDeleted,
            &[
                ("table", table),
                ("id", &table_id.to_string()),
                ("duration_ms", &timer.elapsed_ms()),
            ],
        );
        Ok(())
    }

    /// Non-deleted tables, newest first.
    pub async fn get_tables(&self) -> TableResult<Vec<CustomTableWithFields>> {
        Ok(self.metadata.list().await?)
    }

    pub async fn get_table_by_id(&self, id: Uuid) -> TableResult<Option<CustomTableWithFields>> {
        Ok(self.metadata.find_by_id(id).await?)
    }

    pub async fn get_table_by_name(
        &self,
        name: &str,
    ) -> TableResult<Option<CustomTableWithFields>> {
        Ok(self.metadata.find_by_name(name).await?)
    }

    /// Physical `custom_*` tables with no metadata row.
    ///
    /// Report only; cleanup is left to the operator.
    pub async fn find_orphans(&self) -> TableResult<Vec<OrphanedTable>> {
        let known: HashSet<String> = self.metadata.table_names().await?.into_iter().collect();
        let physical = self.executor.list_physical_tables().await?;

        let orphans: Vec<OrphanedTable> = physical
            .into_iter()
            .filter_map(|name| classify_orphan(name, &known))
            .collect();

        if !orphans.is_empty() {
            let names: Vec<&str> = orphans.iter().map(|o| o.physical_name.as_str()).collect();
            Logger::event(
                Event::OrphansDetected,
                &[
                    ("count", &orphans.len().to_string()),
                    ("tables", &names.join(",")),
                ],
            );
        }
        Ok(orphans)
    }

    async fn creation_failed(
        &self,
        table: &str,
        message: String,
        cleanup: Option<(&mut dyn DdlSession, &CreatedObjects)>,
    ) -> TableError {
        let report = match cleanup {
            Some((session, created)) => roll_back(session, table, created).await,
            None => RollbackReport::nothing_created(),
        };

        Logger::event(
            Event::TableCreateFailed,
            &[
                ("table", table),
                ("error", &message),
                ("outcome", report.outcome.as_str()),
            ],
        );

        TableError::CreationFailed {
            message,
            outcome: report.outcome,
            orphaned: report.orphaned,
        }
    }
}

async fn run(
    session: &mut dyn DdlSession,
    table: &str,
    statement: &DdlStatement,
) -> TableResult<()> {
    session.execute(statement).await?;
    Logger::event(
        Event::DdlExecuted,
        &[
            ("table", table),
            ("kind", statement.kind.as_str()),
            ("object", &statement.object),
        ],
    );
    Ok(())
}

/// `None` if `physical` belongs to a recorded table.
fn classify_orphan(physical: String, known: &HashSet<String>) -> Option<OrphanedTable> {
    let unprefixed = physical.strip_prefix(TABLE_PREFIX)?;
    if known.contains(unprefixed) {
        return None;
    }

    if let Some(owner) = unprefixed.strip_suffix(HISTORY_SUFFIX) {
        if known.contains(owner) {
            return None;
        }
        return Some(OrphanedTable {
            logical_name: owner.to_string(),
            physical_name: physical,
            role: PhysicalRole::History,
        });
    }

    Some(OrphanedTable {
        logical_name: logical_name(&physical)?.to_string(),
        physical_name: physical,
        role: PhysicalRole::Main,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_classify_orphan() {
        let known = known(&["widgets", "foo_history"]);

        assert!(classify_orphan("custom_widgets".into(), &known).is_none());
        assert!(classify_orphan("custom_widgets_history".into(), &known).is_none());
        assert!(classify_orphan("custom_foo_history".into(), &known).is_none());
        assert!(classify_orphan("meta_custom_tables".into(), &known).is_none());

        let orphan = classify_orphan("custom_gadgets_history".into(), &known).unwrap();
        assert_eq!(orphan.logical_name, "gadgets");
        assert_eq!(orphan.role, PhysicalRole::History);

        let orphan = classify_orphan("custom_gadgets".into(), &known).unwrap();
        assert_eq!(orphan.role, PhysicalRole::Main);
    }
}
