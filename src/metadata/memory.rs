//! In-memory metadata store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::errors::{MetadataError, MetadataResult};
use super::store::MetadataStore;
use super::types::{CustomField, CustomTable, CustomTableWithFields};

#[derive(Debug, Default)]
struct Catalog {
    tables: HashMap<Uuid, CustomTable>,
    fields: HashMap<Uuid, Vec<CustomField>>,
    by_name: HashMap<String, Uuid>,
}

impl Catalog {
    fn record(&self, id: Uuid) -> Option<CustomTableWithFields> {
        let table = self.tables.get(&id)?.clone();
        let fields = self.fields.get(&id).cloned().unwrap_or_default();
        Some(CustomTableWithFields::new(table, fields))
    }
}

/// Metadata kept in process memory
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    catalog: RwLock<Catalog>,
    fail_inserts: RwLock<bool>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `insert_table` and `insert_field` fail until cleared.
    pub fn set_fail_inserts(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_inserts.write() {
            *flag = fail;
        }
    }

    pub fn len(&self) -> usize {
        self.catalog.read().map(|c| c.tables.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_injected_failure(&self) -> MetadataResult<()> {
        let fail = self
            .fail_inserts
            .read()
            .map_err(|_| MetadataError::Storage("Lock poisoned".into()))?;
        if *fail {
            return Err(MetadataError::Storage("injected insert failure".into()));
        }
        Ok(())
    }

    fn read(&self) -> MetadataResult<std::sync::RwLockReadGuard<'_, Catalog>> {
        self.catalog
            .read()
            .map_err(|_| MetadataError::Storage("Lock poisoned".into()))
    }

    fn write(&self) -> MetadataResult<std::sync::RwLockWriteGuard<'_, Catalog>> {
        self.catalog
            .write()
            .map_err(|_| MetadataError::Storage("Lock poisoned".into()))
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn ensure_schema(&self) -> MetadataResult<()> {
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> MetadataResult<Option<CustomTableWithFields>> {
        let catalog = self.read()?;
        Ok(catalog
            .by_name
            .get(name)
            .and_then(|id| catalog.record(*id))
            .filter(|r| r.table.deleted_at.is_none()))
    }

    async fn find_by_id(&self, id: Uuid) -> MetadataResult<Option<CustomTableWithFields>> {
        Ok(self
            .read()?
            .record(id)
            .filter(|r| r.table.deleted_at.is_none()))
    }

    async fn list(&self) -> MetadataResult<Vec<CustomTableWithFields>> {
        let catalog = self.read()?;
        let mut records: Vec<_> = catalog
            .tables
            .keys()
            .filter_map(|id| catalog.record(*id))
            .filter(|r| r.table.deleted_at.is_none())
            .collect();
        records.sort_by(|a, b| {
            b.table
                .created_at
                .cmp(&a.table.created_at)
                .then_with(|| a.table.name.cmp(&b.table.name))
        });
        Ok(records)
    }

    async fn insert_table(
        &self,
        table: CustomTable,
        fields: Vec<CustomField>,
    ) -> MetadataResult<CustomTableWithFields> {
        self.check_injected_failure()?;

        let mut catalog = self.write()?;
        if catalog.by_name.contains_key(&table.name) {
            return Err(MetadataError::Duplicate(table.name));
        }

        let id = table.id;
        catalog.by_name.insert(table.name.clone(), id);
        catalog.tables.insert(id, table.clone());
        catalog.fields.insert(id, fields.clone());
        Ok(CustomTableWithFields::new(table, fields))
    }

    async fn insert_field(&self, field: CustomField) -> MetadataResult<CustomField> {
        self.check_injected_failure()?;

        let mut catalog = self.write()?;
        if !catalog.tables.contains_key(&field.table_id) {
            return Err(MetadataError::NotFound(field.table_id.to_string()));
        }
        let fields = catalog.fields.entry(field.table_id).or_default();
        if fields.iter().any(|f| f.name == field.name) {
            return Err(MetadataError::Duplicate(field.name));
        }
        fields.push(field.clone());
        Ok(field)
    }

    async fn delete(&self, id: Uuid) -> MetadataResult<bool> {
        let mut catalog = self.write()?;
        let Some(table) = catalog.tables.remove(&id) else {
            return Ok(false);
        };
        catalog.by_name.remove(&table.name);
        catalog.fields.remove(&id);
        Ok(true)
    }

    async fn table_names(&self) -> MetadataResult<Vec<String>> {
        let mut names: Vec<_> = self.read()?.by_name.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
