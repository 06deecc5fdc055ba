//! Metadata store seam

use async_trait::async_trait;
use uuid::Uuid;

use super::errors::MetadataResult;
use super::types::{CustomField, CustomTable, CustomTableWithFields};

/// The persisted catalog of logical tables.
///
/// The store is the single source of truth for whether a logical table
/// exists. Name uniqueness is enforced here, not by callers.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Creates the catalog tables if they are missing.
    async fn ensure_schema(&self) -> MetadataResult<()>;

    async fn find_by_name(&self, name: &str) -> MetadataResult<Option<CustomTableWithFields>>;

    async fn find_by_id(&self, id: Uuid) -> MetadataResult<Option<CustomTableWithFields>>;

    /// Non-deleted tables, newest first, fields ordered by `order`.
    async fn list(&self) -> MetadataResult<Vec<CustomTableWithFields>>;

    /// Inserts a table and its fields atomically.
    ///
    /// Fails with `MetadataError::Duplicate` if the name is taken.
    async fn insert_table(
        &self,
        table: CustomTable,
        fields: Vec<CustomField>,
    ) -> MetadataResult<CustomTableWithFields>;

    async fn insert_field(&self, field: CustomField) -> MetadataResult<CustomField>;

    /// Removes a table and its fields. Returns false if it did not exist.
    async fn delete(&self, id: Uuid) -> MetadataResult<bool>;

    /// Every recorded logical name, deleted or not.
    async fn table_names(&self) -> MetadataResult<Vec<String>>;
}
