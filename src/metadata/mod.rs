//! Metadata store
//!
//! The durable catalog of logical tables and fields that downstream CRUD and
//! query services read. Two backends share the `MetadataStore` trait:
//! PostgreSQL (`meta_custom_tables`, `meta_custom_fields`) and in-memory.

mod errors;
mod memory;
mod postgres;
mod store;
mod types;

pub use errors::{MetadataError, MetadataResult};
pub use memory::MemoryMetadataStore;
pub use postgres::PgMetadataStore;
pub use store::MetadataStore;
pub use types::{CustomField, CustomTable, CustomTableWithFields, OrphanedTable, PhysicalRole};
