//! DDL execution seam

use async_trait::async_trait;

use crate::ddl::DdlStatement;

use super::errors::DatabaseResult;

/// Runs synthesized DDL against a database engine.
///
/// Implementations must be shareable across request handlers.
#[async_trait]
pub trait DdlExecutor: Send + Sync {
    /// Opens a session pinned to one connection.
    ///
    /// All statements of one create/add/delete call go through one session so
    /// they execute strictly in order on the same connection.
    async fn session(&self) -> DatabaseResult<Box<dyn DdlSession>>;

    /// Physical table names carrying the `custom_` prefix, sorted.
    async fn list_physical_tables(&self) -> DatabaseResult<Vec<String>>;
}

/// A single-connection DDL session.
#[async_trait]
pub trait DdlSession: Send {
    async fn execute(&mut self, statement: &DdlStatement) -> DatabaseResult<()>;
}
