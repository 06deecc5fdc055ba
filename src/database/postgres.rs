//! PostgreSQL executor

use std::time::Duration;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool, Postgres, Row};

use crate::ddl::naming::TABLE_PREFIX;
use crate::ddl::DdlStatement;

use super::errors::{DatabaseError, DatabaseResult};
use super::executor::{DdlExecutor, DdlSession};

/// Opens a pool against `url`.
pub async fn connect(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> DatabaseResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))
}

/// Executes DDL on a pooled PostgreSQL connection.
#[derive(Debug, Clone)]
pub struct PgDdlExecutor {
    pool: PgPool,
}

impl PgDdlExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DdlExecutor for PgDdlExecutor {
    async fn session(&self) -> DatabaseResult<Box<dyn DdlSession>> {
        let connection = self.pool.acquire().await?;
        Ok(Box::new(PgDdlSession { connection }))
    }

    async fn list_physical_tables(&self) -> DatabaseResult<Vec<String>> {
        let pattern = format!("{}%", TABLE_PREFIX.replace('_', "\\_"));
        let rows = sqlx::query(
            "SELECT tablename::text AS name FROM pg_catalog.pg_tables \
             WHERE schemaname = current_schema() AND tablename LIKE $1 \
             ORDER BY tablename",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(DatabaseError::from))
            .collect()
    }
}

struct PgDdlSession {
    connection: PoolConnection<Postgres>,
}

#[async_trait]
impl DdlSession for PgDdlSession {
    async fn execute(&mut self, statement: &DdlStatement) -> DatabaseResult<()> {
        // Simple-query protocol; DDL takes no bind parameters
        (&mut *self.connection)
            .execute(statement.sql.as_str())
            .await
            .map_err(|e| DatabaseError::statement(e.to_string(), statement.sql.clone()))?;
        Ok(())
    }
}
