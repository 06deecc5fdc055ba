//! # Database Errors

use thiserror::Error;

/// Result type for physical DDL execution
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors raised while talking to the database engine
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Statement failed: {message}")]
    Statement { message: String, sql: String },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DatabaseError {
    pub fn statement(message: impl Into<String>, sql: impl Into<String>) -> Self {
        DatabaseError::Statement {
            message: message.into(),
            sql: sql.into(),
        }
    }

    /// HTTP status for surfaces that expose the error directly
    pub fn status_code(&self) -> u16 {
        match self {
            DatabaseError::Connection(_) => 503,
            _ => 500,
        }
    }

    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            DatabaseError::Connection(_) => "DATABASE_CONNECTION",
            DatabaseError::Statement { .. } => "DATABASE_STATEMENT",
            DatabaseError::Query(_) => "DATABASE_QUERY",
            DatabaseError::Internal(_) => "DATABASE_INTERNAL",
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::Connection(err.to_string())
            }
            sqlx::Error::Tls(_) | sqlx::Error::Configuration(_) => {
                DatabaseError::Connection(err.to_string())
            }
            other => DatabaseError::Query(other.to_string()),
        }
    }
}
