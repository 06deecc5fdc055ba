//! # Table Errors

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::database::DatabaseError;
use crate::metadata::MetadataError;

/// Result type for orchestrator operations
pub type TableResult<T> = Result<T, TableError>;

/// What is left behind after a call that reached physical DDL.
///
/// Successful creations are logged as `CreatedClean`; the other outcomes
/// travel on `TableError::CreationFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreationOutcome {
    /// Everything was created and recorded
    CreatedClean,
    /// Objects were created, the call failed, and none of them could be dropped
    CreatedWithOrphan,
    /// The call failed and every object it created was dropped
    RolledBackClean,
    /// The call failed and some, not all, of its objects remain
    RolledBackPartial,
}

impl CreationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreationOutcome::CreatedClean => "CREATED_CLEAN",
            CreationOutcome::CreatedWithOrphan => "CREATED_WITH_ORPHAN",
            CreationOutcome::RolledBackClean => "ROLLED_BACK_CLEAN",
            CreationOutcome::RolledBackPartial => "ROLLED_BACK_PARTIAL",
        }
    }

    /// True if physical objects may exist without a metadata row
    pub fn may_have_orphans(&self) -> bool {
        matches!(
            self,
            CreationOutcome::CreatedWithOrphan | CreationOutcome::RolledBackPartial
        )
    }
}

impl fmt::Display for CreationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Orchestrator errors
#[derive(Debug, Clone, Error)]
pub enum TableError {
    #[error("Invalid table definition: {}", .0.join("; "))]
    InvalidDefinition(Vec<String>),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Field '{field}' already exists on table '{table}'")]
    FieldAlreadyExists { table: String, field: String },

    #[error("Table creation failed ({outcome}): {message}")]
    CreationFailed {
        message: String,
        outcome: CreationOutcome,
        /// Physical objects the failed call could not drop
        orphaned: Vec<String>,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Metadata error: {0}")]
    Metadata(String),
}

impl TableError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            TableError::InvalidDefinition(_) => 400,
            TableError::TableAlreadyExists(_) => 409,
            TableError::FieldAlreadyExists { .. } => 409,
            TableError::TableNotFound(_) => 404,
            TableError::CreationFailed { .. } => 500,
            TableError::Database(_) => 500,
            TableError::Metadata(_) => 500,
        }
    }

    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            TableError::InvalidDefinition(_) => "INVALID_DEFINITION",
            TableError::TableAlreadyExists(_) => "TABLE_ALREADY_EXISTS",
            TableError::TableNotFound(_) => "TABLE_NOT_FOUND",
            TableError::FieldAlreadyExists { .. } => "FIELD_ALREADY_EXISTS",
            TableError::CreationFailed { .. } => "CREATION_FAILED",
            TableError::Database(_) => "DATABASE_ERROR",
            TableError::Metadata(_) => "METADATA_ERROR",
        }
    }

    /// Violations for an invalid definition, empty otherwise
    pub fn violations(&self) -> &[String] {
        match self {
            TableError::InvalidDefinition(errors) => errors,
            _ => &[],
        }
    }

    /// Whether this is correctable caller input rather than an operational fault
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<DatabaseError> for TableError {
    fn from(err: DatabaseError) -> Self {
        TableError::Database(err.to_string())
    }
}

impl From<MetadataError> for TableError {
    fn from(err: MetadataError) -> Self {
        TableError::Metadata(err.to_string())
    }
}
