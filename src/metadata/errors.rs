//! # Metadata Errors

use thiserror::Error;

/// Result type for metadata store operations
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Metadata store errors
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    /// Unique constraint on table name (or field name within a table)
    #[error("Duplicate metadata entry: {0}")]
    Duplicate(String),

    #[error("Metadata not found: {0}")]
    NotFound(String),

    #[error("Metadata storage error: {0}")]
    Storage(String),

    /// A stored row no longer decodes into its Rust type
    #[error("Corrupt metadata row: {0}")]
    Corrupt(String),
}

impl MetadataError {
    pub fn status_code(&self) -> u16 {
        match self {
            MetadataError::Duplicate(_) => 409,
            MetadataError::NotFound(_) => 404,
            MetadataError::Storage(_) | MetadataError::Corrupt(_) => 500,
        }
    }

    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            MetadataError::Duplicate(_) => "METADATA_DUPLICATE",
            MetadataError::NotFound(_) => "METADATA_NOT_FOUND",
            MetadataError::Storage(_) => "METADATA_STORAGE",
            MetadataError::Corrupt(_) => "METADATA_CORRUPT",
        }
    }
}

impl From<sqlx::Error> for MetadataError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                MetadataError::Duplicate(db.message().to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                MetadataError::Corrupt(err.to_string())
            }
            _ => MetadataError::Storage(err.to_string()),
        }
    }
}
