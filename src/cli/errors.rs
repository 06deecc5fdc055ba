//! CLI-specific error types
//!
//! All CLI errors are fatal: the process prints the error and exits non-zero.

use std::fmt;
use std::io;

use crate::database::DatabaseError;
use crate::metadata::MetadataError;
use crate::orchestrator::TableError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Database unreachable
    ConnectionFailed,
    /// Definition file failed validation
    InvalidDefinition,
    /// A table operation failed
    OperationFailed,
    /// Server failed to start or stopped
    BootFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TABLEFORGE_CLI_CONFIG_ERROR",
            Self::IoError => "TABLEFORGE_CLI_IO_ERROR",
            Self::ConnectionFailed => "TABLEFORGE_CLI_CONNECTION_FAILED",
            Self::InvalidDefinition => "TABLEFORGE_CLI_INVALID_DEFINITION",
            Self::OperationFailed => "TABLEFORGE_CLI_OPERATION_FAILED",
            Self::BootFailed => "TABLEFORGE_CLI_BOOT_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConnectionFailed, msg)
    }

    /// One message listing every violation
    pub fn invalid_definition(violations: &[String]) -> Self {
        Self::new(CliErrorCode::InvalidDefinition, violations.join("; "))
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<TableError> for CliError {
    fn from(e: TableError) -> Self {
        match e {
            TableError::InvalidDefinition(violations) => Self::invalid_definition(&violations),
            other => Self::new(
                CliErrorCode::OperationFailed,
                format!("{}: {}", other.code(), other),
            ),
        }
    }
}

impl From<DatabaseError> for CliError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::Connection(msg) => Self::connection_failed(msg),
            other => Self::new(CliErrorCode::OperationFailed, other.to_string()),
        }
    }
}

impl From<MetadataError> for CliError {
    fn from(e: MetadataError) -> Self {
        Self::new(CliErrorCode::OperationFailed, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_error_mapping() {
        let err = CliError::from(TableError::InvalidDefinition(vec!["a".into(), "b".into()]));
        assert_eq!(err.code(), &CliErrorCode::InvalidDefinition);
        assert_eq!(err.message(), "a; b");

        let err = CliError::from(TableError::TableAlreadyExists("widgets".into()));
        assert_eq!(err.code(), &CliErrorCode::OperationFailed);
        assert!(err.message().starts_with("TABLE_ALREADY_EXISTS"));
    }

    #[test]
    fn test_display() {
        let err = CliError::config_error("missing database_url");
        assert_eq!(
            err.to_string(),
            "TABLEFORGE_CLI_CONFIG_ERROR: missing database_url"
        );
    }
}
