//! Typed DDL statements

use std::fmt;

use serde::Serialize;

/// The kind of schema object a statement touches.
///
/// Rollback uses the kind (and the object name) to drop only what the
/// current call created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementKind {
    CreateTable,
    AddColumn,
    CreateFunction,
    CreateTrigger,
    CreateIndex,
    DropTable,
    DropFunction,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::CreateTable => "CREATE_TABLE",
            StatementKind::AddColumn => "ADD_COLUMN",
            StatementKind::CreateFunction => "CREATE_FUNCTION",
            StatementKind::CreateTrigger => "CREATE_TRIGGER",
            StatementKind::CreateIndex => "CREATE_INDEX",
            StatementKind::DropTable => "DROP_TABLE",
            StatementKind::DropFunction => "DROP_FUNCTION",
        }
    }

    /// Whether executing this statement brings a new top-level object into
    /// existence (one that rollback must drop).
    pub fn creates_object(&self) -> bool {
        matches!(self, StatementKind::CreateTable | StatementKind::CreateFunction)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One synthesized DDL statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DdlStatement {
    pub kind: StatementKind,
    /// Unquoted physical name of the object the statement targets.
    ///
    /// For `AddColumn`, `CreateTrigger` and `CreateIndex` this is the owning table.
    pub object: String,
    pub sql: String,
}

impl DdlStatement {
    pub fn new(kind: StatementKind, object: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            kind,
            object: object.into(),
            sql: sql.into(),
        }
    }
}

impl fmt::Display for DdlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}
