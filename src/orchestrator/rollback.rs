//! Compensating cleanup for failed creations
//!
//! Only objects the failing call itself created are dropped. A concurrent
//! caller that lost the race fails at its own CREATE TABLE, so it never
//! records (and never drops) the winner's tables.

use crate::database::DdlSession;
use crate::ddl::{drop_statement, DdlStatement, StatementKind};
use crate::observability::{Event, Logger};

use super::errors::CreationOutcome;

/// Top-level objects created so far by one call, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedObjects {
    objects: Vec<(StatementKind, String)>,
}

impl CreatedObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `statement` if it created a droppable object.
    pub fn record(&mut self, statement: &DdlStatement) {
        if statement.kind.creates_object() {
            self.objects.push((statement.kind, statement.object.clone()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.objects.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Tables newest first (history before main), then functions.
    fn drops(&self) -> Vec<DdlStatement> {
        let tables = self
            .objects
            .iter()
            .rev()
            .filter(|(kind, _)| *kind == StatementKind::CreateTable);
        let functions = self
            .objects
            .iter()
            .rev()
            .filter(|(kind, _)| *kind != StatementKind::CreateTable);
        tables
            .chain(functions)
            .filter_map(|(kind, name)| drop_statement(*kind, name))
            .collect()
    }
}

/// What cleanup achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackReport {
    pub outcome: CreationOutcome,
    pub dropped: Vec<String>,
    /// Objects still present because their drop failed
    pub orphaned: Vec<String>,
}

impl RollbackReport {
    /// Failure before any object existed
    pub fn nothing_created() -> Self {
        Self {
            outcome: CreationOutcome::RolledBackClean,
            dropped: Vec::new(),
            orphaned: Vec::new(),
        }
    }
}

/// Drops every object in `created`, swallowing drop errors.
pub async fn roll_back(
    session: &mut dyn DdlSession,
    table: &str,
    created: &CreatedObjects,
) -> RollbackReport {
    let mut dropped = Vec::new();
    let mut orphaned = Vec::new();

    for statement in created.drops() {
        match session.execute(&statement).await {
            Ok(()) => dropped.push(statement.object),
            Err(e) => {
                Logger::warn(
                    "ROLLBACK_DROP_FAILED",
                    &[
                        ("table", table),
                        ("object", &statement.object),
                        ("error", &e.to_string()),
                    ],
                );
                orphaned.push(statement.object);
            }
        }
    }

    let outcome = if orphaned.is_empty() {
        CreationOutcome::RolledBackClean
    } else if dropped.is_empty() {
        CreationOutcome::CreatedWithOrphan
    } else {
        CreationOutcome::RolledBackPartial
    };

    let dropped_count = dropped.len().to_string();
    if orphaned.is_empty() {
        Logger::event(
            Event::RollbackComplete,
            &[("table", table), ("dropped", &dropped_count)],
        );
    } else {
        Logger::event(
            Event::RollbackPartial,
            &[
                ("table", table),
                ("dropped", &dropped_count),
                ("orphaned", &orphaned.join(",")),
                ("outcome", outcome.as_str()),
            ],
        );
    }

    RollbackReport {
        outcome,
        dropped,
        orphaned,
    }
}
