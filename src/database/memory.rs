//! In-memory database
//!
//! Tracks schema objects by statement kind so orchestration can run without
//! PostgreSQL. Column names are read from the synthesized SQL; nothing else is
//! parsed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ddl::naming::TABLE_PREFIX;
use crate::ddl::{DdlStatement, StatementKind};

use super::errors::{DatabaseError, DatabaseResult};
use super::executor::{DdlExecutor, DdlSession};

#[derive(Debug, Default)]
struct State {
    /// Columns by physical table, in creation order
    tables: BTreeMap<String, Vec<String>>,
    functions: BTreeSet<String>,
    /// Trigger count by physical table
    triggers: BTreeMap<String, usize>,
    /// Index SQL by physical table
    indexes: BTreeMap<String, Vec<String>>,
    executed: Vec<DdlStatement>,
    fail_patterns: Vec<String>,
    fail_drops: bool,
}

/// Shared in-memory schema.
///
/// Clones share state, so a test can keep a handle for inspection while the
/// orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every statement whose SQL contains `pattern` fail.
    pub fn fail_on(&self, pattern: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_patterns.push(pattern.into());
        }
    }

    /// Makes every DROP statement fail.
    pub fn fail_drops(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_drops = true;
        }
    }

    /// Clears injected failures.
    pub fn heal(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_patterns.clear();
            state.fail_drops = false;
        }
    }

    pub fn has_table(&self, physical: &str) -> bool {
        self.lock()
            .map(|s| s.tables.contains_key(physical))
            .unwrap_or(false)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.lock()
            .map(|s| s.functions.contains(name))
            .unwrap_or(false)
    }

    pub fn columns(&self, physical: &str) -> Option<Vec<String>> {
        self.lock().ok()?.tables.get(physical).cloned()
    }

    pub fn trigger_count(&self, physical: &str) -> usize {
        self.lock()
            .ok()
            .and_then(|s| s.triggers.get(physical).copied())
            .unwrap_or(0)
    }

    pub fn indexes(&self, physical: &str) -> Vec<String> {
        self.lock()
            .ok()
            .and_then(|s| s.indexes.get(physical).cloned())
            .unwrap_or_default()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.lock()
            .map(|s| s.tables.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Every statement that executed successfully, in order.
    pub fn executed(&self) -> Vec<DdlStatement> {
        self.lock().map(|s| s.executed.clone()).unwrap_or_default()
    }

    /// Creates a physical table outside of any plan.
    pub fn insert_table(&self, physical: impl Into<String>, columns: &[&str]) {
        if let Ok(mut state) = self.state.lock() {
            state
                .tables
                .insert(physical.into(), columns.iter().map(|c| c.to_string()).collect());
        }
    }

    fn lock(&self) -> DatabaseResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| DatabaseError::Internal("Lock poisoned".into()))
    }

    fn apply(&self, statement: &DdlStatement) -> DatabaseResult<()> {
        let mut state = self.lock()?;
        let fail = |message: String| Err(DatabaseError::statement(message, statement.sql.clone()));

        let dropping = matches!(
            statement.kind,
            StatementKind::DropTable | StatementKind::DropFunction
        );
        if (dropping && state.fail_drops)
            || state.fail_patterns.iter().any(|p| statement.sql.contains(p))
        {
            return fail(format!("injected failure for {}", statement.object));
        }

        let object = statement.object.clone();
        match statement.kind {
            StatementKind::CreateTable => {
                if state.tables.contains_key(&object) {
                    return fail(format!("relation \"{}\" already exists", object));
                }
                state.tables.insert(object, column_list(&statement.sql));
            }
            StatementKind::AddColumn => {
                let column = added_column(&statement.sql)
                    .ok_or_else(|| DatabaseError::statement("malformed ADD COLUMN", statement.sql.clone()))?;
                let Some(columns) = state.tables.get_mut(&object) else {
                    return fail(format!("relation \"{}\" does not exist", object));
                };
                if columns.contains(&column) {
                    return fail(format!("column \"{}\" already exists", column));
                }
                columns.push(column);
            }
            StatementKind::CreateFunction => {
                state.functions.insert(object);
            }
            StatementKind::CreateTrigger => {
                if !state.tables.contains_key(&object) {
                    return fail(format!("relation \"{}\" does not exist", object));
                }
                *state.triggers.entry(object).or_default() += 1;
            }
            StatementKind::CreateIndex => {
                if !state.tables.contains_key(&object) {
                    return fail(format!("relation \"{}\" does not exist", object));
                }
                let indexes = state.indexes.entry(object).or_default();
                if !indexes.contains(&statement.sql) {
                    indexes.push(statement.sql.clone());
                }
            }
            StatementKind::DropTable => {
                state.tables.remove(&object);
                state.triggers.remove(&object);
                state.indexes.remove(&object);
            }
            StatementKind::DropFunction => {
                state.functions.remove(&object);
            }
        }

        state.executed.push(statement.clone());
        Ok(())
    }
}

#[async_trait]
impl DdlExecutor for MemoryDatabase {
    async fn session(&self) -> DatabaseResult<Box<dyn DdlSession>> {
        Ok(Box::new(MemorySession { db: self.clone() }))
    }

    async fn list_physical_tables(&self) -> DatabaseResult<Vec<String>> {
        Ok(self
            .lock()?
            .tables
            .keys()
            .filter(|name| name.starts_with(TABLE_PREFIX))
            .cloned()
            .collect())
    }
}

struct MemorySession {
    db: MemoryDatabase,
}

#[async_trait]
impl DdlSession for MemorySession {
    async fn execute(&mut self, statement: &DdlStatement) -> DatabaseResult<()> {
        self.db.apply(statement)
    }
}

/// Leading quoted identifier of each line inside `CREATE TABLE ... ( ... )`.
fn column_list(sql: &str) -> Vec<String> {
    let Some(start) = sql.find('(') else {
        return Vec::new();
    };
    sql[start + 1..]
        .lines()
        .filter_map(|line| leading_ident(line.trim_start()))
        .collect()
}

fn added_column(sql: &str) -> Option<String> {
    let start = sql.find("ADD COLUMN ")? + "ADD COLUMN ".len();
    leading_ident(&sql[start..])
}

fn leading_ident(s: &str) -> Option<String> {
    let mut chars = s.strip_prefix('"')?.chars().peekable();
    let mut ident = String::new();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                ident.push('"');
            } else {
                return Some(ident);
            }
        } else {
            ident.push(c);
        }
    }
    None
}
