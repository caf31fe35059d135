//! Where a migration run sends its work.
//!
//! The manager drives every migration through the same sequence of calls on
//! a [`MigrationTarget`]. [`LiveTarget`] executes the statements and ledger
//! writes against a database; [`SqlOnlyTarget`] only renders them. Both
//! return the same text for the same call, so a sql-only preview is exactly
//! what a live run executes.

use crate::error::MigrateResult;
use tm_core::ShortName;
use tm_db::{Database, DbResult};
use tm_ledger::{AppliedRecord, AuditEvent, Ledger, LedgerError};

/// Capability a migration run is executed against.
pub trait MigrationTarget {
    /// Create the ledger tables if needed; returns the DDL text
    fn prepare_ledger(&self) -> MigrateResult<String>;

    /// Applied markers currently in the ledger
    fn applied_records(&self) -> MigrateResult<Vec<AppliedRecord>>;

    /// Migrations that left events behind without being applied
    fn failed_migrations(&self) -> MigrateResult<Vec<ShortName>>;

    /// Persist one audit event; returns the rendered INSERT
    fn record_event(&self, event: &AuditEvent) -> MigrateResult<String>;

    /// Execute one migration statement; returns the statement text
    fn execute(&self, statement: &str) -> DbResult<String>;

    /// Collapse a migration's events into its applied marker
    fn consolidate(&self, short_name: &ShortName) -> MigrateResult<String>;
}

/// Rendered form of one statement in run output.
fn render(statement: &str) -> String {
    format!("{statement};\n")
}

fn render_all(statements: &[String]) -> String {
    statements.iter().map(|s| render(s)).collect()
}

/// Executes everything against a live connection.
pub struct LiveTarget<'a> {
    db: &'a dyn Database,
    ledger: Ledger,
}

impl<'a> LiveTarget<'a> {
    pub fn new(db: &'a dyn Database, ledger: Ledger) -> Self {
        Self { db, ledger }
    }

    fn run_ledger_statements(&self, statements: &[String]) -> MigrateResult<String> {
        for stmt in statements {
            self.db.execute(stmt).map_err(LedgerError::from)?;
        }
        Ok(render_all(statements))
    }
}

impl MigrationTarget for LiveTarget<'_> {
    fn prepare_ledger(&self) -> MigrateResult<String> {
        self.run_ledger_statements(&self.ledger.ddl_statements())
    }

    fn applied_records(&self) -> MigrateResult<Vec<AppliedRecord>> {
        Ok(self.ledger.applied_records(self.db)?)
    }

    fn failed_migrations(&self) -> MigrateResult<Vec<ShortName>> {
        Ok(self.ledger.failed_migrations(self.db)?)
    }

    fn record_event(&self, event: &AuditEvent) -> MigrateResult<String> {
        self.run_ledger_statements(&[self.ledger.event_sql(event)])
    }

    fn execute(&self, statement: &str) -> DbResult<String> {
        // One chunk is one statement; a fragment holding several is an error.
        self.db.execute(statement)?;
        Ok(render(statement))
    }

    fn consolidate(&self, short_name: &ShortName) -> MigrateResult<String> {
        self.run_ledger_statements(&self.ledger.consolidation_sql(short_name))
    }
}

/// Renders everything and writes nothing.
///
/// Ledger reads go to `discovery` when a database is available (opened
/// read-only by the caller); without one the ledger is treated as empty.
pub struct SqlOnlyTarget<'a> {
    discovery: Option<&'a dyn Database>,
    ledger: Ledger,
}

impl<'a> SqlOnlyTarget<'a> {
    pub fn new(discovery: Option<&'a dyn Database>, ledger: Ledger) -> Self {
        Self { discovery, ledger }
    }

    /// Preview against an empty ledger.
    pub fn offline(ledger: Ledger) -> Self {
        Self::new(None, ledger)
    }
}

impl MigrationTarget for SqlOnlyTarget<'_> {
    fn prepare_ledger(&self) -> MigrateResult<String> {
        Ok(render_all(&self.ledger.ddl_statements()))
    }

    fn applied_records(&self) -> MigrateResult<Vec<AppliedRecord>> {
        match self.discovery {
            Some(db) => Ok(self.ledger.applied_records(db)?),
            None => Ok(Vec::new()),
        }
    }

    fn failed_migrations(&self) -> MigrateResult<Vec<ShortName>> {
        match self.discovery {
            Some(db) => Ok(self.ledger.failed_migrations(db)?),
            None => Ok(Vec::new()),
        }
    }

    fn record_event(&self, event: &AuditEvent) -> MigrateResult<String> {
        Ok(render(&self.ledger.event_sql(event)))
    }

    fn execute(&self, statement: &str) -> DbResult<String> {
        Ok(render(statement))
    }

    fn consolidate(&self, short_name: &ShortName) -> MigrateResult<String> {
        Ok(render_all(&self.ledger.consolidation_sql(short_name)))
    }
}

#[cfg(test)]
#[path = "target_test.rs"]
mod tests;
