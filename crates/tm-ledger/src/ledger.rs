//! Ledger SQL rendering and reads.
//!
//! Writes are rendered to text with inline, escaped literals; the caller
//! decides whether that text is executed or only collected. Reads go
//! straight to the database and treat missing ledger tables as an empty
//! ledger.

use crate::ddl::ledger_ddl;
use crate::error::{LedgerError, LedgerResult};
use crate::event::{AppliedRecord, AuditEvent};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use tm_core::{PlatformFamily, ShortName, Version};
use tm_db::{Database, DbError};
use tm_sql::{quote_literal, split_statements_with, SplitOptions};

/// Append-only event table.
pub const EVENTS_TABLE: &str = "tidemark_migration_events";

/// Applied-marker table, keyed by short name.
pub const APPLIED_TABLE: &str = "tidemark_migrations_applied";

/// Renders and reads the audit ledger for one run.
///
/// `target_version` is the version being migrated to; it is stamped on every
/// row the run writes.
#[derive(Debug, Clone)]
pub struct Ledger {
    family: PlatformFamily,
    target_version: Version,
}

impl Ledger {
    pub fn new(family: PlatformFamily, target_version: Version) -> Self {
        Self {
            family,
            target_version,
        }
    }

    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    pub fn target_version(&self) -> &Version {
        &self.target_version
    }

    /// The ledger DDL split into individual statements.
    pub fn ddl_statements(&self) -> Vec<String> {
        split_statements_with(
            ledger_ddl(self.family),
            SplitOptions::for_family(self.family),
        )
    }

    /// INSERT for one audit event.
    pub fn event_sql(&self, event: &AuditEvent) -> String {
        format!(
            "INSERT INTO {EVENTS_TABLE} (short_name, phase, message, target_version) VALUES ({}, {}, {}, {})",
            self.literal(event.short_name.as_str()),
            self.literal(&event.phase.to_string()),
            self.literal(&event.message),
            self.literal(self.target_version.as_str()),
        )
    }

    /// Statements that turn a migration's events into one applied marker.
    ///
    /// Order matters: the marker is replaced first, and the events are only
    /// dropped once the marker exists.
    pub fn consolidation_sql(&self, short_name: &ShortName) -> Vec<String> {
        let name = self.literal(short_name.as_str());
        vec![
            format!("DELETE FROM {APPLIED_TABLE} WHERE short_name = {name}"),
            format!(
                "INSERT INTO {APPLIED_TABLE} (short_name, target_version) VALUES ({name}, {})",
                self.literal(self.target_version.as_str())
            ),
            format!("DELETE FROM {EVENTS_TABLE} WHERE short_name = {name}"),
        ]
    }

    /// Every applied marker, oldest first.
    pub fn applied_records(&self, db: &dyn Database) -> LedgerResult<Vec<AppliedRecord>> {
        let sql = format!(
            "SELECT short_name, target_version, {} FROM {APPLIED_TABLE} ORDER BY applied_at, short_name",
            self.text_cast("applied_at")
        );
        let rows = tolerate_missing(db.query_text(&sql, 3))?;

        rows.into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                let short_name = required(cells.next().flatten(), APPLIED_TABLE, "short_name")?;
                let version = required(cells.next().flatten(), APPLIED_TABLE, "target_version")?;
                let applied_at = cells.next().flatten().and_then(|ts| parse_timestamp(&ts));

                Ok(AppliedRecord {
                    short_name: ShortName::try_new(short_name).map_err(|e| corrupt(APPLIED_TABLE, e))?,
                    target_version: Version::parse(&version).map_err(|e| corrupt(APPLIED_TABLE, e))?,
                    applied_at,
                })
            })
            .collect()
    }

    /// Migrations with leftover events and no applied marker.
    ///
    /// These started at some point and never reached consolidation. Returned
    /// in the order their first event was written.
    pub fn failed_migrations(&self, db: &dyn Database) -> LedgerResult<Vec<ShortName>> {
        let sql = format!(
            "SELECT short_name FROM {EVENTS_TABLE} \
             WHERE short_name NOT IN (SELECT short_name FROM {APPLIED_TABLE}) \
             ORDER BY id"
        );
        let rows = tolerate_missing(db.query_text(&sql, 1))?;

        let mut seen = BTreeSet::new();
        let mut failed = Vec::new();
        for row in rows {
            let name = required(row.into_iter().next().flatten(), EVENTS_TABLE, "short_name")?;
            let short_name = ShortName::try_new(name).map_err(|e| corrupt(EVENTS_TABLE, e))?;
            if seen.insert(short_name.clone()) {
                failed.push(short_name);
            }
        }
        Ok(failed)
    }

    fn literal(&self, value: &str) -> String {
        quote_literal(value, self.family)
    }

    fn text_cast(&self, column: &str) -> String {
        match self.family {
            PlatformFamily::Pgsql => format!("CAST({column} AS VARCHAR)"),
            PlatformFamily::Mysql => format!("CAST({column} AS CHAR)"),
        }
    }
}

/// A database that has never been migrated has no ledger tables yet.
fn tolerate_missing<T: Default>(result: Result<T, DbError>) -> LedgerResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(DbError::TableNotFound(msg)) => {
            log::debug!("Ledger not found, treating as empty: {msg}");
            Ok(T::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn required(value: Option<String>, table: &str, column: &str) -> LedgerResult<String> {
    value.ok_or_else(|| LedgerError::CorruptRow {
        table: table.to_string(),
        message: format!("{column} is NULL"),
    })
}

fn corrupt(table: &str, err: impl std::fmt::Display) -> LedgerError {
    LedgerError::CorruptRow {
        table: table.to_string(),
        message: err.to_string(),
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").ok()
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
