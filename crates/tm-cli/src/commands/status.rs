//! Status command implementation

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use tm_core::{ShortName, Version};
use tm_db::Database;
use tm_migrate::{MigrationState, MigrationStatus, SqlOnlyTarget};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::resolve_baseline;
use crate::context::ProjectContext;

/// JSON shape of `tm status --output json`
#[derive(Debug, Serialize)]
struct StatusReport {
    baseline: Version,
    migrations: Vec<MigrationStatus>,
    failed: Vec<ShortName>,
}

/// Execute the status command
pub fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(args, &ctx, &mut out)
}

pub(crate) fn run(args: &StatusArgs, ctx: &ProjectContext, out: &mut dyn Write) -> Result<()> {
    // Status only reads, so it never opens the database for writing.
    let discovery = ctx.open_for_discovery()?;
    let db = discovery.as_ref().map(|db| db as &dyn Database);
    let manager = ctx.manager(db)?;
    let target = SqlOnlyTarget::new(db, ctx.ledger(manager.family()));

    let baseline = resolve_baseline(args.from_version.as_ref(), ctx, &manager, &target)?;
    let report = StatusReport {
        migrations: manager.status(&baseline, &target)?,
        failed: manager.failed_migrations(&target)?,
        baseline,
    };

    match args.output {
        StatusOutput::Json => {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        StatusOutput::Table => print_table(&report, out)?,
    }
    Ok(())
}

fn print_table(report: &StatusReport, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Baseline: {}", report.baseline)?;
    if report.migrations.is_empty() {
        writeln!(out, "No migrations at or above the baseline.")?;
    } else {
        writeln!(out)?;
        writeln!(out, "{:<8}  MIGRATION", "STATE")?;
        for row in &report.migrations {
            writeln!(out, "{:<8}  {}", row.state.to_string(), row.short_name)?;
        }
    }

    let count = |state: MigrationState| {
        report
            .migrations
            .iter()
            .filter(|row| row.state == state)
            .count()
    };
    writeln!(out)?;
    writeln!(
        out,
        "{} applied, {} pending, {} failed",
        count(MigrationState::Applied),
        count(MigrationState::Pending),
        count(MigrationState::Failed)
    )?;

    // Failures below the baseline do not show up in the table above.
    let hidden: Vec<_> = report
        .failed
        .iter()
        .filter(|name| !report.migrations.iter().any(|row| &row.short_name == *name))
        .collect();
    if !hidden.is_empty() {
        writeln!(out)?;
        writeln!(out, "Failed migrations below the baseline:")?;
        for name in hidden {
            writeln!(out, "  {name}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
