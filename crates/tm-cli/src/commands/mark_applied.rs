//! Mark-applied command implementation

use anyhow::{Context, Result};
use std::io::{self, Write};
use tm_migrate::{LiveTarget, MigrationManager, MigrationTarget};

use crate::cli::{GlobalArgs, MarkAppliedArgs};
use crate::context::ProjectContext;

/// Execute the mark-applied command
pub fn execute(args: &MarkAppliedArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let db = ctx.open_database()?;
    let manager = ctx.manager(Some(&db))?;
    let target = LiveTarget::new(&db, ctx.ledger(manager.family()));
    target
        .prepare_ledger()
        .context("Failed to prepare the audit ledger")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(args, &manager, &target, &mut out)
}

pub(crate) fn run(
    args: &MarkAppliedArgs,
    manager: &MigrationManager,
    target: &dyn MigrationTarget,
    out: &mut dyn Write,
) -> Result<()> {
    // Resolve every name first so a typo marks nothing.
    let paths = args
        .short_names
        .iter()
        .map(|name| manager.resolve(name))
        .collect::<Result<Vec<_>, _>>()?;

    for path in &paths {
        manager.mark_applied(path, target)?;
        writeln!(out, "Marked as applied: {}", manager.short_name(path)?)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "mark_applied_test.rs"]
mod tests;
