//! Check command implementation

use anyhow::{bail, Result};
use std::io::{self, Write};
use tm_db::Database;
use tm_migrate::SqlOnlyTarget;
use tm_sql::StatementValidator;

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::common::resolve_baseline;
use crate::context::ProjectContext;

/// Execute the check command
pub fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(args, &ctx, &mut out)
}

pub(crate) fn run(args: &CheckArgs, ctx: &ProjectContext, out: &mut dyn Write) -> Result<()> {
    let discovery = ctx.open_for_discovery()?;
    let db = discovery.as_ref().map(|db| db as &dyn Database);
    let manager = ctx.manager(db)?;
    let target = SqlOnlyTarget::new(db, ctx.ledger(manager.family()));

    let from = resolve_baseline(args.from_version.as_ref(), ctx, &manager, &target)?;
    let pending = manager.pending_migrations(&from, &target)?;
    let validator = StatementValidator::for_family(manager.family());

    let mut statement_count = 0;
    let mut errors = 0;
    for path in &pending {
        let short_name = manager.short_name(path)?;
        let statements = manager.statements_of(path)?;
        writeln!(out, "{short_name}: {} statements", statements.len())?;

        for (index, statement) in statements.iter().enumerate() {
            statement_count += 1;
            if let Err(e) = validator.validate(statement) {
                errors += 1;
                writeln!(out, "  statement {index}: {e}")?;
            }
        }
    }

    writeln!(
        out,
        "Checked {} migrations, {} statements",
        pending.len(),
        statement_count
    )?;
    if errors > 0 {
        bail!("{errors} statements failed to parse");
    }
    Ok(())
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
