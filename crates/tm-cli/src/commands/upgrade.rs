//! Upgrade command implementation

use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use tm_db::Database;
use tm_migrate::{LiveTarget, MigrationTarget, SqlOnlyTarget};

use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::commands::common::{migration_progress, resolve_baseline};
use crate::commands::interactive::{apply_interactively, InquirePrompt, Prompt};
use crate::context::ProjectContext;

/// Execute the upgrade command
pub fn execute(args: &UpgradeArgs, global: &GlobalArgs) -> Result<()> {
    // Mode conflicts are rejected before the config or database is touched.
    check_mode(args)?;
    let ctx = ProjectContext::load(global)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(args, &ctx, &mut InquirePrompt, &mut out)
}

/// `--sql-only` and `--interactive` do not compose.
fn check_mode(args: &UpgradeArgs) -> Result<()> {
    if args.sql_only && args.interactive {
        bail!("--sql-only and --interactive cannot be used together");
    }
    Ok(())
}

pub(crate) fn run(
    args: &UpgradeArgs,
    ctx: &ProjectContext,
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
) -> Result<()> {
    let pending = if args.sql_only {
        preview(args, ctx, out)?
    } else {
        apply(args, ctx, prompt, out)?
    };

    if !args.sql_only && !(args.interactive && pending > 0) {
        if pending == 0 {
            writeln!(out, "Nothing to do.")?;
        } else {
            writeln!(out, "Successfully upgraded database.")?;
        }
    }

    if pending > 0 {
        if let Some(notice) = &ctx.config.post_upgrade_notice {
            eprintln!();
            eprintln!("{}", notice.trim_end());
        }
    }
    Ok(())
}

/// Print what a live run would execute. Returns the pending count.
fn preview(args: &UpgradeArgs, ctx: &ProjectContext, out: &mut dyn Write) -> Result<usize> {
    let discovery = ctx.open_for_discovery()?;
    let db = discovery.as_ref().map(|db| db as &dyn Database);
    if db.is_none() {
        log::debug!("No existing database; previewing against an empty ledger");
    }

    let manager = ctx.manager(db)?;
    let target = SqlOnlyTarget::new(db, ctx.ledger(manager.family()));
    let from = resolve_baseline(args.from_version.as_ref(), ctx, &manager, &target)?;
    let pending = manager.pending_migrations(&from, &target)?;

    if !pending.is_empty() {
        write!(out, "{}", target.prepare_ledger()?)?;
        write!(out, "{}", manager.apply_all(&pending, &target)?)?;
    }
    Ok(pending.len())
}

/// Apply pending migrations to the database. Returns the pending count.
fn apply(
    args: &UpgradeArgs,
    ctx: &ProjectContext,
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
) -> Result<usize> {
    let db = ctx.open_database()?;
    if args.root_user.is_some() || args.root_pass.is_some() {
        log::debug!(
            "{} connections have no user accounts; ignoring root credentials",
            db.platform_name()
        );
    }

    let manager = ctx.manager(Some(&db))?;
    let target = LiveTarget::new(&db, ctx.ledger(manager.family()));
    target
        .prepare_ledger()
        .context("Failed to prepare the audit ledger")?;

    let from = resolve_baseline(args.from_version.as_ref(), ctx, &manager, &target)?;
    let pending = manager.pending_migrations(&from, &target)?;
    log::debug!("{} migrations pending from {}", pending.len(), from);

    if args.interactive {
        apply_interactively(&manager, &pending, &target, prompt, out)?;
    } else if !pending.is_empty() {
        let pb = migration_progress(pending.len());
        let result = manager.apply_all_with_progress(&pending, &target, |path| {
            if let Ok(name) = manager.short_name(path) {
                pb.set_message(name.into_inner());
            }
            pb.inc(1);
        });
        pb.finish_and_clear();

        let executed = result.context("Upgrade stopped; later migrations were not attempted")?;
        log::debug!("Executed:\n{}", executed);
    }
    Ok(pending.len())
}

#[cfg(test)]
#[path = "upgrade_test.rs"]
mod tests;
