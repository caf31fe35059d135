//! Per-migration prompt loop for `tm upgrade --interactive`

use anyhow::{Context, Result};
use inquire::Select;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tm_core::ShortName;
use tm_migrate::{MigrationManager, MigrationTarget};

/// What the operator wants to do with the current migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Choice {
    View,
    Apply,
    Skip,
    MarkApplied,
}

impl Choice {
    pub(crate) const ALL: [Choice; 4] = [
        Choice::View,
        Choice::Apply,
        Choice::Skip,
        Choice::MarkApplied,
    ];
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::View => write!(f, "View"),
            Choice::Apply => write!(f, "Apply"),
            Choice::Skip => write!(f, "Skip"),
            Choice::MarkApplied => write!(f, "Mark as already applied"),
        }
    }
}

/// Source of operator choices
pub(crate) trait Prompt {
    fn choose(&mut self, short_name: &ShortName) -> Result<Choice>;
}

/// Terminal prompt
pub(crate) struct InquirePrompt;

impl Prompt for InquirePrompt {
    fn choose(&mut self, _short_name: &ShortName) -> Result<Choice> {
        Select::new("Choose an option:", Choice::ALL.to_vec())
            .prompt()
            .context("Failed to read a choice")
    }
}

/// Walk the pending migrations, asking what to do with each.
///
/// Viewing prints the script and asks again; every other choice moves on to
/// the next migration. A failing apply stops the walk.
pub(crate) fn apply_interactively(
    manager: &MigrationManager,
    migrations: &[PathBuf],
    target: &dyn MigrationTarget,
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
) -> Result<()> {
    for path in migrations {
        let short_name = manager.short_name(path)?;
        writeln!(out, "Working on migration: {short_name}")?;

        loop {
            match prompt.choose(&short_name)? {
                Choice::View => {
                    let raw = fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    writeln!(out, "{raw}")?;
                }
                Choice::Apply => {
                    manager
                        .apply_one(path, target)
                        .with_context(|| format!("Failed to apply {short_name}"))?;
                    break;
                }
                Choice::Skip => break,
                Choice::MarkApplied => {
                    manager.mark_applied(path, target)?;
                    break;
                }
            }
        }
    }
    Ok(())
}
