//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tm_core::Version;
use tm_migrate::{MigrationManager, MigrationTarget};

use crate::context::ProjectContext;

/// Baseline for discovery: the explicit `--from-version`, or whatever the
/// ledger says the database is already at.
pub(crate) fn resolve_baseline(
    explicit: Option<&Version>,
    ctx: &ProjectContext,
    manager: &MigrationManager,
    target: &dyn MigrationTarget,
) -> Result<Version> {
    match explicit {
        Some(version) => Ok(version.clone()),
        None => manager
            .infer_baseline_version(target, ctx.default_baseline())
            .context("Failed to infer the baseline version from the ledger"),
    }
}

/// Progress bar for applying `len` migrations.
pub(crate) fn migration_progress(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
