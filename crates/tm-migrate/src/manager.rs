//! Pending-migration discovery and application.

use crate::error::{MigrateError, MigrateResult};
use crate::loader::MigrationLoader;
use crate::target::MigrationTarget;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tm_core::{PlatformFamily, ShortName, Version};
use tm_ledger::AuditEvent;

/// Ledger state of one migration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    Applied,
    Pending,
    /// Pending, with events left behind by an earlier attempt
    Failed,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::Applied => write!(f, "applied"),
            MigrationState::Pending => write!(f, "pending"),
            MigrationState::Failed => write!(f, "failed"),
        }
    }
}

/// One row of a status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub short_name: ShortName,
    pub state: MigrationState,
}

/// Orchestrates the loader and the ledger for one platform family.
///
/// The manager holds no connection. Every operation that reads or writes
/// the ledger takes the [`MigrationTarget`] explicitly.
#[derive(Debug, Clone)]
pub struct MigrationManager {
    loader: MigrationLoader,
    family: PlatformFamily,
    family_root: PathBuf,
}

impl MigrationManager {
    /// Resolve the platform to its family directory.
    ///
    /// Fails on an unknown platform or a missing family directory, before
    /// any statement can run.
    pub fn new(loader: MigrationLoader, platform: &str) -> MigrateResult<Self> {
        let family = PlatformFamily::from_platform_name(platform)?;
        let family_root = loader.migration_dir_for_family(family)?;
        log::debug!(
            "Platform '{}' uses {} migrations in {}",
            platform,
            family,
            family_root.display()
        );
        Ok(Self {
            loader,
            family,
            family_root,
        })
    }

    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    pub fn family_root(&self) -> &Path {
        &self.family_root
    }

    /// Every migration file at or above `from`, applied or not.
    ///
    /// Version directories oldest first, then files by name within each.
    pub fn discover(&self, from: &Version) -> MigrateResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for dir in self
            .loader
            .version_directories_at_or_above(from, &self.family_root)?
        {
            files.extend(self.loader.migration_files_in(&dir)?);
        }
        Ok(files)
    }

    /// Migrations at or above `from` that have no applied marker, in the
    /// order they must be applied.
    pub fn pending_migrations(
        &self,
        from: &Version,
        target: &dyn MigrationTarget,
    ) -> MigrateResult<Vec<PathBuf>> {
        let applied = self.applied_short_names(target)?;

        let mut pending = Vec::new();
        for path in self.discover(from)? {
            if !applied.contains(&self.short_name(&path)?) {
                pending.push(path);
            }
        }
        log::debug!("{} pending migrations from {}", pending.len(), from);
        Ok(pending)
    }

    /// Newest version directory whose files are all applied.
    ///
    /// Falls back to `default` when the ledger is empty or no directory is
    /// fully applied. Empty directories never count.
    pub fn infer_baseline_version(
        &self,
        target: &dyn MigrationTarget,
        default: &Version,
    ) -> MigrateResult<Version> {
        let applied = self.applied_short_names(target)?;
        if applied.is_empty() {
            return Ok(default.clone());
        }

        let dirs = self
            .loader
            .version_directories_at_or_above(&Version::zero(), &self.family_root)?;
        for dir in dirs.iter().rev() {
            let files = self.loader.migration_files_in(dir)?;
            if files.is_empty() {
                continue;
            }
            let mut all_applied = true;
            for file in &files {
                if !applied.contains(&self.short_name(file)?) {
                    all_applied = false;
                    break;
                }
            }
            if !all_applied {
                continue;
            }
            if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                let version = Version::parse(name)?;
                log::debug!("Inferred baseline version {}", version);
                return Ok(version);
            }
        }
        Ok(default.clone())
    }

    /// Migrations that started but never reached their applied marker.
    pub fn failed_migrations(
        &self,
        target: &dyn MigrationTarget,
    ) -> MigrateResult<Vec<ShortName>> {
        target.failed_migrations()
    }

    /// Ledger state of every migration at or above `from`.
    pub fn status(
        &self,
        from: &Version,
        target: &dyn MigrationTarget,
    ) -> MigrateResult<Vec<MigrationStatus>> {
        let applied = self.applied_short_names(target)?;
        let failed: BTreeSet<ShortName> = target.failed_migrations()?.into_iter().collect();

        self.discover(from)?
            .iter()
            .map(|path| {
                let short_name = self.short_name(path)?;
                let state = if applied.contains(&short_name) {
                    MigrationState::Applied
                } else if failed.contains(&short_name) {
                    MigrationState::Failed
                } else {
                    MigrationState::Pending
                };
                Ok(MigrationStatus { short_name, state })
            })
            .collect()
    }

    /// Ledger key for a migration file: its path relative to the family root.
    pub fn short_name(&self, path: &Path) -> MigrateResult<ShortName> {
        let relative = path
            .strip_prefix(&self.family_root)
            .map_err(|_| MigrateError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.family_root.clone(),
            })?;
        Ok(ShortName::from_relative_path(relative)?)
    }

    /// Path of the migration file a short name refers to.
    pub fn resolve(&self, short_name: &str) -> MigrateResult<PathBuf> {
        let unknown = || MigrateError::UnknownMigration {
            short_name: short_name.to_string(),
            root: self.family_root.clone(),
        };

        let relative = Path::new(short_name.trim_start_matches('/'));
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(unknown());
        }
        let path = self.family_root.join(relative);
        if !path.is_file() {
            return Err(unknown());
        }
        Ok(path)
    }

    /// Apply migrations in order, concatenating their output.
    ///
    /// Stops at the first failure; later migrations are never attempted.
    pub fn apply_all(
        &self,
        migrations: &[PathBuf],
        target: &dyn MigrationTarget,
    ) -> MigrateResult<String> {
        self.apply_all_with_progress(migrations, target, |_| {})
    }

    /// [`apply_all`](Self::apply_all), calling `on_applied` after each migration.
    pub fn apply_all_with_progress(
        &self,
        migrations: &[PathBuf],
        target: &dyn MigrationTarget,
        mut on_applied: impl FnMut(&Path),
    ) -> MigrateResult<String> {
        migrations
            .iter()
            .try_fold(String::new(), |mut output, path| -> MigrateResult<String> {
                output.push_str(&self.apply_one(path, target)?);
                on_applied(path);
                Ok(output)
            })
    }

    /// Apply one migration.
    ///
    /// Records `start`, then `chunk[i]` before each statement is executed,
    /// then `success`, and finally consolidates the events into an applied
    /// marker. A failing statement stops the migration where it is and leaves
    /// its events in the ledger.
    pub fn apply_one(&self, path: &Path, target: &dyn MigrationTarget) -> MigrateResult<String> {
        let short_name = self.short_name(path)?;
        let mut output = target.record_event(&AuditEvent::start(&short_name))?;

        let statements = self.statements_of(path)?;
        log::debug!("{}: {} statements", short_name, statements.len());

        for (index, statement) in statements.iter().enumerate() {
            output.push_str(&target.record_event(&AuditEvent::chunk(&short_name, index))?);
            let executed = target
                .execute(statement)
                .map_err(|source| MigrateError::Statement {
                    short_name: short_name.clone(),
                    index,
                    source,
                })?;
            output.push_str(&executed);
        }

        output.push_str(&target.record_event(&AuditEvent::success(&short_name))?);
        output.push_str(&target.consolidate(&short_name)?);
        log::info!("Applied migration {}", short_name);
        Ok(output)
    }

    /// Read a migration file and split it into statements.
    pub fn statements_of(&self, path: &Path) -> MigrateResult<Vec<String>> {
        let raw = fs::read_to_string(path).map_err(|source| MigrateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.loader.split_into_statements(&raw, self.family))
    }

    /// Record a migration as applied without executing any of it.
    pub fn mark_applied(&self, path: &Path, target: &dyn MigrationTarget) -> MigrateResult<String> {
        let short_name = self.short_name(path)?;
        let mut output = target.record_event(&AuditEvent::marked_applied(&short_name))?;
        output.push_str(&target.consolidate(&short_name)?);
        log::info!("Marked migration {} as applied", short_name);
        Ok(output)
    }

    fn applied_short_names(
        &self,
        target: &dyn MigrationTarget,
    ) -> MigrateResult<BTreeSet<ShortName>> {
        Ok(target
            .applied_records()?
            .into_iter()
            .map(|record| record.short_name)
            .collect())
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
