//! Migration tree discovery and statement splitting.
//!
//! Layout on disk:
//!
//! ```text
//! <root>/<family>/<version>/<NNN-description>.sql
//! ```
//!
//! Nothing here touches a database; the loader only reads the filesystem.

use crate::error::{MigrateError, MigrateResult};
use std::fs;
use std::path::{Path, PathBuf};
use tm_core::{PlatformFamily, Version};
use tm_sql::{split_statements_with, SplitOptions};

/// Reads migration directories and files below one migration root.
#[derive(Debug, Clone)]
pub struct MigrationLoader {
    root: PathBuf,
}

impl MigrationLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding migrations for a raw platform name.
    ///
    /// Aliases collapse onto one family directory. Unknown platforms and a
    /// missing family directory are both errors.
    pub fn migration_dir_for_platform(&self, platform: &str) -> MigrateResult<PathBuf> {
        let family = PlatformFamily::from_platform_name(platform)?;
        self.migration_dir_for_family(family)
    }

    /// Directory holding migrations for a platform family.
    pub fn migration_dir_for_family(&self, family: PlatformFamily) -> MigrateResult<PathBuf> {
        let dir = self.root.join(family.dir_name());
        if !dir.is_dir() {
            return Err(MigrateError::RootNotFound { path: dir });
        }
        Ok(dir)
    }

    /// Version directories directly below `root` whose version is `>= from`,
    /// oldest first.
    ///
    /// Entries whose name does not start with a digit are ignored; names that
    /// start with a digit but do not parse as a version are skipped with a
    /// warning.
    pub fn version_directories_at_or_above(
        &self,
        from: &Version,
        root: &Path,
    ) -> MigrateResult<Vec<PathBuf>> {
        let entries = fs::read_dir(root).map_err(|source| MigrateError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| MigrateError::Io {
                path: root.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            let version = match Version::parse(name) {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("Skipping migration directory {}: {}", path.display(), e);
                    continue;
                }
            };
            if version >= *from {
                found.push((version, path));
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        log::debug!(
            "Found {} version directories at or above {} in {}",
            found.len(),
            from,
            root.display()
        );
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }

    /// `*.sql` files directly inside `dir`, sorted by file name.
    pub fn migration_files_in(&self, dir: &Path) -> MigrateResult<Vec<PathBuf>> {
        let pattern = format!(
            "{}/*.sql",
            glob::Pattern::escape(&dir.to_string_lossy())
        );
        let paths = glob::glob(&pattern).map_err(|source| MigrateError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| MigrateError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Split raw migration text into executable statements.
    pub fn split_into_statements(&self, raw: &str, family: PlatformFamily) -> Vec<String> {
        split_statements_with(raw, SplitOptions::for_family(family))
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
