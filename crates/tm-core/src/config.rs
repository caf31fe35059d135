//! Configuration types and parsing for tidemark.yml

use crate::error::{CoreError, CoreResult};
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main project configuration from tidemark.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Version the database is being migrated to; stored on every ledger row
    pub target_version: Version,

    /// Directory holding one subdirectory per platform family (`pgsql/`, `mysql/`)
    #[serde(default = "default_migration_root")]
    pub migration_root: String,

    /// Baseline used when the ledger shows no fully applied version directory
    #[serde(default = "default_baseline")]
    pub default_baseline: Version,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Reminder printed to stderr after any run that had pending migrations
    #[serde(default)]
    pub post_upgrade_notice: Option<String>,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file, or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Platform name override; when unset the connection reports its own
    #[serde(default)]
    pub platform: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            platform: None,
        }
    }
}

impl DatabaseConfig {
    /// Whether the configured path names an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_PATH
    }
}

const IN_MEMORY_PATH: &str = ":memory:";

const CONFIG_FILE_NAMES: [&str; 2] = ["tidemark.yml", "tidemark.yaml"];

fn default_migration_root() -> String {
    "migrations".to_string()
}

fn default_baseline() -> Version {
    Version::zero()
}

fn default_db_path() -> String {
    "tidemark.duckdb".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config for project '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for tidemark.yml or tidemark.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
            .map_or_else(
                || {
                    Err(CoreError::ConfigNotFound {
                        path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
                    })
                },
                |path| Self::load(&path),
            )
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.migration_root.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migration_root cannot be empty".to_string(),
            });
        }

        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        if self.default_baseline > self.target_version {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "default_baseline {} is newer than target_version {}",
                    self.default_baseline, self.target_version
                ),
            });
        }

        Ok(())
    }

    /// Migration root resolved against the project directory
    pub fn migration_root_absolute(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.migration_root)
    }

    /// Database path resolved against the project directory.
    ///
    /// Returns `None` for an in-memory database.
    pub fn database_path_absolute(&self, project_root: &Path) -> Option<PathBuf> {
        if self.database.is_in_memory() {
            None
        } else {
            Some(resolve(project_root, &self.database.path))
        }
    }
}

fn resolve(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
