//! Project context shared by all commands

use anyhow::{Context, Result};
use std::path::PathBuf;
use tm_core::{Config, PlatformFamily, Version};
use tm_db::{Database, DuckDbBackend};
use tm_ledger::Ledger;
use tm_migrate::{MigrationLoader, MigrationManager};

use crate::cli::GlobalArgs;

/// Loaded configuration plus the directory it is resolved against
pub(crate) struct ProjectContext {
    pub root: PathBuf,
    pub config: Config,
}

impl ProjectContext {
    /// Load the project config from `--config` or the project directory
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let root = global.project_dir.clone();
        let mut config = match &global.config {
            Some(path) => Config::load(path).context("Failed to load configuration file")?,
            None => Config::load_from_dir(&root).context("Failed to load project configuration")?,
        };
        if let Some(database) = &global.database {
            config.database.path = database.clone();
        }
        Ok(Self { root, config })
    }

    /// Open the configured database for reading and writing
    pub fn open_database(&self) -> Result<DuckDbBackend> {
        let db = match self.config.database_path_absolute(&self.root) {
            Some(path) => DuckDbBackend::from_path(&path),
            None => DuckDbBackend::in_memory(),
        };
        db.context("Failed to connect to database")
    }

    /// Open the configured database for ledger reads only.
    ///
    /// Returns `None` when there is nothing to read: an in-memory database
    /// or a database file that does not exist yet.
    pub fn open_for_discovery(&self) -> Result<Option<DuckDbBackend>> {
        match self.config.database_path_absolute(&self.root) {
            Some(path) if path.exists() => DuckDbBackend::read_only(&path)
                .map(Some)
                .context("Failed to open database read-only"),
            _ => Ok(None),
        }
    }

    /// Platform name to resolve migrations for.
    ///
    /// The configured override wins over what the connection reports.
    pub fn platform_name(&self, db: Option<&dyn Database>) -> String {
        self.config
            .database
            .platform
            .clone()
            .or_else(|| db.map(|db| db.platform_name().to_string()))
            .unwrap_or_else(|| "duckdb".to_string())
    }

    pub fn manager(&self, db: Option<&dyn Database>) -> Result<MigrationManager> {
        let loader = MigrationLoader::new(self.config.migration_root_absolute(&self.root));
        MigrationManager::new(loader, &self.platform_name(db))
            .context("Failed to locate migrations for this database platform")
    }

    pub fn ledger(&self, family: PlatformFamily) -> Ledger {
        Ledger::new(family, self.config.target_version.clone())
    }

    pub fn default_baseline(&self) -> &Version {
        &self.config.default_baseline
    }
}
