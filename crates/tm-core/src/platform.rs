//! Database platform families.
//!
//! Drivers report many different platform names (`PostgreSQLPlatform`,
//! `pgsql`, `MariaDb1060Platform`, ...). Migration scripts only exist for two
//! families, so every reported name is folded into one of them.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The family of database engines a set of migration scripts targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    /// PostgreSQL and engines that accept its DDL (DuckDB)
    Pgsql,
    /// MySQL and MariaDB
    Mysql,
}

impl PlatformFamily {
    /// Normalize a reported platform name into its family.
    ///
    /// Matching is case-insensitive and by substring, so driver class names
    /// such as `PostgreSQL100Platform` resolve the same way as `pgsql`.
    pub fn from_platform_name(platform: &str) -> CoreResult<Self> {
        let normalized = platform.trim().to_lowercase();
        if ["postgres", "pgsql", "duckdb"]
            .iter()
            .any(|alias| normalized.contains(alias))
        {
            Ok(PlatformFamily::Pgsql)
        } else if ["mysql", "mariadb"]
            .iter()
            .any(|alias| normalized.contains(alias))
        {
            Ok(PlatformFamily::Mysql)
        } else {
            Err(CoreError::UnknownPlatform {
                platform: platform.to_string(),
            })
        }
    }

    /// Directory name of this family below the migration root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            PlatformFamily::Pgsql => "pgsql",
            PlatformFamily::Mysql => "mysql",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
