//! Error types for tm-migrate

use std::path::PathBuf;
use thiserror::Error;
use tm_core::{CoreError, ShortName};
use tm_db::DbError;
use tm_ledger::LedgerError;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Invalid platform, version, or short name (M001)
    #[error("[M001] Configuration error")]
    Config(#[from] CoreError),

    /// Platform family directory missing (M002)
    #[error("[M002] Migration root not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    /// Filesystem read failed (M003)
    #[error("[M003] Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad glob pattern built from a directory path (M004)
    #[error("[M004] Invalid migration file pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Path is not below the migration root (M005)
    #[error("[M005] {} is not inside migration root {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// No migration file with this short name (M006)
    #[error("[M006] No migration named '{short_name}' under {}", root.display())]
    UnknownMigration { short_name: String, root: PathBuf },

    /// A migration statement failed against the database (M007)
    #[error("[M007] Statement {index} of migration {short_name} failed")]
    Statement {
        short_name: ShortName,
        index: usize,
        #[source]
        source: DbError,
    },

    /// Audit ledger failure (M008)
    #[error("[M008] Audit ledger error")]
    Ledger(#[from] LedgerError),
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
