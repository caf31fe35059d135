//! tm-migrate - Migration engine for Tidemark
//!
//! The [`MigrationLoader`] turns the migration tree on disk into ordered
//! lists of files and statements. The [`MigrationManager`] filters those
//! against the audit ledger and applies them one statement at a time through
//! a [`MigrationTarget`], which either talks to a live database or only
//! collects the SQL a live run would execute.

pub mod error;
pub mod loader;
pub mod manager;
pub mod target;

pub use error::{MigrateError, MigrateResult};
pub use loader::MigrationLoader;
pub use manager::{MigrationManager, MigrationState, MigrationStatus};
pub use target::{LiveTarget, MigrationTarget, SqlOnlyTarget};
