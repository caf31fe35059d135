//! Database trait definition

use crate::error::DbResult;

/// Connection abstraction the migration engine runs against.
///
/// Calls are blocking and strictly sequential; an implementation is never
/// shared between concurrent runs.
pub trait Database {
    /// Execute a single statement, returns affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Run a query and return its first `width` columns as text.
    ///
    /// NULLs come back as `None`. Callers cast non-text columns in SQL.
    fn query_text(&self, sql: &str, width: usize) -> DbResult<Vec<Vec<Option<String>>>>;

    /// Raw platform name reported by the connection (e.g. "duckdb")
    fn platform_name(&self) -> &str;
}
