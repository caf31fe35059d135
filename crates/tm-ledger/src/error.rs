//! Error types for the audit ledger.

use thiserror::Error;

/// Audit ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Ledger read or write failed against the database (L001).
    #[error("[L001] Ledger query failed")]
    Database(#[from] tm_db::DbError),

    /// A ledger row could not be interpreted (L002).
    #[error("[L002] Unreadable ledger row in {table}: {message}")]
    CorruptRow { table: String, message: String },
}

/// Result type alias for [`LedgerError`].
pub type LedgerResult<T> = Result<T, LedgerError>;
