//! Audit ledger for Tidemark.
//!
//! The ledger lives in the target database itself: one append-only event
//! table recording how far each migration got, and one table of applied
//! markers that gates idempotency. This crate renders every ledger write as
//! plain SQL text so the same text can be executed live or printed as a
//! preview, and reads the ledger back through the `Database` trait.

pub mod ddl;
pub mod error;
pub mod event;
pub mod ledger;

pub use error::{LedgerError, LedgerResult};
pub use event::{AppliedRecord, AuditEvent, AuditPhase};
pub use ledger::{Ledger, APPLIED_TABLE, EVENTS_TABLE};
