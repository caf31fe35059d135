//! tm-sql - SQL helpers for Tidemark
//!
//! This crate splits raw migration scripts into individually executable
//! statements, quotes values for the audit ledger SQL it renders, and
//! optionally validates statements with sqlparser-rs before they are applied.

pub mod error;
pub mod quote;
pub mod splitter;
pub mod validate;

pub use error::{SqlError, SqlResult};
pub use quote::quote_literal;
pub use splitter::{split_statements_with, SplitOptions};
pub use validate::StatementValidator;
