//! Embedded ledger DDL, one script per platform family.
//!
//! Every statement is `IF NOT EXISTS`, so running the script against a
//! database that already has the ledger is a no-op.

use tm_core::PlatformFamily;

const PGSQL: &str = include_str!("pgsql.sql");
const MYSQL: &str = include_str!("mysql.sql");

/// Raw ledger DDL for a platform family.
pub fn ledger_ddl(family: PlatformFamily) -> &'static str {
    match family {
        PlatformFamily::Pgsql => PGSQL,
        PlatformFamily::Mysql => MYSQL,
    }
}
