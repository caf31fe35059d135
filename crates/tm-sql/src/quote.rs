//! SQL literal quoting
//!
//! Ledger statements are rendered as text with their values inlined, so the
//! same text can be executed against a live connection or printed as a
//! preview. This helper makes that inlining safe.

use tm_core::PlatformFamily;

/// Quote a string literal value.
///
/// Single quotes are doubled on every family. MySQL also treats backslash
/// as an escape character inside literals, so backslashes are doubled there.
pub fn quote_literal(value: &str, family: PlatformFamily) -> String {
    let escaped = match family {
        PlatformFamily::Pgsql => value.replace('\'', "''"),
        PlatformFamily::Mysql => value.replace('\\', "\\\\").replace('\'', "''"),
    };
    format!("'{escaped}'")
}
