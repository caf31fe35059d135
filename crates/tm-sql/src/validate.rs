//! Optional statement validation with sqlparser-rs.
//!
//! Used by `tm check` to catch syntax errors before a migration is applied.
//! Validation never changes what gets executed; the splitter alone decides
//! statement boundaries.

use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;
use tm_core::PlatformFamily;

use crate::error::{SqlError, SqlResult};

/// Validates single statements against a family's SQL dialect.
pub struct StatementValidator {
    dialect: Box<dyn Dialect>,
    family: PlatformFamily,
}

impl StatementValidator {
    /// Create a validator for the given platform family
    pub fn for_family(family: PlatformFamily) -> Self {
        let dialect: Box<dyn Dialect> = match family {
            PlatformFamily::Pgsql => Box::new(PostgreSqlDialect {}),
            PlatformFamily::Mysql => Box::new(MySqlDialect {}),
        };
        Self { dialect, family }
    }

    /// The family this validator checks against
    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    /// Parse `sql` and return how many statements it contains.
    pub fn validate(&self, sql: &str) -> SqlResult<usize> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        let statements = Parser::parse_sql(self.dialect.as_ref(), sql).map_err(|e| {
            let message = e.to_string();
            let (line, column) = parse_location_from_error(&message);
            SqlError::ParseError {
                message,
                line,
                column,
            }
        })?;
        Ok(statements.len())
    }
}

/// Parse line and column from a sqlparser error message.
///
/// `ParserError` only carries text, so "Line: N, Column: M" is read back out
/// of the message. Unknown locations are reported as `(0, 0)`.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let number_after = |label: &str| -> Option<usize> {
        let start = msg.find(label)? + label.len();
        let digits: String = msg[start..]
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    };

    match (number_after("Line:"), number_after("Column:")) {
        (Some(line), Some(column)) => (line, column),
        _ => (0, 0),
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
