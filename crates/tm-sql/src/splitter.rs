//! Statement splitter for migration scripts.
//!
//! This is not a SQL parser. It scans the script once, left to right, and
//! only tracks enough lexical state (quoted literals, comments, dollar-quoted
//! bodies) to know whether a `;` is a top-level statement terminator or part
//! of a literal.

use tm_core::PlatformFamily;

/// Lexical conventions the splitter honors beyond the ANSI baseline.
///
/// The baseline always understands `'...'` and `"..."` with doubled-quote
/// escapes, `--` line comments, and `/* */` block comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitOptions {
    /// `\` escapes the next character inside quoted literals (MySQL)
    pub backslash_escapes: bool,
    /// `` `...` `` quotes identifiers (MySQL)
    pub backtick_identifiers: bool,
    /// `#` starts a line comment (MySQL)
    pub hash_comments: bool,
    /// `$tag$ ... $tag$` quotes function bodies (PostgreSQL)
    pub dollar_quotes: bool,
}

impl SplitOptions {
    /// Options matching the lexical rules of a platform family.
    pub fn for_family(family: PlatformFamily) -> Self {
        match family {
            PlatformFamily::Pgsql => Self {
                dollar_quotes: true,
                ..Self::default()
            },
            PlatformFamily::Mysql => Self {
                backslash_escapes: true,
                backtick_identifiers: true,
                hash_comments: true,
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Quoted(u8),
    LineComment,
    BlockComment,
    /// Inside a dollar-quoted body; the tag spans `start..start + len`.
    Dollar { start: usize, len: usize },
}

/// Split a script into statements.
///
/// A `;` outside any literal or comment ends a statement. Each statement is
/// returned trimmed, without its terminator, and without comments trailing
/// its last token, so `"{statement};"` always terminates it. Fragments that
/// are empty or hold nothing but comments are dropped.
pub fn split_statements_with(sql: &str, options: SplitOptions) -> Vec<String> {
    // Every delimiter is ASCII, so scanning bytes never splits a UTF-8 sequence.
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut state = State::Normal;
    let mut start = 0;
    // End of the last byte of code (not whitespace, not comment) in the fragment.
    let mut code_end = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        match state {
            State::Normal => match b {
                b'\'' | b'"' => {
                    state = State::Quoted(b);
                    code_end = i + 1;
                }
                b'`' if options.backtick_identifiers => {
                    state = State::Quoted(b);
                    code_end = i + 1;
                }
                b'-' if next == Some(b'-') => {
                    state = State::LineComment;
                    i += 1;
                }
                b'#' if options.hash_comments => state = State::LineComment,
                b'/' if next == Some(b'*') => {
                    state = State::BlockComment;
                    i += 1;
                }
                b'$' if options.dollar_quotes => match dollar_tag_len(bytes, i) {
                    Some(len) => {
                        state = State::Dollar { start: i, len };
                        i += len;
                        code_end = i;
                        continue;
                    }
                    None => code_end = i + 1,
                },
                b';' => {
                    push_fragment(&mut statements, &sql[start..code_end]);
                    start = i + 1;
                    code_end = start;
                }
                _ if b.is_ascii_whitespace() => {}
                _ => code_end = i + 1,
            },
            State::Quoted(quote) => {
                if b == b'\\' && options.backslash_escapes && quote != b'`' {
                    i = (i + 2).min(bytes.len());
                    code_end = i;
                    continue;
                }
                if b == quote {
                    if next == Some(quote) {
                        i += 2;
                        code_end = i;
                        continue;
                    }
                    state = State::Normal;
                }
                code_end = i + 1;
            }
            State::LineComment => {
                if b == b'\n' || b == b'\r' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = State::Normal;
                    i += 1;
                }
            }
            State::Dollar { start: tag, len } => {
                if bytes[i..].starts_with(&bytes[tag..tag + len]) {
                    state = State::Normal;
                    i += len;
                    code_end = i;
                    continue;
                }
                code_end = i + 1;
            }
        }
        i += 1;
    }

    if !matches!(state, State::Normal | State::LineComment) {
        log::warn!("Script ends inside an unterminated literal or comment");
    }
    push_fragment(&mut statements, &sql[start..code_end]);
    statements
}

fn push_fragment(statements: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

/// Length of a dollar-quote tag (`$$` or `$name$`) starting at `at`.
fn dollar_tag_len(bytes: &[u8], at: usize) -> Option<usize> {
    // `a$b$` is an identifier, not a tag.
    if at > 0 && is_ident_byte(bytes[at - 1]) {
        return None;
    }
    let mut end = at + 1;
    if let Some(first) = bytes.get(end) {
        if first.is_ascii_digit() {
            return None;
        }
    }
    while let Some(&b) = bytes.get(end) {
        if b == b'$' {
            return Some(end - at + 1);
        }
        if !is_ident_byte(b) {
            return None;
        }
        end += 1;
    }
    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
