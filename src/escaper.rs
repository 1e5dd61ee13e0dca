//! Escapers.
//!
//! String-level quoting primitives provided per dialect. The escaper is the
//! single source of truth for quoting; the writer never builds quoted tokens
//! itself.

/// Dialect-provided quoting and placeholder primitives.
///
/// # Examples
///
/// ```rust
/// use queryforge::{Escaper, StandardEscaper, MySQLEscaper};
///
/// let standard = StandardEscaper;
/// let mysql = MySQLEscaper;
///
/// assert_eq!(standard.escape_identifier("name"), "\"name\"");
/// assert_eq!(mysql.escape_identifier("name"), "`name`");
/// ```
pub trait Escaper: Send + Sync {
    /// Quotes an identifier, doubling embedded quote characters.
    fn escape_identifier(&self, text: &str) -> String;

    /// Quotes and comma-joins a list of identifiers.
    fn escape_identifier_list(&self, identifiers: &[&str]) -> String {
        identifiers
            .iter()
            .map(|identifier| self.escape_identifier(identifier))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Quotes a string literal safe for inclusion in SQL text.
    fn escape_literal(&self, text: &str) -> String;

    /// Neutralizes LIKE/SIMILAR TO special characters.
    ///
    /// `reserved` overrides the default `%_` set for this call.
    fn escape_like(&self, text: &str, reserved: Option<&str>) -> String {
        let reserved = reserved.unwrap_or("%_");
        let mut output = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch == '\\' || reserved.contains(ch) {
                output.push('\\');
            }
            output.push(ch);
        }
        output
    }

    /// Encodes a binary value as a dialect literal.
    fn escape_blob(&self, bytes: &[u8]) -> String;

    /// Emits the placeholder token for the 0-based argument index.
    ///
    /// The standard form is `?` for every index; dialect drivers using
    /// numbered placeholders override this with e.g. `$1`.
    fn write_placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    /// What an escaped `??` token becomes after raw-SQL parsing.
    ///
    /// Drivers that re-parse `?` themselves override this to keep `??`.
    fn unescape_placeholder_char(&self) -> &'static str {
        "?"
    }

    /// Ordered delimiter pairs whose interior the placeholder parser must
    /// skip over.
    fn escape_sequences(&self) -> &'static [(&'static str, &'static str)];
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}

fn quote_doubling(text: &str, quote: char) -> String {
    let mut output = String::with_capacity(text.len() + 2);
    output.push(quote);
    for ch in text.chars() {
        if ch == quote {
            output.push(quote);
        }
        output.push(ch);
    }
    output.push(quote);
    output
}

/// SQL-92 escaper, also serving PostgreSQL and SQLite.
///
/// Double-quoted identifiers, single-quoted literals, `X'…'` blobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEscaper;

impl Escaper for StandardEscaper {
    fn escape_identifier(&self, text: &str) -> String {
        quote_doubling(text, '"')
    }

    fn escape_literal(&self, text: &str) -> String {
        quote_doubling(text, '\'')
    }

    fn escape_blob(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex_encode(bytes))
    }

    fn escape_sequences(&self) -> &'static [(&'static str, &'static str)] {
        &[("'", "'"), ("\"", "\""), ("$$", "$$")]
    }
}

/// MySQL/MariaDB escaper.
///
/// Backtick identifiers; literals double both quotes and backslashes since
/// the server treats backslash as an escape character.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySQLEscaper;

impl Escaper for MySQLEscaper {
    fn escape_identifier(&self, text: &str) -> String {
        quote_doubling(text, '`')
    }

    fn escape_literal(&self, text: &str) -> String {
        let doubled = text.replace('\\', "\\\\").replace('\'', "''");
        format!("'{doubled}'")
    }

    fn escape_blob(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex_encode(bytes))
    }

    fn escape_sequences(&self) -> &'static [(&'static str, &'static str)] {
        &[("'", "'"), ("\"", "\""), ("`", "`")]
    }
}

/// SQL Server escaper.
///
/// Bracket identifiers with `]` doubling, `0x…` binary literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SQLServerEscaper;

impl Escaper for SQLServerEscaper {
    fn escape_identifier(&self, text: &str) -> String {
        let doubled = text.replace(']', "]]");
        format!("[{doubled}]")
    }

    fn escape_literal(&self, text: &str) -> String {
        quote_doubling(text, '\'')
    }

    fn escape_blob(&self, bytes: &[u8]) -> String {
        format!("0x{}", hex_encode(bytes))
    }

    fn escape_sequences(&self) -> &'static [(&'static str, &'static str)] {
        &[("'", "'"), ("\"", "\""), ("[", "]")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_identifier_quoting() {
        let escaper = StandardEscaper;
        assert_eq!(escaper.escape_identifier("test"), "\"test\"");
        assert_eq!(escaper.escape_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_standard_literal_quoting() {
        let escaper = StandardEscaper;
        assert_eq!(escaper.escape_literal("hello"), "'hello'");
        assert_eq!(escaper.escape_literal("it's"), "'it''s'");
        assert_eq!(escaper.escape_literal(""), "''");
    }

    #[test]
    fn test_identifier_list() {
        let escaper = StandardEscaper;
        assert_eq!(
            escaper.escape_identifier_list(&["a", "b"]),
            "\"a\", \"b\""
        );
    }

    #[test]
    fn test_like_escaping() {
        let escaper = StandardEscaper;
        assert_eq!(escaper.escape_like("50%", None), "50\\%");
        assert_eq!(escaper.escape_like("a_b", None), "a\\_b");
        assert_eq!(escaper.escape_like("back\\slash", None), "back\\\\slash");
        // Per-call reserved set is honored.
        assert_eq!(escaper.escape_like("50%", Some("_")), "50%");
    }

    #[test]
    fn test_blob_encoding() {
        assert_eq!(StandardEscaper.escape_blob(&[0xde, 0xad]), "X'dead'");
        assert_eq!(SQLServerEscaper.escape_blob(&[0xde, 0xad]), "0xdead");
    }

    #[test]
    fn test_mysql_identifier_and_literal() {
        let escaper = MySQLEscaper;
        assert_eq!(escaper.escape_identifier("test"), "`test`");
        assert_eq!(escaper.escape_identifier("we`ird"), "`we``ird`");
        assert_eq!(escaper.escape_literal("a\\b'c"), "'a\\\\b''c'");
    }

    #[test]
    fn test_sqlserver_identifier() {
        let escaper = SQLServerEscaper;
        assert_eq!(escaper.escape_identifier("test"), "[test]");
        assert_eq!(escaper.escape_identifier("we]ird"), "[we]]ird]");
    }

    #[test]
    fn test_placeholder_defaults() {
        assert_eq!(StandardEscaper.write_placeholder(0), "?");
        assert_eq!(StandardEscaper.write_placeholder(41), "?");
        assert_eq!(StandardEscaper.unescape_placeholder_char(), "?");
    }
}
