//! # queryforge
//!
//! A dialect-aware SQL query builder: assemble relational queries as a
//! typed expression tree and render it into a dialect-specific SQL string
//! paired with a positional argument vector ready for a database driver.
//!
//! ## Usage Example
//!
//! ```rust
//! use queryforge::expression::builder::{column, select, table, value};
//! use queryforge::{Platform, QueryBuilder};
//!
//! // Create a builder targeting PostgreSQL
//! let builder = QueryBuilder::new(Platform::PostgreSQL);
//!
//! let query = select()
//!     .column(column("name"))
//!     .from(table("users"))
//!     .and_where(column("age").compare(">", value(18)));
//!
//! let prepared = builder.prepare(query).unwrap();
//! assert_eq!(prepared.text, "select \"name\"\nfrom \"users\"\nwhere \"age\" > ?");
//! assert_eq!(prepared.arguments.len(), 1);
//! ```

pub mod converter;
pub mod error;
pub mod escaper;
pub mod expression;
pub mod query;
pub mod value;
pub mod writer;

// Re-export public API
pub use crate::converter::{Converter, ConverterPluginRegistry, InputConverter, InputTypeGuesser};
pub use crate::error::{ConversionError, ConversionResult, QueryBuilderError, QueryBuilderResult};
pub use crate::escaper::{Escaper, MySQLEscaper, SQLServerEscaper, StandardEscaper};
pub use crate::expression::Expression;
pub use crate::query::{
    ConflictMode, Delete, Insert, JoinMode, Merge, OrderDirection, NullsPlacement, QueryOptions,
    Select, Update, Where, Window,
};
pub use crate::value::{Argument, SqlValue};
pub use crate::writer::{
    ArgumentBag, MariaDBWriter, MySQLWriter, QueryInput, SQLServerWriter, SQLiteWriter,
    SqlString, SqlWriter, StandardWriter, WriterContext,
};

/// Target database platform.
///
/// Selects the writer and escaper pair; the base writer targets
/// SQL-92/PostgreSQL-compatible output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    PostgreSQL,
    MySQL,
    MariaDB,
    SQLite,
    SQLServer,
}

impl Platform {
    /// Resolves a platform from its textual tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "postgresql" => Some(Self::PostgreSQL),
            "mysql" => Some(Self::MySQL),
            "mariadb" => Some(Self::MariaDB),
            "sqlite" => Some(Self::SQLite),
            "sqlserver" => Some(Self::SQLServer),
            _ => None,
        }
    }

    /// Returns the platform's textual tag.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "postgresql",
            Self::MySQL => "mysql",
            Self::MariaDB => "mariadb",
            Self::SQLite => "sqlite",
            Self::SQLServer => "sqlserver",
        }
    }

    /// Builds the writer for this platform over the given converter.
    pub fn writer(&self, converter: Converter) -> Box<dyn SqlWriter> {
        match self {
            Self::PostgreSQL => Box::new(StandardWriter::new(Box::new(StandardEscaper), converter)),
            Self::MySQL => Box::new(MySQLWriter::new(converter)),
            Self::MariaDB => Box::new(MariaDBWriter::new(converter)),
            Self::SQLite => Box::new(SQLiteWriter::new(converter)),
            Self::SQLServer => Box::new(SQLServerWriter::new(converter)),
        }
    }
}

/// Main entry point bundling a platform writer with its converter.
///
/// Provides the primary interface for rendering queries against a chosen
/// platform.
pub struct QueryBuilder {
    writer: Box<dyn SqlWriter>,
}

impl QueryBuilder {
    /// Creates a builder for the platform with a default converter.
    pub fn new(platform: Platform) -> Self {
        Self::with_converter(platform, Converter::new())
    }

    /// Creates a builder with a configured converter, typically one with
    /// registered plugins.
    pub fn with_converter(platform: Platform, converter: Converter) -> Self {
        Self {
            writer: platform.writer(converter),
        }
    }

    /// The underlying writer.
    pub fn writer(&self) -> &dyn SqlWriter {
        self.writer.as_ref()
    }

    /// Renders the input into SQL text plus bound arguments.
    pub fn prepare(&self, input: impl Into<QueryInput>) -> QueryBuilderResult<SqlString> {
        self.writer.prepare(input.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_tag_round_trip() {
        for platform in [
            Platform::PostgreSQL,
            Platform::MySQL,
            Platform::MariaDB,
            Platform::SQLite,
            Platform::SQLServer,
        ] {
            assert_eq!(Platform::from_tag(platform.tag()), Some(platform));
        }
        assert_eq!(Platform::from_tag("oracle"), None);
    }

    #[test]
    fn test_builder_prepares_text_input() {
        let builder = QueryBuilder::new(Platform::PostgreSQL);
        let prepared = builder.prepare("select 1").unwrap();
        assert_eq!(prepared.text, "select 1");
        assert!(prepared.arguments.is_empty());
    }
}
