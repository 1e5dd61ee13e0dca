//! Dialect writers.
//!
//! Each writer wraps a standard core and re-implements only the hooks its
//! dialect diverges on; everything else is inherited from the provided
//! methods of [`SqlWriter`].

use super::placeholder::PlaceholderParser;
use super::{SqlWriter, StandardWriter, WriterContext};
use crate::converter::Converter;
use crate::error::{QueryBuilderError, QueryBuilderResult};
use crate::escaper::{Escaper, MySQLEscaper, SQLServerEscaper, StandardEscaper};
use crate::expression::Expression;

fn mysql_cast_type(as_type: &str) -> String {
    match as_type.to_lowercase().as_str() {
        "int" | "integer" | "smallint" | "bigint" => "signed".to_string(),
        "text" | "varchar" | "string" => "char".to_string(),
        _ => as_type.to_string(),
    }
}

fn concat_call<W: SqlWriter + ?Sized>(
    writer: &W,
    items: &[Expression],
    ctx: &mut WriterContext,
) -> QueryBuilderResult<String> {
    let rendered = items
        .iter()
        .map(|item| writer.format(item, ctx, true))
        .collect::<QueryBuilderResult<Vec<_>>>()?;
    Ok(format!("concat({})", rendered.join(", ")))
}

/// MySQL writer.
///
/// No aggregate FILTER, no RETURNING, `row (…)` constant-table rows,
/// `concat()` instead of `||`, and cast-type coercions.
pub struct MySQLWriter {
    core: StandardWriter,
}

impl MySQLWriter {
    pub fn new(converter: Converter) -> Self {
        Self {
            core: StandardWriter::new(Box::new(MySQLEscaper), converter),
        }
    }
}

impl Default for MySQLWriter {
    fn default() -> Self {
        Self::new(Converter::new())
    }
}

impl SqlWriter for MySQLWriter {
    fn escaper(&self) -> &dyn Escaper {
        self.core.escaper()
    }

    fn converter(&self) -> &Converter {
        self.core.converter()
    }

    fn placeholder_parser(&self) -> &PlaceholderParser {
        self.core.placeholder_parser()
    }

    fn dialect_name(&self) -> &'static str {
        "mysql"
    }

    fn supports_aggregate_filter(&self) -> bool {
        false
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn format_concat(
        &self,
        items: &[Expression],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        concat_call(self, items, ctx)
    }

    fn cast_type(&self, as_type: &str) -> String {
        mysql_cast_type(as_type)
    }

    fn format_current_timestamp(&self) -> String {
        "current_timestamp()".to_string()
    }

    fn format_random(&self) -> String {
        "rand()".to_string()
    }

    fn format_constant_table_row(
        &self,
        row: &[Expression],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        Ok(format!("row {}", self.format_row(row, ctx)?))
    }

    fn insert_no_values_token(&self) -> &'static str {
        "() values ()"
    }
}

/// MariaDB writer.
///
/// MySQL syntax with RETURNING support.
pub struct MariaDBWriter {
    core: StandardWriter,
}

impl MariaDBWriter {
    pub fn new(converter: Converter) -> Self {
        Self {
            core: StandardWriter::new(Box::new(MySQLEscaper), converter),
        }
    }
}

impl Default for MariaDBWriter {
    fn default() -> Self {
        Self::new(Converter::new())
    }
}

impl SqlWriter for MariaDBWriter {
    fn escaper(&self) -> &dyn Escaper {
        self.core.escaper()
    }

    fn converter(&self) -> &Converter {
        self.core.converter()
    }

    fn placeholder_parser(&self) -> &PlaceholderParser {
        self.core.placeholder_parser()
    }

    fn dialect_name(&self) -> &'static str {
        "mariadb"
    }

    fn supports_aggregate_filter(&self) -> bool {
        false
    }

    fn format_concat(
        &self,
        items: &[Expression],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        concat_call(self, items, ctx)
    }

    fn cast_type(&self, as_type: &str) -> String {
        mysql_cast_type(as_type)
    }

    fn format_current_timestamp(&self) -> String {
        "current_timestamp()".to_string()
    }

    fn format_random(&self) -> String {
        "rand()".to_string()
    }

    fn format_constant_table_row(
        &self,
        row: &[Expression],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        Ok(format!("row {}", self.format_row(row, ctx)?))
    }

    fn insert_no_values_token(&self) -> &'static str {
        "() values ()"
    }
}

/// SQLite writer.
///
/// Standard output over the standard escaper; SQLite accepts both the
/// FILTER clause and RETURNING.
pub struct SQLiteWriter {
    core: StandardWriter,
}

impl SQLiteWriter {
    pub fn new(converter: Converter) -> Self {
        Self {
            core: StandardWriter::new(Box::new(StandardEscaper), converter),
        }
    }
}

impl Default for SQLiteWriter {
    fn default() -> Self {
        Self::new(Converter::new())
    }
}

impl SqlWriter for SQLiteWriter {
    fn escaper(&self) -> &dyn Escaper {
        self.core.escaper()
    }

    fn converter(&self) -> &Converter {
        self.core.converter()
    }

    fn placeholder_parser(&self) -> &PlaceholderParser {
        self.core.placeholder_parser()
    }

    fn dialect_name(&self) -> &'static str {
        "sqlite"
    }
}

/// SQL Server writer.
///
/// Bracket identifiers, `offset … fetch` pagination, no aggregate FILTER,
/// no RETURNING, no arrays.
pub struct SQLServerWriter {
    core: StandardWriter,
}

impl SQLServerWriter {
    pub fn new(converter: Converter) -> Self {
        Self {
            core: StandardWriter::new(Box::new(SQLServerEscaper), converter),
        }
    }
}

impl Default for SQLServerWriter {
    fn default() -> Self {
        Self::new(Converter::new())
    }
}

impl SqlWriter for SQLServerWriter {
    fn escaper(&self) -> &dyn Escaper {
        self.core.escaper()
    }

    fn converter(&self) -> &Converter {
        self.core.converter()
    }

    fn placeholder_parser(&self) -> &PlaceholderParser {
        self.core.placeholder_parser()
    }

    fn dialect_name(&self) -> &'static str {
        "sqlserver"
    }

    fn supports_aggregate_filter(&self) -> bool {
        false
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn format_concat(
        &self,
        items: &[Expression],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        concat_call(self, items, ctx)
    }

    fn format_current_timestamp(&self) -> String {
        "getdate()".to_string()
    }

    fn format_random(&self) -> String {
        "rand()".to_string()
    }

    fn format_array(
        &self,
        _values: &[Expression],
        _value_type: Option<&str>,
        _ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        Err(QueryBuilderError::UnsupportedFeature {
            feature: "array",
            dialect: self.dialect_name(),
        })
    }

    fn format_range(&self, limit: u64, offset: u64) -> String {
        match (limit, offset) {
            (0, 0) => String::new(),
            (0, offset) => format!("offset {offset} rows"),
            (limit, offset) => {
                format!("offset {offset} rows fetch next {limit} rows only")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::builder::{column, concat, select, table, value};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mysql_identifier_quoting_flows_through() {
        let writer = MySQLWriter::default();
        let prepared = writer
            .prepare(select().column(column("a")).from(table("t")).into())
            .unwrap();
        assert_eq!(prepared.text, "select `a`\nfrom `t`");
    }

    #[test]
    fn test_mysql_concat_function() {
        let writer = MySQLWriter::default();
        let mut ctx = WriterContext::new(writer.converter());
        let expr = concat([column("a"), value(" ")]);
        assert_eq!(
            writer.format(&expr, &mut ctx, false).unwrap(),
            "concat(`a`, ?)"
        );
    }

    #[test]
    fn test_mysql_cast_coercions() {
        let writer = MySQLWriter::default();
        let mut ctx = WriterContext::new(writer.converter());
        let expr = column("a").cast_as("int");
        assert_eq!(
            writer.format(&expr, &mut ctx, false).unwrap(),
            "cast(`a` as signed)"
        );
    }

    #[test]
    fn test_sqlserver_range_syntax() {
        let writer = SQLServerWriter::default();
        assert_eq!(writer.format_range(0, 0), "");
        assert_eq!(writer.format_range(10, 0), "offset 0 rows fetch next 10 rows only");
        assert_eq!(writer.format_range(0, 5), "offset 5 rows");
        assert_eq!(writer.format_range(10, 5), "offset 5 rows fetch next 10 rows only");
    }

    #[test]
    fn test_sqlserver_rejects_arrays() {
        let writer = SQLServerWriter::default();
        let mut ctx = WriterContext::new(writer.converter());
        let expr = crate::expression::builder::array([value(1)], None);
        assert!(matches!(
            writer.format(&expr, &mut ctx, false),
            Err(QueryBuilderError::UnsupportedFeature { feature: "array", .. })
        ));
    }

    #[test]
    fn test_sqlite_is_standard() {
        let writer = SQLiteWriter::default();
        let prepared = writer
            .prepare(select().column(column("a")).from(table("t")).into())
            .unwrap();
        assert_eq!(prepared.text, "select \"a\"\nfrom \"t\"");
    }
}
