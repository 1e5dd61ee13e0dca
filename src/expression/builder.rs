//! Expression constructors.
//!
//! Free functions for building expression trees without going through the
//! fluent query builders.

use super::{ConstantTable, Expression, PatternMatch};
use crate::query::{Delete, Insert, Merge, Select, Update, Where, Window};
use crate::value::{Argument, SqlValue};

/// Builds a bound value expression.
pub fn value(v: impl Into<SqlValue>) -> Expression {
    Expression::Value {
        value: v.into(),
        type_hint: None,
    }
}

/// Builds a bound value expression carrying an SQL type hint.
pub fn typed_value(v: impl Into<SqlValue>, sql_type: impl Into<String>) -> Expression {
    Expression::Value {
        value: v.into(),
        type_hint: Some(sql_type.into()),
    }
}

/// Builds the SQL `null` expression.
pub fn null() -> Expression {
    Expression::Null
}

/// Builds a row expression from a list of values.
pub fn row<I>(values: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Expression>,
{
    Expression::Row {
        values: values.into_iter().map(Into::into).collect(),
        cast_as: None,
    }
}

/// Builds an `array[…]` expression.
pub fn array<I>(values: I, value_type: Option<String>) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Expression>,
{
    Expression::Array {
        values: values.into_iter().map(Into::into).collect(),
        value_type,
    }
}

/// Builds an arbitrary quoted identifier.
pub fn identifier(name: impl Into<String>) -> Expression {
    Expression::Identifier {
        name: name.into(),
        namespace: None,
    }
}

/// Builds a column reference. The name is quoted as a whole; use
/// [`table_column`] for a table-qualified reference.
pub fn column(name: impl Into<String>) -> Expression {
    Expression::ColumnName {
        name: name.into(),
        table: None,
    }
}

/// Builds a table-qualified column reference.
pub fn table_column(table: impl Into<String>, name: impl Into<String>) -> Expression {
    Expression::ColumnName {
        name: name.into(),
        table: Some(table.into()),
    }
}

/// Builds a table reference.
pub fn table(name: impl Into<String>) -> Expression {
    Expression::TableName {
        name: name.into(),
        schema: None,
    }
}

/// Builds a raw SQL fragment with positional arguments.
pub fn raw<I>(template: impl Into<String>, arguments: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Argument>,
{
    Expression::Raw {
        template: template.into(),
        arguments: arguments.into_iter().map(Into::into).collect(),
    }
}

/// Builds a raw SQL full statement with positional arguments.
pub fn raw_query<I>(template: impl Into<String>, arguments: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Argument>,
{
    Expression::RawQuery {
        template: template.into(),
        arguments: arguments.into_iter().map(Into::into).collect(),
    }
}

/// Builds a function call expression.
pub fn function_call<I>(name: impl Into<String>, arguments: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Expression>,
{
    Expression::FunctionCall {
        name: name.into(),
        arguments: arguments.into_iter().map(Into::into).collect(),
    }
}

/// Builds an aggregate call; filter and window are added with the dedicated
/// fields on [`Expression::Aggregate`].
pub fn aggregate(function: impl Into<String>, column: Option<Expression>) -> Expression {
    Expression::Aggregate {
        function: function.into(),
        column: column.map(Box::new),
        filter: Where::and(),
        over: None,
    }
}

/// Builds a string concatenation expression.
pub fn concat<I>(items: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Expression>,
{
    Expression::Concat(items.into_iter().map(Into::into).collect())
}

/// Builds the `current_timestamp` expression.
pub fn current_timestamp() -> Expression {
    Expression::CurrentTimestamp
}

/// Builds the `random()` expression.
pub fn random() -> Expression {
    Expression::Random
}

/// Builds a random integer expression over an inclusive range.
pub fn random_int(min: i64, max: i64) -> Expression {
    Expression::RandomInt { min, max }
}

/// Builds a LIKE pattern; the value replaces the `?` marker in the pattern
/// template after LIKE-escaping.
pub fn like_pattern(
    column: Option<Expression>,
    pattern: impl Into<String>,
    value: Option<String>,
) -> Expression {
    Expression::LikePattern(PatternMatch {
        column: column.map(Box::new),
        pattern: pattern.into(),
        value,
        reserved_chars: None,
        case_sensitive: true,
    })
}

/// Builds a SIMILAR TO pattern.
pub fn similar_to_pattern(
    column: Option<Expression>,
    pattern: impl Into<String>,
    value: Option<String>,
) -> Expression {
    Expression::SimilarToPattern(PatternMatch {
        column: column.map(Box::new),
        pattern: pattern.into(),
        value,
        reserved_chars: None,
        case_sensitive: true,
    })
}

/// Builds an empty constant table; chain [`ConstantTable::row`] calls on it.
pub fn constant_table() -> ConstantTable {
    ConstantTable::new()
}

/// Builds an `if … then …` branch expression.
pub fn if_then(condition: impl Into<Expression>, then: impl Into<Expression>) -> Expression {
    Expression::IfThen {
        condition: Box::new(condition.into()),
        then: Box::new(then.into()),
    }
}

/// Builds a named window specification.
pub fn window() -> Window {
    Window::default()
}

/// Starts a SELECT query.
pub fn select() -> Select {
    Select::new()
}

/// Starts an INSERT query against a table.
pub fn insert(table: impl Into<String>) -> Insert {
    Insert::new(table)
}

/// Starts an UPDATE query against a table.
pub fn update(table: impl Into<String>) -> Update {
    Update::new(table)
}

/// Starts a DELETE query against a table.
pub fn delete(table: impl Into<String>) -> Delete {
    Delete::new(table)
}

/// Starts a MERGE query against a table.
pub fn merge(table: impl Into<String>) -> Merge {
    Merge::new(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_keeps_dotted_name_whole() {
        let expr = column("t.id");
        assert_eq!(
            expr,
            Expression::ColumnName {
                name: "t.id".to_string(),
                table: None,
            }
        );
    }

    #[test]
    fn test_raw_accepts_mixed_arguments() {
        let expr = raw("? + ?", [Argument::from(1), Argument::from(column("a"))]);
        match expr {
            Expression::Raw { arguments, .. } => assert_eq!(arguments.len(), 2),
            other => panic!("expected raw, got {other:?}"),
        }
    }

    #[test]
    fn test_constant_table_rows() {
        let t = constant_table().row([value(1), value(2)]).row([value(3), value(4)]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].len(), 2);
    }
}
