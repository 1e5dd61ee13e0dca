//! UPDATE query builder.

use super::{JoinMode, JoinStatement, QueryOptions, SelectColumn, Where, WithStatement};
use crate::expression::builder::table;
use crate::expression::Expression;
use crate::value::Argument;

/// Fluent UPDATE builder.
///
/// SET values accept either expressions (formatted in place, with raw and
/// query expressions parenthesized) or native values. A plain text value is
/// the single case that is literal-escaped into the SQL text instead of
/// going through the argument bag. A missing table is a structural error at
/// render time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    pub with: Vec<WithStatement>,
    pub table: Option<Expression>,
    pub set: Vec<(String, Argument)>,
    pub from: Vec<Expression>,
    pub joins: Vec<JoinStatement>,
    pub where_clause: Where,
    pub returning: Vec<SelectColumn>,
    pub identifier: Option<String>,
    pub options: QueryOptions,
}

impl Update {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table: Some(table(table_name)),
            ..Self::default()
        }
    }

    /// Sets the target table.
    pub fn table(mut self, table_name: impl Into<String>) -> Self {
        self.table = Some(table(table_name));
        self
    }

    /// Adds a CTE under the given alias.
    pub fn with(mut self, alias: impl Into<String>, expression: impl Into<Expression>) -> Self {
        self.with.push(WithStatement {
            alias: alias.into(),
            expression: expression.into(),
        });
        self
    }

    /// Adds a SET assignment.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Argument>) -> Self {
        self.set.push((column.into(), value.into()));
        self
    }

    /// Adds an extra FROM table.
    pub fn from(mut self, expression: impl Into<Expression>) -> Self {
        self.from.push(expression.into());
        self
    }

    /// Adds a join; the first join is promoted to the FROM list while
    /// rendering and must be INNER or NATURAL.
    pub fn join(mut self, mode: JoinMode, table: impl Into<Expression>, condition: Where) -> Self {
        self.joins.push(JoinStatement::new(mode, table, condition));
        self
    }

    /// AND-combines a condition into the WHERE clause.
    pub fn and_where(mut self, condition: impl Into<Expression>) -> Self {
        self.where_clause.add(condition);
        self
    }

    /// Adds a RETURNING column.
    pub fn returning(mut self, expression: impl Into<Expression>) -> Self {
        self.returning.push(SelectColumn::new(expression));
        self
    }

    /// Sets the logical statement identifier carried into the prepared SQL.
    pub fn identified_by(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Sets a caller-side statement option.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.set(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::builder::{column, raw, value};
    use crate::value::SqlValue;

    #[test]
    fn test_set_accepts_values_and_expressions() {
        let query = Update::new("t")
            .set("a", 1)
            .set("b", "text")
            .set("c", raw("? + 1", [5]))
            .set("d", value(2));

        assert_eq!(query.set.len(), 4);
        assert_eq!(query.set[0].1, Argument::Value(SqlValue::Int(1)));
        assert_eq!(query.set[1].1, Argument::Value(SqlValue::Text("text".into())));
        assert!(matches!(query.set[2].1, Argument::Expression(_)));
    }

    #[test]
    fn test_where_accumulates() {
        let query = Update::new("t")
            .set("a", 1)
            .and_where(column("id").compare("=", value(7)));
        assert_eq!(query.where_clause.conditions.len(), 1);
    }
}
