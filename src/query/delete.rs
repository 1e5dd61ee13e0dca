//! DELETE query builder.

use super::{JoinMode, JoinStatement, QueryOptions, SelectColumn, Where, WithStatement};
use crate::expression::builder::table;
use crate::expression::Expression;

/// Fluent DELETE builder.
///
/// Extra tables land in the USING clause; the first join is promoted to
/// USING while rendering, its condition pushed into WHERE. A missing table
/// is a structural error at render time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Delete {
    pub with: Vec<WithStatement>,
    pub table: Option<Expression>,
    pub using: Vec<Expression>,
    pub joins: Vec<JoinStatement>,
    pub where_clause: Where,
    pub returning: Vec<SelectColumn>,
    pub identifier: Option<String>,
    pub options: QueryOptions,
}

impl Delete {
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

    /// Adds a USING table.
    pub fn using(mut self, expression: impl Into<Expression>) -> Self {
        self.using.push(expression.into());
        self
    }

    /// Adds a join; the first join is promoted to USING while rendering and
    /// must be INNER or NATURAL.
    pub fn join(mut self, mode: JoinMode, table: impl Into<Expression>, condition: Where) -> Self {
        self.joins.push(JoinStatement::new(mode, table, condition));
        self
    }

    /// Adds an inner join.
    pub fn join_inner(self, table: impl Into<Expression>, condition: Where) -> Self {
        self.join(JoinMode::Inner, table, condition)
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
    use crate::expression::builder::{column, table_column};

    #[test]
    fn test_join_accumulates() {
        let condition = Where::and().is_equal(column("t.id"), table_column("u", "t_id"));
        let query = Delete::new("t").join_inner(table("u"), condition);
        assert_eq!(query.joins.len(), 1);
        assert_eq!(query.joins[0].mode, JoinMode::Inner);
    }
}
