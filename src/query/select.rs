//! SELECT query builder.

use super::{
    JoinMode, JoinStatement, OrderByStatement, OrderDirection, QueryOptions, SelectColumn, Where,
    Window, WithStatement,
};
use crate::expression::Expression;

/// Fluent SELECT builder.
///
/// Accumulates clauses without rendering anything; hand the finished value
/// to a writer's `prepare` to obtain SQL and bound arguments.
///
/// # Examples
///
/// ```rust
/// use queryforge::{expression::builder::{column, select, table, value}, StandardWriter, SqlWriter};
///
/// let query = select()
///     .column(column("a"))
///     .from(table("t"))
///     .and_where(column("a").compare("=", value(1)));
///
/// let prepared = StandardWriter::default().prepare(query.into()).unwrap();
/// assert_eq!(prepared.text, "select \"a\"\nfrom \"t\"\nwhere \"a\" = ?");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    pub with: Vec<WithStatement>,
    pub distinct: bool,
    pub columns: Vec<SelectColumn>,
    pub from: Vec<Expression>,
    pub joins: Vec<JoinStatement>,
    pub where_clause: Where,
    pub group_by: Vec<Expression>,
    pub having: Where,
    pub windows: Vec<Window>,
    pub order_by: Vec<OrderByStatement>,
    pub limit: u64,
    pub offset: u64,
    pub unions: Vec<Expression>,
    pub for_update: bool,
    pub identifier: Option<String>,
    pub options: QueryOptions,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a CTE under the given alias.
    pub fn with(mut self, alias: impl Into<String>, expression: impl Into<Expression>) -> Self {
        self.with.push(WithStatement {
            alias: alias.into(),
            expression: expression.into(),
        });
        self
    }

    /// Marks the projection as DISTINCT.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a projected column.
    pub fn column(mut self, expression: impl Into<Expression>) -> Self {
        self.columns.push(SelectColumn::new(expression));
        self
    }

    /// Adds a projected column under an alias.
    pub fn column_as(
        mut self,
        expression: impl Into<Expression>,
        alias: impl Into<String>,
    ) -> Self {
        self.columns.push(SelectColumn::aliased(expression, alias));
        self
    }

    /// Adds a FROM table or subquery.
    pub fn from(mut self, expression: impl Into<Expression>) -> Self {
        self.from.push(expression.into());
        self
    }

    /// Adds a join.
    pub fn join(mut self, mode: JoinMode, table: impl Into<Expression>, condition: Where) -> Self {
        self.joins.push(JoinStatement::new(mode, table, condition));
        self
    }

    /// Adds an inner join.
    pub fn join_inner(self, table: impl Into<Expression>, condition: Where) -> Self {
        self.join(JoinMode::Inner, table, condition)
    }

    /// Adds a left outer join.
    pub fn join_left(self, table: impl Into<Expression>, condition: Where) -> Self {
        self.join(JoinMode::Left, table, condition)
    }

    /// AND-combines a condition into the WHERE clause.
    pub fn and_where(mut self, condition: impl Into<Expression>) -> Self {
        self.where_clause.add(condition);
        self
    }

    /// Adds a nested OR group to the WHERE clause.
    pub fn or_where(mut self, conditions: Where) -> Self {
        self.where_clause
            .add(Expression::Where(Where {
                operator: super::BoolOp::Or,
                conditions: conditions.conditions,
            }));
        self
    }

    /// Adds a GROUP BY expression.
    pub fn group_by(mut self, expression: impl Into<Expression>) -> Self {
        self.group_by.push(expression.into());
        self
    }

    /// AND-combines a condition into the HAVING clause.
    pub fn having(mut self, condition: impl Into<Expression>) -> Self {
        self.having.add(condition);
        self
    }

    /// Declares a named window usable by aggregates via `over`.
    pub fn window(mut self, window: Window) -> Self {
        self.windows.push(window);
        self
    }

    /// Adds an ORDER BY item.
    pub fn order_by(mut self, column: impl Into<Expression>, direction: OrderDirection) -> Self {
        self.order_by.push(OrderByStatement::new(column, direction));
        self
    }

    /// Adds a fully specified ORDER BY item.
    pub fn order_by_statement(mut self, statement: OrderByStatement) -> Self {
        self.order_by.push(statement);
        self
    }

    /// Sets LIMIT and OFFSET at once; `0` disables either side.
    pub fn range(mut self, limit: u64, offset: u64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Sets the LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the OFFSET.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Appends a UNION branch.
    pub fn union(mut self, query: impl Into<Expression>) -> Self {
        self.unions.push(query.into());
        self
    }

    /// Appends `for update` to the statement.
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
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
    use crate::expression::builder::{column, table, value};

    #[test]
    fn test_builder_accumulates_clauses() {
        let query = Select::new()
            .column(column("a"))
            .column_as(column("b"), "bee")
            .from(table("t"))
            .and_where(column("a").compare(">", value(1)))
            .group_by(column("a"))
            .order_by(column("a"), OrderDirection::Desc)
            .range(10, 5);

        assert_eq!(query.columns.len(), 2);
        assert_eq!(query.columns[1].alias.as_deref(), Some("bee"));
        assert_eq!(query.from.len(), 1);
        assert!(!query.where_clause.is_empty());
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset, 5);
    }

    #[test]
    fn test_builder_never_renders() {
        // Building without from or columns is legal; rendering decides defaults.
        let query = Select::new();
        assert!(query.columns.is_empty());
        assert!(query.from.is_empty());
    }
}
