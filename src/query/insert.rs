//! INSERT query builder.

use super::{QueryOptions, SelectColumn, WithStatement};
use crate::expression::builder::table;
use crate::expression::{ConstantTable, Expression};
use crate::value::SqlValue;

/// Fluent INSERT builder.
///
/// The source is either a [`ConstantTable`] accumulated through
/// [`Insert::values`] or an arbitrary query set with [`Insert::query`].
/// Without columns and with an empty constant table source, rendering emits
/// the dialect's "insert default values" form. A missing table is a
/// structural error at render time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Insert {
    pub with: Vec<WithStatement>,
    pub table: Option<Expression>,
    pub columns: Vec<String>,
    pub source: Option<Expression>,
    pub returning: Vec<SelectColumn>,
    pub identifier: Option<String>,
    pub options: QueryOptions,
}

impl Insert {
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

    /// Declares the inserted column names.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Appends one row of values to the constant-table source.
    ///
    /// Calling this after [`Insert::query`] replaces the query source with
    /// a constant table.
    pub fn values<I>(mut self, row: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        let expressions: Vec<Expression> = row
            .into_iter()
            .map(|value| Expression::from(value.into()))
            .collect();
        match self.source {
            Some(Expression::ConstantTable(ref mut constant)) => {
                constant.rows.push(expressions);
            }
            _ => {
                self.source = Some(Expression::ConstantTable(
                    ConstantTable::new().row(expressions),
                ));
            }
        }
        self
    }

    /// Sets an arbitrary source, typically a [`ConstantTable`] or a SELECT.
    pub fn query(mut self, source: impl Into<Expression>) -> Self {
        self.source = Some(source.into());
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

    #[test]
    fn test_values_accumulate_constant_table_rows() {
        let query = Insert::new("t").columns(["a", "b"]).values([1, 2]).values([3, 4]);
        match query.source {
            Some(Expression::ConstantTable(ref constant)) => {
                assert_eq!(constant.rows.len(), 2)
            }
            ref other => panic!("expected constant table source, got {other:?}"),
        }
    }

    #[test]
    fn test_query_source_replaces_values() {
        let query = Insert::new("t")
            .values([1])
            .query(crate::query::Select::new());
        assert!(matches!(query.source, Some(Expression::Select(_))));
    }
}
