//! Expression algebra.
//!
//! This module defines the closed set of expression nodes forming the SQL
//! AST. A tree of `Expression` values is handed to a writer, which renders
//! it into dialect-specific SQL. Expressions are immutable once handed over;
//! embedding the same subquery in several places is done by cloning it.

pub mod builder;

use crate::query::{Delete, Insert, Merge, Select, Update, Where, Window};
use crate::value::{Argument, SqlValue};

/// Node of the SQL AST.
///
/// Every node can be formatted by a writer and reports whether evaluating it
/// produces a value (see [`Expression::returns`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// SQL `null`
    Null,
    /// A bound value, emitted as a placeholder
    Value {
        value: SqlValue,
        type_hint: Option<String>,
    },
    /// Parenthesized comma list, optionally cast as a composite type
    Row {
        values: Vec<Expression>,
        cast_as: Option<String>,
    },
    /// `array[…]` literal, optionally cast to `T[]`
    Array {
        values: Vec<Expression>,
        value_type: Option<String>,
    },
    /// Arbitrary identifier, quoted by the escaper
    Identifier {
        name: String,
        namespace: Option<String>,
    },
    /// Column reference; `*` is special-cased and never quoted
    ColumnName {
        name: String,
        table: Option<String>,
    },
    /// Table reference
    TableName {
        name: String,
        schema: Option<String>,
    },
    /// User-supplied SQL fragment, subject to placeholder parsing
    Raw {
        template: String,
        arguments: Vec<Argument>,
    },
    /// Like `Raw` but flagged as a full statement (forces parenthesization
    /// in sub-positions)
    RawQuery {
        template: String,
        arguments: Vec<Argument>,
    },
    /// `inner as "alias"`
    Aliased {
        inner: Box<Expression>,
        alias: String,
    },
    /// `left operator right`; missing parts are omitted
    Comparison {
        left: Option<Box<Expression>>,
        operator: Option<String>,
        right: Option<Box<Expression>>,
    },
    /// `column between from and to`
    Between {
        column: Box<Expression>,
        from: Box<Expression>,
        to: Box<Expression>,
    },
    /// `not (inner)`, always parenthesized
    Not(Box<Expression>),
    /// `case when … then … else … end`; degenerates to the fallback when
    /// there are no cases
    CaseWhen {
        cases: Vec<(Expression, Expression)>,
        fallback: Option<Box<Expression>>,
    },
    /// Single condition/branch pair, rendered by reduction to `CaseWhen`
    IfThen {
        condition: Box<Expression>,
        then: Box<Expression>,
    },
    /// String concatenation, `||` separated by default
    Concat(Vec<Expression>),
    /// `cast(inner as type)`
    Cast {
        inner: Box<Expression>,
        as_type: String,
    },
    /// Arbitrary function call; the name is identifier-escaped only when it
    /// contains non-alphanumeric characters
    FunctionCall {
        name: String,
        arguments: Vec<Expression>,
    },
    /// Aggregate call with optional FILTER clause and OVER window
    Aggregate {
        function: String,
        column: Option<Box<Expression>>,
        filter: Where,
        over: Option<Window>,
    },
    /// Standalone window specification
    Window(Window),
    /// `current_timestamp`
    CurrentTimestamp,
    /// `random()`
    Random,
    /// Random integer in `[min, max]`; bounds are swapped when reversed
    RandomInt { min: i64, max: i64 },
    /// `column like 'pattern'` with the value LIKE-escaped into the template
    LikePattern(PatternMatch),
    /// `column similar to 'pattern'`
    SimilarToPattern(PatternMatch),
    /// `values (…), (…)` literal table
    ConstantTable(ConstantTable),
    /// Boolean condition list joined with `and` / `or`
    Where(Where),
    /// Full SELECT statement
    Select(Box<Select>),
    /// Full INSERT statement
    Insert(Box<Insert>),
    /// Full UPDATE statement
    Update(Box<Update>),
    /// Full DELETE statement
    Delete(Box<Delete>),
    /// Full MERGE statement
    Merge(Box<Merge>),
}

/// LIKE/SIMILAR TO pattern specification.
///
/// The raw value, when present, is LIKE-escaped by the dialect escaper and
/// substituted for the `?` marker in the pattern template before the whole
/// pattern is literal-escaped.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub column: Option<Box<Expression>>,
    pub pattern: String,
    pub value: Option<String>,
    pub reserved_chars: Option<String>,
    pub case_sensitive: bool,
}

/// `values (…), (…)` literal table, usable in FROM, INSERT and MERGE.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstantTable {
    pub rows: Vec<Vec<Expression>>,
    pub columns: Vec<String>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row of values.
    pub fn row<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        self.rows.push(values.into_iter().map(Into::into).collect());
        self
    }

    /// Declares the column names exposed when the table is aliased.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

impl Expression {
    /// Reports whether evaluating this expression produces a value.
    pub fn returns(&self) -> bool {
        match self {
            Self::Window(_) => false,
            Self::TableName { .. } => false,
            Self::Insert(insert) => !insert.returning.is_empty(),
            Self::Update(update) => !update.returning.is_empty(),
            Self::Delete(delete) => !delete.returning.is_empty(),
            Self::Merge(merge) => !merge.returning.is_empty(),
            _ => true,
        }
    }

    /// Returns the variant name, used in error messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Value { .. } => "value",
            Self::Row { .. } => "row",
            Self::Array { .. } => "array",
            Self::Identifier { .. } => "identifier",
            Self::ColumnName { .. } => "column",
            Self::TableName { .. } => "table",
            Self::Raw { .. } => "raw",
            Self::RawQuery { .. } => "raw query",
            Self::Aliased { .. } => "aliased",
            Self::Comparison { .. } => "comparison",
            Self::Between { .. } => "between",
            Self::Not(_) => "not",
            Self::CaseWhen { .. } => "case when",
            Self::IfThen { .. } => "if then",
            Self::Concat(_) => "concat",
            Self::Cast { .. } => "cast",
            Self::FunctionCall { .. } => "function call",
            Self::Aggregate { .. } => "aggregate",
            Self::Window(_) => "window",
            Self::CurrentTimestamp => "current timestamp",
            Self::Random => "random",
            Self::RandomInt { .. } => "random int",
            Self::LikePattern(_) => "like pattern",
            Self::SimilarToPattern(_) => "similar to pattern",
            Self::ConstantTable(_) => "constant table",
            Self::Where(_) => "where",
            Self::Select(_) => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::Merge(_) => "merge",
        }
    }

    /// Wraps this expression under an alias.
    ///
    /// An already aliased expression gets its alias replaced instead of
    /// being wrapped twice.
    pub fn with_alias(self, alias: impl Into<String>) -> Self {
        match self {
            Self::Aliased { inner, .. } => Self::Aliased {
                inner,
                alias: alias.into(),
            },
            other => Self::Aliased {
                inner: Box::new(other),
                alias: alias.into(),
            },
        }
    }

    /// Wraps this expression in a `cast(… as type)`.
    pub fn cast_as(self, as_type: impl Into<String>) -> Self {
        Self::Cast {
            inner: Box::new(self),
            as_type: as_type.into(),
        }
    }

    /// Negates this expression with forced parentheses.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Builds a `self operator other` comparison.
    pub fn compare(self, operator: impl Into<String>, other: impl Into<Expression>) -> Self {
        Self::Comparison {
            left: Some(Box::new(self)),
            operator: Some(operator.into()),
            right: Some(Box::new(other.into())),
        }
    }
}

impl From<SqlValue> for Expression {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Self::Null,
            other => Self::Value {
                value: other,
                type_hint: None,
            },
        }
    }
}

impl From<Select> for Expression {
    fn from(select: Select) -> Self {
        Self::Select(Box::new(select))
    }
}

impl From<Insert> for Expression {
    fn from(insert: Insert) -> Self {
        Self::Insert(Box::new(insert))
    }
}

impl From<Update> for Expression {
    fn from(update: Update) -> Self {
        Self::Update(Box::new(update))
    }
}

impl From<Delete> for Expression {
    fn from(delete: Delete) -> Self {
        Self::Delete(Box::new(delete))
    }
}

impl From<Merge> for Expression {
    fn from(merge: Merge) -> Self {
        Self::Merge(Box::new(merge))
    }
}

impl From<Where> for Expression {
    fn from(where_clause: Where) -> Self {
        Self::Where(where_clause)
    }
}

impl From<ConstantTable> for Expression {
    fn from(table: ConstantTable) -> Self {
        Self::ConstantTable(table)
    }
}

#[cfg(test)]
mod tests {
    use super::builder::{column, select, table, value};
    use super::*;

    #[test]
    fn test_returns_for_scalar_nodes() {
        assert!(Expression::Null.returns());
        assert!(value(1).returns());
        assert!(column("a").returns());
        assert!(Expression::CurrentTimestamp.returns());
    }

    #[test]
    fn test_returns_for_non_value_nodes() {
        assert!(!table("t").returns());
        assert!(!Expression::Window(Window::default()).returns());
    }

    #[test]
    fn test_returns_follows_returning_clause() {
        let plain = crate::query::Delete::new("t");
        assert!(!Expression::from(plain).returns());

        let with_returning = crate::query::Delete::new("t").returning(column("id"));
        assert!(Expression::from(with_returning).returns());
    }

    #[test]
    fn test_with_alias_replaces_existing_alias() {
        let aliased = column("a").with_alias("x").with_alias("y");
        match aliased {
            Expression::Aliased { inner, alias } => {
                assert_eq!(alias, "y");
                assert_eq!(*inner, column("a"));
            }
            other => panic!("expected aliased expression, got {other:?}"),
        }
    }

    #[test]
    fn test_select_into_expression() {
        let expr: Expression = select().into();
        assert_eq!(expr.kind_name(), "select");
    }

    #[test]
    fn test_null_value_folds_to_null() {
        assert_eq!(Expression::from(SqlValue::Null), Expression::Null);
    }
}
