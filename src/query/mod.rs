//! Query types.
//!
//! This module defines the clause-holder structs for the five statement
//! kinds and the shared clause types they are built from. Builders
//! accumulate clauses fluently and never render SQL themselves; rendering
//! happens when the query is handed to a writer.

pub mod delete;
pub mod insert;
pub mod merge;
pub mod select;
pub mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use merge::{ConflictMode, Merge};
pub use select::Select;
pub use update::Update;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::expression::Expression;

/// Boolean combinator of a [`Where`] clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolOp {
    #[default]
    And,
    Or,
}

impl BoolOp {
    /// Returns the SQL keyword for this combinator.
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Ordered list of conditions joined with `and` or `or`.
///
/// An empty clause renders as `1`; nested clauses that are themselves empty
/// are skipped while rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Where {
    pub operator: BoolOp,
    pub conditions: Vec<Expression>,
}

impl Where {
    /// Creates an empty `and`-joined clause.
    pub fn and() -> Self {
        Self {
            operator: BoolOp::And,
            conditions: Vec::new(),
        }
    }

    /// Creates an empty `or`-joined clause.
    pub fn or() -> Self {
        Self {
            operator: BoolOp::Or,
            conditions: Vec::new(),
        }
    }

    /// Appends an arbitrary condition expression.
    pub fn with(mut self, condition: impl Into<Expression>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Appends a condition in place.
    pub fn add(&mut self, condition: impl Into<Expression>) {
        self.conditions.push(condition.into());
    }

    /// Appends a `left operator right` comparison.
    pub fn condition(
        self,
        left: impl Into<Expression>,
        operator: impl Into<String>,
        right: impl Into<Expression>,
    ) -> Self {
        self.with(Expression::Comparison {
            left: Some(Box::new(left.into())),
            operator: Some(operator.into()),
            right: Some(Box::new(right.into())),
        })
    }

    /// Appends a `left = right` comparison.
    pub fn is_equal(self, left: impl Into<Expression>, right: impl Into<Expression>) -> Self {
        self.condition(left, "=", right)
    }

    /// Appends an `expr is null` condition.
    pub fn is_null(self, expression: impl Into<Expression>) -> Self {
        self.with(Expression::Comparison {
            left: Some(Box::new(expression.into())),
            operator: Some("is".to_string()),
            right: Some(Box::new(Expression::Null)),
        })
    }

    /// Appends an `expr is not null` condition.
    pub fn is_not_null(self, expression: impl Into<Expression>) -> Self {
        self.with(Expression::Comparison {
            left: Some(Box::new(expression.into())),
            operator: Some("is not".to_string()),
            right: Some(Box::new(Expression::Null)),
        })
    }

    /// Appends an `exists (query)` condition.
    pub fn exists(self, query: impl Into<Expression>) -> Self {
        self.with(Expression::Comparison {
            left: None,
            operator: Some("exists".to_string()),
            right: Some(Box::new(query.into())),
        })
    }

    /// Appends a `column between from and to` condition.
    pub fn between(
        self,
        column: impl Into<Expression>,
        from: impl Into<Expression>,
        to: impl Into<Expression>,
    ) -> Self {
        self.with(Expression::Between {
            column: Box::new(column.into()),
            from: Box::new(from.into()),
            to: Box::new(to.into()),
        })
    }

    /// Appends a nested clause, parenthesized while rendering.
    pub fn nested(mut self, inner: Where) -> Self {
        self.conditions.push(Expression::Where(inner));
        self
    }

    /// Checks whether the clause holds no effective condition.
    ///
    /// A clause containing only empty nested clauses is itself empty.
    pub fn is_empty(&self) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Expression::Where(nested) => nested.is_empty(),
            _ => false,
        })
    }
}

/// Join mode of a [`JoinStatement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    Inner,
    Left,
    LeftOuter,
    Right,
    RightOuter,
    Natural,
}

impl JoinMode {
    /// Returns the normalized SQL join keyword.
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Inner => "inner join",
            Self::Left | Self::LeftOuter => "left outer join",
            Self::Right | Self::RightOuter => "right outer join",
            Self::Natural => "natural join",
        }
    }

    /// Checks whether this mode may be promoted to a leading FROM/USING
    /// table in UPDATE and DELETE statements.
    pub const fn allows_promotion(&self) -> bool {
        matches!(self, Self::Inner | Self::Natural)
    }
}

/// A join clause: mode, joined table and condition.
///
/// An empty condition renders as `cross join`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinStatement {
    pub mode: JoinMode,
    pub table: Expression,
    pub condition: Where,
}

impl JoinStatement {
    pub fn new(mode: JoinMode, table: impl Into<Expression>, condition: Where) -> Self {
        Self {
            mode,
            table: table.into(),
            condition,
        }
    }
}

/// A single `with "alias" as (…)` clause element.
#[derive(Debug, Clone, PartialEq)]
pub struct WithStatement {
    pub alias: String,
    pub expression: Expression,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Null-placement of an ORDER BY item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullsPlacement {
    #[default]
    Default,
    First,
    Last,
}

/// A single ORDER BY item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByStatement {
    pub column: Expression,
    pub direction: OrderDirection,
    pub nulls: NullsPlacement,
}

impl OrderByStatement {
    pub fn new(column: impl Into<Expression>, direction: OrderDirection) -> Self {
        Self {
            column: column.into(),
            direction,
            nulls: NullsPlacement::Default,
        }
    }

    pub fn with_nulls(mut self, nulls: NullsPlacement) -> Self {
        self.nulls = nulls;
        self
    }
}

/// A projected column with an optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expression: Expression,
    pub alias: Option<String>,
}

impl SelectColumn {
    pub fn new(expression: impl Into<Expression>) -> Self {
        Self {
            expression: expression.into(),
            alias: None,
        }
    }

    pub fn aliased(expression: impl Into<Expression>, alias: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            alias: Some(alias.into()),
        }
    }
}

/// Window specification, optionally named so it can be declared in a
/// SELECT `window` clause and referenced by aggregates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Window {
    pub partition_by: Vec<Expression>,
    pub order_by: Vec<OrderByStatement>,
    pub alias: Option<String>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a PARTITION BY expression.
    pub fn partition_by(mut self, expression: impl Into<Expression>) -> Self {
        self.partition_by.push(expression.into());
        self
    }

    /// Appends an ORDER BY item.
    pub fn order_by(mut self, column: impl Into<Expression>, direction: OrderDirection) -> Self {
        self.order_by.push(OrderByStatement::new(column, direction));
        self
    }

    /// Names the window for declaration in a SELECT `window` clause.
    pub fn named(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// Caller-side statement options carried from a query into the prepared
/// [`SqlString`](crate::writer::SqlString). The writer never reads them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QueryOptions(BTreeMap<String, String>);

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
