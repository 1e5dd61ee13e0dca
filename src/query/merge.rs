//! MERGE query builder.

use super::{QueryOptions, SelectColumn, WithStatement};
use crate::error::{QueryBuilderError, QueryBuilderResult};
use crate::expression::builder::table;
use crate::expression::{ConstantTable, Expression};
use crate::value::SqlValue;

/// Behavior when a USING row matches an existing target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictMode {
    /// Matched rows are left untouched (the matched branch is omitted)
    #[default]
    Ignore,
    /// Matched rows get their non-key columns updated from the USING alias
    Update,
}

impl ConflictMode {
    /// Resolves a conflict mode from its textual tag.
    pub fn from_tag(tag: &str) -> QueryBuilderResult<Self> {
        match tag {
            "ignore" => Ok(Self::Ignore),
            "update" => Ok(Self::Update),
            other => Err(QueryBuilderError::UnknownConflictMode(other.to_string())),
        }
    }
}

/// Fluent MERGE builder.
///
/// Renders `merge into … using (…) as alias on (…)` with the branch pair
/// driven by the conflict mode. Key columns define the match condition and
/// are excluded from the matched-branch update list.
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    pub with: Vec<WithStatement>,
    pub table: Expression,
    pub columns: Vec<String>,
    pub key: Vec<String>,
    pub using: Option<Expression>,
    pub using_alias: String,
    pub conflict: ConflictMode,
    pub returning: Vec<SelectColumn>,
    pub identifier: Option<String>,
    pub options: QueryOptions,
}

impl Merge {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            with: Vec::new(),
            table: table(table_name),
            columns: Vec::new(),
            key: Vec::new(),
            using: None,
            using_alias: "upsert".to_string(),
            conflict: ConflictMode::Ignore,
            returning: Vec::new(),
            identifier: None,
            options: QueryOptions::new(),
        }
    }

    /// Adds a CTE under the given alias.
    pub fn with(mut self, alias: impl Into<String>, expression: impl Into<Expression>) -> Self {
        self.with.push(WithStatement {
            alias: alias.into(),
            expression: expression.into(),
        });
        self
    }

    /// Declares the merged column names.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Declares the key columns driving the match condition.
    pub fn key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Sets the USING source and its alias.
    pub fn using(mut self, source: impl Into<Expression>, alias: impl Into<String>) -> Self {
        self.using = Some(source.into());
        self.using_alias = alias.into();
        self
    }

    /// Appends one row of values to a constant-table USING source.
    pub fn values<I>(mut self, row: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        let expressions: Vec<Expression> = row
            .into_iter()
            .map(|value| Expression::from(value.into()))
            .collect();
        match self.using {
            Some(Expression::ConstantTable(ref mut constant)) => {
                constant.rows.push(expressions);
            }
            _ => {
                self.using = Some(Expression::ConstantTable(
                    ConstantTable::new().row(expressions),
                ));
            }
        }
        self
    }

    /// Leaves matched rows untouched.
    pub fn on_conflict_ignore(mut self) -> Self {
        self.conflict = ConflictMode::Ignore;
        self
    }

    /// Updates matched rows from the USING alias.
    pub fn on_conflict_update(mut self) -> Self {
        self.conflict = ConflictMode::Update;
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
