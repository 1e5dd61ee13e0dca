//! Per-render state: argument bag, writer context and the prepared result.

use std::fmt;

use serde::Serialize;

use crate::converter::Converter;
use crate::error::ConversionResult;
use crate::expression::Expression;
use crate::query::QueryOptions;
use crate::value::{Argument, SqlValue};

/// Ordered, append-only collection of bound values with optional type tags.
///
/// Appending yields a monotonically increasing 0-based index; the writer
/// uses that index immediately to emit the dialect placeholder, so argument
/// order always matches placeholder order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ArgumentBag {
    arguments: Vec<(SqlValue, Option<String>)>,
}

impl ArgumentBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value and returns its assigned index.
    pub fn add(&mut self, value: SqlValue, type_hint: Option<String>) -> usize {
        self.arguments.push((value, type_hint));
        self.arguments.len() - 1
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Ordered iteration over `(value, optional type)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&SqlValue, Option<&str>)> {
        self.arguments
            .iter()
            .map(|(value, hint)| (value, hint.as_deref()))
    }

    /// The bound values without their type tags.
    pub fn values(&self) -> Vec<&SqlValue> {
        self.arguments.iter().map(|(value, _)| value).collect()
    }

    /// Drains the bag into driver-facing values through the converter.
    pub fn to_driver_values(&self, converter: &Converter) -> ConversionResult<Vec<SqlValue>> {
        self.iter()
            .map(|(value, hint)| converter.to_sql(value, hint))
            .collect()
    }
}

/// Per-format scratch carrying the argument bag and the shared converter.
///
/// Lives exactly for the duration of one `prepare` call.
pub struct WriterContext<'a> {
    arguments: ArgumentBag,
    converter: &'a Converter,
}

impl<'a> WriterContext<'a> {
    pub fn new(converter: &'a Converter) -> Self {
        Self {
            arguments: ArgumentBag::new(),
            converter,
        }
    }

    /// Appends a bound value, returning the assigned 0-based index.
    pub fn append(&mut self, value: SqlValue, type_hint: Option<String>) -> usize {
        self.arguments.add(value, type_hint)
    }

    pub fn converter(&self) -> &'a Converter {
        self.converter
    }

    pub fn arguments(&self) -> &ArgumentBag {
        &self.arguments
    }

    pub(crate) fn into_arguments(self) -> ArgumentBag {
        self.arguments
    }
}

/// A rendered statement: SQL text plus its bound arguments.
///
/// `identifier` is the query's logical name for caller-side statement
/// caching; `options` carries the query's caller-side options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlString {
    pub text: String,
    pub arguments: ArgumentBag,
    pub identifier: Option<String>,
    pub options: QueryOptions,
}

impl SqlString {
    pub fn new(text: String, arguments: ArgumentBag) -> Self {
        Self {
            text,
            arguments,
            identifier: None,
            options: QueryOptions::new(),
        }
    }

    /// Re-wraps the rendered SQL as a raw query expression.
    ///
    /// Preparing the result again yields the same SQL text and argument
    /// vector: each placeholder consumes the matching bound value, type tag
    /// preserved.
    pub fn to_expression(&self) -> Expression {
        Expression::RawQuery {
            template: self.text.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|(value, hint)| {
                    Argument::Expression(Expression::Value {
                        value: value.clone(),
                        type_hint: hint.map(str::to_string),
                    })
                })
                .collect(),
        }
    }
}

impl fmt::Display for SqlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
