//! Error type definitions
//!
//! Defines all error types used in queryforge.

use thiserror::Error;

/// Errors that occur while converting native values for a database driver
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Cannot convert value of kind '{kind}' to SQL type '{sql_type}'")]
    IncompatibleValue { kind: &'static str, sql_type: String },

    #[error("Array types are not supported: '{0}'")]
    UnsupportedArrayType(String),

    #[error("Cannot guess an SQL type for value of kind '{0}'")]
    UnknownValueKind(&'static str),

    #[error("Value of kind '{kind}' cannot be used as {target}")]
    NotAnIdentifier { kind: &'static str, target: &'static str },
}

/// Errors that occur while formatting an expression tree into SQL
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryBuilderError {
    #[error("Missing table in {statement} statement")]
    MissingTable { statement: &'static str },

    #[error("Update query has no SET clause")]
    EmptySetClause,

    #[error("Function call has no function name")]
    MissingFunctionName,

    #[error("First join of a {statement} query must be INNER or NATURAL, got '{mode}'")]
    IllegalJoinPromotion {
        statement: &'static str,
        mode: String,
    },

    #[error("Unknown merge conflict behavior: '{0}'")]
    UnknownConflictMode(String),

    #[error("Merge query has no USING source")]
    MissingMergeSource,

    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("'{feature}' is not supported by the {dialect} dialect")]
    UnsupportedFeature {
        feature: &'static str,
        dialect: &'static str,
    },

    #[error("Value conversion error: {0}")]
    Conversion(#[from] ConversionError),
}

/// Result type aliases
pub type ConversionResult<T> = Result<T, ConversionError>;
pub type QueryBuilderResult<T> = Result<T, QueryBuilderError>;
