//! Native value model
//!
//! Defines the value types that can be bound as query arguments and the
//! `Argument` payload accepted by raw SQL fragments.

use serde::Serialize;

use crate::expression::Expression;

/// A native value bound into a query.
///
/// Values never end up inlined in SQL text; the writer appends them to the
/// argument bag and emits a placeholder instead. The `Json` variant carries
/// an arbitrary document serialized by the converter before execution, and
/// `List` carries array-ish payloads routed through the converter.
///
/// # Examples
///
/// ```rust
/// use queryforge::SqlValue;
///
/// let v: SqlValue = 42.into();
/// assert_eq!(v, SqlValue::Int(42));
///
/// let v: SqlValue = "hello".into();
/// assert_eq!(v, SqlValue::Text("hello".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Json(serde_json::Value),
    List(Vec<SqlValue>),
}

impl SqlValue {
    /// Returns a short tag describing the value kind, used in error messages
    /// and as the fallback type guess.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Json(_) => "json",
            Self::List(_) => "list",
        }
    }

    /// Checks if this is the SQL null value.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as an identifier-ish string, for converter hints
    /// such as `column` or `table` that expect a name rather than a value.
    pub(crate) fn identifier_string(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl SqlValue {
    /// Builds a list value from native elements.
    pub fn list<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Positional argument of a raw SQL fragment.
///
/// A raw placeholder consumes either a native value (which becomes a bound
/// placeholder) or a readily built expression (formatted in place).
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Value(SqlValue),
    Expression(Expression),
}

impl Argument {
    /// Checks if the argument carries the SQL null value.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Value(SqlValue::Null))
    }
}

macro_rules! argument_from_value {
    ($($native:ty),* $(,)?) => {
        $(
            impl From<$native> for Argument {
                fn from(value: $native) -> Self {
                    Self::Value(value.into())
                }
            }
        )*
    };
}

argument_from_value!(
    bool,
    i32,
    i64,
    u32,
    f64,
    &str,
    String,
    Vec<u8>,
    serde_json::Value,
    SqlValue,
);

impl<T: Into<SqlValue>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        Self::Value(value.into())
    }
}

impl From<Expression> for Argument {
    fn from(expression: Expression) -> Self {
        Self::Expression(expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind_tags() {
        assert_eq!(SqlValue::Null.kind(), "null");
        assert_eq!(SqlValue::Bool(true).kind(), "bool");
        assert_eq!(SqlValue::Int(1).kind(), "int");
        assert_eq!(SqlValue::Float(1.5).kind(), "float");
        assert_eq!(SqlValue::Text("a".into()).kind(), "text");
        assert_eq!(SqlValue::Blob(vec![0x01]).kind(), "blob");
        assert_eq!(SqlValue::List(vec![]).kind(), "list");
    }

    #[test]
    fn test_from_native_types() {
        assert_eq!(SqlValue::from(7), SqlValue::Int(7));
        assert_eq!(SqlValue::from(7i64), SqlValue::Int(7));
        assert_eq!(SqlValue::from(2.5), SqlValue::Float(2.5));
        assert_eq!(SqlValue::from(false), SqlValue::Bool(false));
        assert_eq!(SqlValue::from("x"), SqlValue::Text("x".to_string()));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(3)), SqlValue::Int(3));
    }

    #[test]
    fn test_list_constructor() {
        assert_eq!(
            SqlValue::list([1, 2]),
            SqlValue::List(vec![SqlValue::Int(1), SqlValue::Int(2)])
        );
    }

    #[test]
    fn test_argument_null_detection() {
        assert!(Argument::from(None::<i32>).is_null());
        assert!(!Argument::from(0).is_null());
    }

    #[test]
    fn test_identifier_string() {
        assert_eq!(
            SqlValue::Text("users".into()).identifier_string(),
            Some("users".to_string())
        );
        assert_eq!(SqlValue::Null.identifier_string(), None);
        assert_eq!(SqlValue::Blob(vec![]).identifier_string(), None);
    }
}
