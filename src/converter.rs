//! Value conversion.
//!
//! Converts native values to SQL placeholder arguments and materializes
//! expressions for typed placeholders found in raw SQL fragments. The
//! converter is long-lived and shared; plugins are registered during setup
//! and the registry is read-only while renders are in flight.

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::error::{ConversionError, ConversionResult};
use crate::expression::Expression;
use crate::value::{Argument, SqlValue};

/// Converts values registered under specific SQL types.
///
/// Returning `Ok(None)` or any error makes the converter fall through to
/// the next candidate; only the built-in fallback surfaces errors.
pub trait InputConverter: Send + Sync {
    /// SQL types handled by this plugin; `*` matches every type.
    fn supported_types(&self) -> &[&'static str];

    /// Converts the value for the given SQL type.
    fn to_sql(&self, value: &SqlValue, sql_type: &str) -> ConversionResult<Option<SqlValue>>;
}

/// Guesses an SQL type from a native value when none was declared.
pub trait InputTypeGuesser: Send + Sync {
    fn guess_type(&self, value: &SqlValue) -> Option<String>;
}

/// Registry of conversion plugins, keyed by SQL type with a `*` wildcard.
#[derive(Default)]
pub struct ConverterPluginRegistry {
    converters: HashMap<String, Vec<Arc<dyn InputConverter>>>,
    guessers: Vec<Arc<dyn InputTypeGuesser>>,
}

impl ConverterPluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an input converter under every type it supports.
    pub fn register_converter(&mut self, plugin: Arc<dyn InputConverter>) {
        for sql_type in plugin.supported_types() {
            self.converters
                .entry((*sql_type).to_string())
                .or_default()
                .push(Arc::clone(&plugin));
        }
    }

    /// Registers a type guesser.
    pub fn register_guesser(&mut self, plugin: Arc<dyn InputTypeGuesser>) {
        self.guessers.push(plugin);
    }

    fn candidates(&self, sql_type: &str) -> impl Iterator<Item = &Arc<dyn InputConverter>> {
        self.converters
            .get(sql_type)
            .into_iter()
            .flatten()
            .chain(self.converters.get("*").into_iter().flatten())
    }
}

/// Class of a built-in SQL type, driving the fallback conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeClass {
    Int,
    Float,
    Bool,
    Text,
    Json,
    Blob,
}

lazy_static! {
    /// Built-in SQL type alias table used by the converter fallback.
    static ref TYPE_CLASSES: HashMap<&'static str, TypeClass> = {
        let mut table = HashMap::new();
        for alias in [
            "int", "integer", "int2", "int4", "int8", "smallint", "bigint", "serial",
            "bigserial",
        ] {
            table.insert(alias, TypeClass::Int);
        }
        for alias in [
            "float", "float4", "float8", "real", "double", "double precision", "decimal",
            "numeric",
        ] {
            table.insert(alias, TypeClass::Float);
        }
        for alias in ["bool", "boolean"] {
            table.insert(alias, TypeClass::Bool);
        }
        for alias in ["json", "jsonb"] {
            table.insert(alias, TypeClass::Json);
        }
        for alias in [
            "text", "varchar", "char", "character", "character varying", "string", "uuid",
            "date", "time", "timestamp", "timestamptz", "interval",
        ] {
            table.insert(alias, TypeClass::Text);
        }
        for alias in ["blob", "bytea", "binary", "varbinary"] {
            table.insert(alias, TypeClass::Blob);
        }
        table
    };
}

/// Value converter shared by every writer.
#[derive(Default)]
pub struct Converter {
    registry: ConverterPluginRegistry,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: ConverterPluginRegistry) -> Self {
        Self { registry }
    }

    /// Registers an input converter; setup-time only.
    pub fn register_converter(&mut self, plugin: Arc<dyn InputConverter>) {
        self.registry.register_converter(plugin);
    }

    /// Registers a type guesser; setup-time only.
    pub fn register_guesser(&mut self, plugin: Arc<dyn InputTypeGuesser>) {
        self.registry.register_guesser(plugin);
    }

    /// Materializes an expression for a raw-SQL placeholder argument.
    ///
    /// Expressions pass through untouched and null folds to the SQL `null`;
    /// otherwise the type hint picks the expression constructor:
    /// `array`, `column`, `identifier`, `row`, `table` and `value` map to
    /// their expression kinds, any other hint becomes a typed value, and no
    /// hint becomes an untyped value.
    pub fn to_expression(
        &self,
        argument: Argument,
        type_hint: Option<&str>,
    ) -> ConversionResult<Expression> {
        let value = match argument {
            Argument::Expression(expression) => return Ok(expression),
            Argument::Value(SqlValue::Null) => return Ok(Expression::Null),
            Argument::Value(value) => value,
        };

        match type_hint {
            Some("array") => Ok(Expression::Array {
                values: explode(value),
                value_type: None,
            }),
            Some("row") => Ok(Expression::Row {
                values: explode(value),
                cast_as: None,
            }),
            Some("column") => Ok(Expression::ColumnName {
                name: identifier_from(value, "a column name")?,
                table: None,
            }),
            Some("identifier") => Ok(Expression::Identifier {
                name: identifier_from(value, "an identifier")?,
                namespace: None,
            }),
            Some("table") => Ok(Expression::TableName {
                name: identifier_from(value, "a table name")?,
                schema: None,
            }),
            Some("value") | None => Ok(Expression::Value {
                value,
                type_hint: None,
            }),
            Some(other) => Ok(Expression::Value {
                value,
                type_hint: Some(other.to_string()),
            }),
        }
    }

    /// Converts a bound value into its driver-facing form.
    ///
    /// Used when an argument bag is drained before execution. Registered
    /// plugins are tried first (exact type, then the `*` wildcard); their
    /// failures are swallowed and only the built-in fallback may raise.
    pub fn to_sql(&self, value: &SqlValue, sql_type: Option<&str>) -> ConversionResult<SqlValue> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }

        let sql_type = match sql_type {
            Some(declared) => declared.to_string(),
            None => self.guess_type(value)?,
        };

        if sql_type.ends_with("[]") {
            return Err(ConversionError::UnsupportedArrayType(sql_type));
        }

        for plugin in self.registry.candidates(&sql_type) {
            if let Ok(Some(converted)) = plugin.to_sql(value, &sql_type) {
                return Ok(converted);
            }
        }

        builtin_to_sql(value, &sql_type)
    }

    fn guess_type(&self, value: &SqlValue) -> ConversionResult<String> {
        for guesser in &self.registry.guessers {
            if let Some(guessed) = guesser.guess_type(value) {
                return Ok(guessed);
            }
        }
        match value {
            SqlValue::List(_) => Err(ConversionError::UnsupportedArrayType(
                value.kind().to_string(),
            )),
            other => Ok(other.kind().to_string()),
        }
    }
}

/// Expands a list value into element expressions; scalars become a
/// single-element list.
fn explode(value: SqlValue) -> Vec<Expression> {
    match value {
        SqlValue::List(items) => items.into_iter().map(Expression::from).collect(),
        other => vec![Expression::from(other)],
    }
}

fn identifier_from(value: SqlValue, target: &'static str) -> ConversionResult<String> {
    value
        .identifier_string()
        .ok_or(ConversionError::NotAnIdentifier {
            kind: value.kind(),
            target,
        })
}

fn builtin_to_sql(value: &SqlValue, sql_type: &str) -> ConversionResult<SqlValue> {
    let class = match TYPE_CLASSES.get(sql_type) {
        Some(class) => *class,
        // Unknown types pass the value through untouched.
        None => return Ok(value.clone()),
    };

    let incompatible = || ConversionError::IncompatibleValue {
        kind: value.kind(),
        sql_type: sql_type.to_string(),
    };

    match class {
        TypeClass::Int => match value {
            SqlValue::Int(i) => Ok(SqlValue::Int(*i)),
            SqlValue::Float(f) => Ok(SqlValue::Int(*f as i64)),
            SqlValue::Bool(b) => Ok(SqlValue::Int(i64::from(*b))),
            SqlValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(SqlValue::Int)
                .map_err(|_| incompatible()),
            _ => Err(incompatible()),
        },
        TypeClass::Float => match value {
            SqlValue::Float(f) => Ok(SqlValue::Float(*f)),
            SqlValue::Int(i) => Ok(SqlValue::Float(*i as f64)),
            SqlValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(SqlValue::Float)
                .map_err(|_| incompatible()),
            _ => Err(incompatible()),
        },
        TypeClass::Bool => match value {
            SqlValue::Bool(b) => Ok(SqlValue::Text(b.to_string())),
            SqlValue::Int(i) => Ok(SqlValue::Text((*i != 0).to_string())),
            SqlValue::Text(s) => Ok(SqlValue::Text(s.clone())),
            _ => Err(incompatible()),
        },
        TypeClass::Json => match value {
            SqlValue::Text(s) => Ok(SqlValue::Text(s.clone())),
            other => serde_json::to_string(other)
                .map(SqlValue::Text)
                .map_err(|_| incompatible()),
        },
        TypeClass::Text => match value {
            SqlValue::Text(s) => Ok(SqlValue::Text(s.clone())),
            SqlValue::Int(i) => Ok(SqlValue::Text(i.to_string())),
            SqlValue::Float(f) => Ok(SqlValue::Text(f.to_string())),
            SqlValue::Bool(b) => Ok(SqlValue::Text(b.to_string())),
            SqlValue::Json(json) => serde_json::to_string(json)
                .map(SqlValue::Text)
                .map_err(|_| incompatible()),
            _ => Err(incompatible()),
        },
        TypeClass::Blob => match value {
            SqlValue::Blob(bytes) => Ok(SqlValue::Blob(bytes.clone())),
            SqlValue::Text(s) => Ok(SqlValue::Blob(s.clone().into_bytes())),
            _ => Err(incompatible()),
        },
    }
}
