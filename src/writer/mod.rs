//! SQL writer.
//!
//! Recursive dispatch over the expression tree producing dialect-correct
//! SQL. The [`SqlWriter`] trait carries the standard SQL-92/PostgreSQL
//! rendering as provided methods; dialect writers implement the accessors
//! and re-implement only the hooks they diverge on.

pub mod context;
pub mod dialect;
pub mod placeholder;

pub use context::{ArgumentBag, SqlString, WriterContext};
pub use dialect::{MariaDBWriter, MySQLWriter, SQLServerWriter, SQLiteWriter};

use crate::converter::Converter;
use crate::error::{QueryBuilderError, QueryBuilderResult};
use crate::escaper::{Escaper, StandardEscaper};
use crate::expression::{ConstantTable, Expression, PatternMatch};
use crate::query::{
    Delete, Insert, JoinStatement, Merge, OrderByStatement, NullsPlacement, QueryOptions, Select,
    SelectColumn, Update, Where, Window, WithStatement,
};
use crate::value::{Argument, SqlValue};
use placeholder::{PlaceholderParser, RawToken};

/// Input accepted by [`SqlWriter::prepare`].
#[derive(Debug, Clone)]
pub enum QueryInput {
    /// Raw SQL text, promoted to a `Raw` expression without arguments
    Text(String),
    /// Any expression tree
    Expression(Expression),
    /// An already prepared statement, returned as-is
    Prepared(SqlString),
}

impl From<&str> for QueryInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Expression> for QueryInput {
    fn from(expression: Expression) -> Self {
        Self::Expression(expression)
    }
}

impl From<SqlString> for QueryInput {
    fn from(prepared: SqlString) -> Self {
        Self::Prepared(prepared)
    }
}

impl From<Select> for QueryInput {
    fn from(query: Select) -> Self {
        Self::Expression(query.into())
    }
}

impl From<Insert> for QueryInput {
    fn from(query: Insert) -> Self {
        Self::Expression(query.into())
    }
}

impl From<Update> for QueryInput {
    fn from(query: Update) -> Self {
        Self::Expression(query.into())
    }
}

impl From<Delete> for QueryInput {
    fn from(query: Delete) -> Self {
        Self::Expression(query.into())
    }
}

impl From<Merge> for QueryInput {
    fn from(query: Merge) -> Self {
        Self::Expression(query.into())
    }
}

/// Checks whether the expression class is parenthesized under enforced
/// parenthesization.
fn needs_parens(expression: &Expression) -> bool {
    matches!(
        expression,
        Expression::ConstantTable(_)
            | Expression::RawQuery { .. }
            | Expression::Select(_)
            | Expression::Where(_)
    )
}

/// Checks whether an UPDATE SET value is rendered parenthesized.
fn set_value_needs_parens(expression: &Expression) -> bool {
    needs_parens(expression) || matches!(expression, Expression::Raw { .. })
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn is_numeric_alias(alias: &str) -> bool {
    !alias.is_empty() && alias.bytes().all(|byte| byte.is_ascii_digit())
}

/// Applies the alias rules to a rendered fragment: numeric aliases are
/// dropped, and so is an alias whose escaped form equals the fragment.
fn apply_alias(rendered: String, alias: &str, escaper: &dyn Escaper) -> String {
    if is_numeric_alias(alias) {
        return rendered;
    }
    let escaped = escaper.escape_identifier(alias);
    if escaped == rendered {
        return rendered;
    }
    format!("{rendered} as {escaped}")
}

/// Dialect-aware SQL writer.
///
/// Provided methods implement standard SQL; a dialect writer supplies the
/// escaper, converter and placeholder parser, and re-implements the hooks
/// its dialect diverges on.
///
/// # Examples
///
/// ```rust
/// use queryforge::expression::builder::{column, select, table};
/// use queryforge::{SqlWriter, StandardWriter};
///
/// let writer = StandardWriter::default();
/// let query = select().column(column("a")).from(table("t"));
/// let prepared = writer.prepare(query.into()).unwrap();
/// assert_eq!(prepared.text, "select \"a\"\nfrom \"t\"");
/// ```
pub trait SqlWriter {
    /// The dialect escaper; single source of truth for quoting.
    fn escaper(&self) -> &dyn Escaper;

    /// The shared value converter.
    fn converter(&self) -> &Converter;

    /// The raw-SQL tokenizer compiled from the escaper's escape sequences.
    fn placeholder_parser(&self) -> &PlaceholderParser;

    /// Dialect tag used in error messages.
    fn dialect_name(&self) -> &'static str {
        "standard"
    }

    /// Renders the input into SQL text plus bound arguments.
    fn prepare(&self, input: QueryInput) -> QueryBuilderResult<SqlString> {
        let expression = match input {
            QueryInput::Prepared(prepared) => return Ok(prepared),
            QueryInput::Text(text) => Expression::Raw {
                template: text,
                arguments: Vec::new(),
            },
            QueryInput::Expression(expression) => expression,
        };

        let (identifier, options) = query_metadata(&expression);
        let mut ctx = WriterContext::new(self.converter());
        let text = self.format(&expression, &mut ctx, false)?;
        Ok(SqlString {
            text,
            arguments: ctx.into_arguments(),
            identifier,
            options,
        })
    }

    /// Recursive dispatch over the expression variants.
    ///
    /// With `enforce_parens`, expressions of the classes {ConstantTable,
    /// RawQuery, Select, Where} are wrapped in parentheses.
    fn format(
        &self,
        expression: &Expression,
        ctx: &mut WriterContext,
        enforce_parens: bool,
    ) -> QueryBuilderResult<String> {
        let rendered = match expression {
            Expression::Null => Ok("null".to_string()),
            Expression::Value { value, type_hint } => {
                self.format_value(value, type_hint.as_deref(), ctx)
            }
            Expression::Row { values, cast_as } => match cast_as {
                Some(as_type) => {
                    let row = self.format_row(values, ctx)?;
                    Ok(format!("cast(row {row} as {as_type})"))
                }
                None => self.format_row(values, ctx),
            },
            Expression::Array { values, value_type } => {
                self.format_array(values, value_type.as_deref(), ctx)
            }
            Expression::Identifier { name, namespace } => {
                Ok(self.format_identifier(name, namespace.as_deref()))
            }
            Expression::ColumnName { name, table } => {
                Ok(self.format_column_name(name, table.as_deref()))
            }
            Expression::TableName { name, schema } => {
                Ok(self.format_identifier(name, schema.as_deref()))
            }
            Expression::Raw {
                template,
                arguments,
            }
            | Expression::RawQuery {
                template,
                arguments,
            } => self.format_raw(template, arguments, ctx),
            Expression::Aliased { inner, alias } => self.format_aliased(inner, alias, ctx),
            Expression::Comparison {
                left,
                operator,
                right,
            } => self.format_comparison(
                left.as_deref(),
                operator.as_deref(),
                right.as_deref(),
                ctx,
            ),
            Expression::Between { column, from, to } => self.format_between(column, from, to, ctx),
            Expression::Not(inner) => self.format_not(inner, ctx),
            Expression::CaseWhen { cases, fallback } => {
                self.format_case_when(cases, fallback.as_deref(), ctx)
            }
            Expression::IfThen { condition, then } => {
                // IfThen renders by reduction to a single-branch CaseWhen.
                let reduced = Expression::CaseWhen {
                    cases: vec![((**condition).clone(), (**then).clone())],
                    fallback: None,
                };
                self.format(&reduced, ctx, false)
            }
            Expression::Concat(items) => self.format_concat(items, ctx),
            Expression::Cast { inner, as_type } => self.format_cast(inner, as_type, ctx),
            Expression::FunctionCall { name, arguments } => {
                self.format_function_call(name, arguments, ctx)
            }
            Expression::Aggregate {
                function,
                column,
                filter,
                over,
            } => self.format_aggregate(function, column.as_deref(), filter, over.as_ref(), ctx),
            Expression::Window(window) => {
                let spec = self.format_window(window, ctx)?;
                Ok(spec)
            }
            Expression::CurrentTimestamp => Ok(self.format_current_timestamp()),
            Expression::Random => Ok(self.format_random()),
            Expression::RandomInt { min, max } => self.format_random_int(*min, *max, ctx),
            Expression::LikePattern(pattern) => self.format_pattern(pattern, "like", ctx),
            Expression::SimilarToPattern(pattern) => {
                self.format_pattern(pattern, "similar to", ctx)
            }
            Expression::ConstantTable(table) => self.format_constant_table(table, ctx),
            Expression::Where(clause) => self.format_where(clause, ctx),
            Expression::Select(query) => self.format_select(query, ctx),
            Expression::Insert(query) => self.format_insert(query, ctx),
            Expression::Update(query) => self.format_update(query, ctx),
            Expression::Delete(query) => self.format_delete(query, ctx),
            Expression::Merge(query) => self.format_merge(query, ctx),
        }?;

        if enforce_parens && needs_parens(expression) {
            Ok(format!("({rendered})"))
        } else {
            Ok(rendered)
        }
    }

    /// Appends the value to the argument bag and emits its placeholder.
    fn format_value(
        &self,
        value: &SqlValue,
        type_hint: Option<&str>,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let index = ctx.append(value.clone(), type_hint.map(str::to_string));
        Ok(self.escaper().write_placeholder(index))
    }

    /// Renders a parenthesized comma list.
    fn format_row(
        &self,
        values: &[Expression],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let items = values
            .iter()
            .map(|value| self.format(value, ctx, true))
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        Ok(format!("({})", items.join(", ")))
    }

    /// Renders an `array[…]` literal, cast to `T[]` when typed.
    fn format_array(
        &self,
        values: &[Expression],
        value_type: Option<&str>,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let items = values
            .iter()
            .map(|value| self.format(value, ctx, true))
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        let array = format!("array[{}]", items.join(", "));
        match value_type {
            Some(element_type) => Ok(format!("cast({array} as {element_type}[])")),
            None => Ok(array),
        }
    }

    /// Renders a namespaced identifier.
    fn format_identifier(&self, name: &str, namespace: Option<&str>) -> String {
        let escaper = self.escaper();
        match namespace {
            Some(namespace) => format!(
                "{}.{}",
                escaper.escape_identifier(namespace),
                escaper.escape_identifier(name)
            ),
            None => escaper.escape_identifier(name),
        }
    }

    /// Renders a column reference; `*` stays unquoted.
    fn format_column_name(&self, name: &str, table: Option<&str>) -> String {
        let escaper = self.escaper();
        let column = if name == "*" {
            name.to_string()
        } else {
            escaper.escape_identifier(name)
        };
        match table {
            Some(table) => format!("{}.{column}", escaper.escape_identifier(table)),
            None => column,
        }
    }

    /// Substitutes placeholders in a raw SQL template.
    ///
    /// Fast path: a template without `?` and without arguments is returned
    /// byte-for-byte. Exhausted positional arguments render as `null`.
    fn format_raw(
        &self,
        template: &str,
        arguments: &[Argument],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        if arguments.is_empty() && !template.contains('?') {
            return Ok(template.to_string());
        }

        let mut output = String::with_capacity(template.len());
        let mut consumed = 0usize;
        for token in self.placeholder_parser().tokenize(template) {
            match token {
                RawToken::Fragment(text) => output.push_str(text),
                RawToken::EscapedPlaceholder => {
                    output.push_str(self.escaper().unescape_placeholder_char());
                }
                RawToken::Placeholder { cast } => {
                    let argument = arguments
                        .get(consumed)
                        .cloned()
                        .unwrap_or(Argument::Value(SqlValue::Null));
                    consumed += 1;
                    let expression = ctx
                        .converter()
                        .to_expression(argument, cast)
                        .map_err(QueryBuilderError::from)?;
                    output.push_str(&self.format(&expression, ctx, false)?);
                }
            }
        }
        Ok(output)
    }

    /// Renders `inner as "alias"`, applying the alias-dropping rules and
    /// the ConstantTable column list.
    fn format_aliased(
        &self,
        inner: &Expression,
        alias: &str,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let rendered = self.format(inner, ctx, needs_parens(inner))?;
        if is_numeric_alias(alias) {
            return Ok(rendered);
        }
        let escaper = self.escaper();
        let escaped = escaper.escape_identifier(alias);
        if escaped == rendered {
            return Ok(rendered);
        }
        if let Expression::ConstantTable(table) = inner {
            if !table.columns.is_empty() {
                let columns: Vec<&str> = table.columns.iter().map(String::as_str).collect();
                return Ok(format!(
                    "{rendered} as {escaped} ({})",
                    escaper.escape_identifier_list(&columns)
                ));
            }
        }
        Ok(format!("{rendered} as {escaped}"))
    }

    /// Renders `left operator right`, omitting missing parts.
    fn format_comparison(
        &self,
        left: Option<&Expression>,
        operator: Option<&str>,
        right: Option<&Expression>,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let mut parts = Vec::with_capacity(3);
        if let Some(left) = left {
            parts.push(self.format(left, ctx, true)?);
        }
        if let Some(operator) = operator {
            parts.push(operator.to_string());
        }
        if let Some(right) = right {
            parts.push(self.format(right, ctx, true)?);
        }
        Ok(parts.join(" "))
    }

    fn format_between(
        &self,
        column: &Expression,
        from: &Expression,
        to: &Expression,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        Ok(format!(
            "{} between {} and {}",
            self.format(column, ctx, true)?,
            self.format(from, ctx, true)?,
            self.format(to, ctx, true)?
        ))
    }

    /// Renders `not (inner)` with forced parentheses.
    fn format_not(
        &self,
        inner: &Expression,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        Ok(format!("not ({})", self.format(inner, ctx, false)?))
    }

    /// Renders a CASE expression; with no cases it degenerates to the
    /// fallback (or `null`).
    fn format_case_when(
        &self,
        cases: &[(Expression, Expression)],
        fallback: Option<&Expression>,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        if cases.is_empty() {
            return match fallback {
                Some(fallback) => self.format(fallback, ctx, false),
                None => Ok("null".to_string()),
            };
        }
        let mut output = String::from("case");
        for (condition, then) in cases {
            output.push_str(&format!(
                " when {} then {}",
                self.format(condition, ctx, true)?,
                self.format(then, ctx, true)?
            ));
        }
        if let Some(fallback) = fallback {
            output.push_str(&format!(" else {}", self.format(fallback, ctx, true)?));
        }
        output.push_str(" end");
        Ok(output)
    }

    /// Renders string concatenation with `||`.
    fn format_concat(
        &self,
        items: &[Expression],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let rendered = items
            .iter()
            .map(|item| self.format(item, ctx, true))
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        Ok(rendered.join(" || "))
    }

    /// Maps a cast target type to the dialect's spelling.
    fn cast_type(&self, as_type: &str) -> String {
        as_type.to_string()
    }

    fn format_cast(
        &self,
        inner: &Expression,
        as_type: &str,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let rendered = match inner {
            Expression::Row {
                values,
                cast_as: None,
            } => format!("row {}", self.format_row(values, ctx)?),
            other => self.format(other, ctx, true)?,
        };
        Ok(format!("cast({rendered} as {})", self.cast_type(as_type)))
    }

    /// Renders a function call; the name is escaped only when it is not a
    /// plain alphanumeric name.
    fn format_function_call(
        &self,
        name: &str,
        arguments: &[Expression],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        if name.is_empty() {
            return Err(QueryBuilderError::MissingFunctionName);
        }
        let rendered_name = if is_plain_name(name) {
            name.to_string()
        } else {
            self.escaper().escape_identifier(name)
        };
        let rendered_arguments = arguments
            .iter()
            .map(|argument| self.format(argument, ctx, true))
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        Ok(format!("{rendered_name}({})", rendered_arguments.join(", ")))
    }

    /// Whether the dialect accepts the `filter (where …)` clause on
    /// aggregates.
    fn supports_aggregate_filter(&self) -> bool {
        true
    }

    /// Whether the dialect accepts RETURNING clauses.
    fn supports_returning(&self) -> bool {
        true
    }

    /// Renders an aggregate call, rewriting the FILTER clause into a CASE
    /// expression when the dialect lacks it.
    fn format_aggregate(
        &self,
        function: &str,
        column: Option<&Expression>,
        filter: &Where,
        over: Option<&Window>,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        if function.is_empty() {
            return Err(QueryBuilderError::MissingFunctionName);
        }
        let name = self.escaper().escape_identifier(function);

        let body = if filter.is_empty() {
            let column_sql = match column {
                Some(column) => self.format(column, ctx, true)?,
                None => "*".to_string(),
            };
            format!("{name}({column_sql})")
        } else if self.supports_aggregate_filter() {
            let column_sql = match column {
                Some(column) => self.format(column, ctx, true)?,
                None => "*".to_string(),
            };
            let condition = self.format_where(filter, ctx)?;
            format!("{name}({column_sql}) filter (where {condition})")
        } else {
            // The condition renders before the column here, so it is
            // formatted first to keep argument order aligned with
            // placeholder order.
            let condition = self.format_where(filter, ctx)?;
            // The COUNT(*) special case: a missing or star column counts
            // matching rows through a constant.
            let column_sql = match column {
                Some(Expression::ColumnName { name, .. }) if name == "*" => "1".to_string(),
                Some(column) => self.format(column, ctx, true)?,
                None => "1".to_string(),
            };
            format!("{name}(case when {condition} then {column_sql} end)")
        };

        match over {
            Some(window) => match &window.alias {
                Some(alias) => Ok(format!(
                    "{body} over {}",
                    self.escaper().escape_identifier(alias)
                )),
                None => Ok(format!("{body} over {}", self.format_window(window, ctx)?)),
            },
            None => Ok(body),
        }
    }

    /// Renders a parenthesized window specification.
    fn format_window(
        &self,
        window: &Window,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let mut parts = Vec::new();
        if !window.partition_by.is_empty() {
            let columns = window
                .partition_by
                .iter()
                .map(|column| self.format(column, ctx, true))
                .collect::<QueryBuilderResult<Vec<_>>>()?;
            parts.push(format!("partition by {}", columns.join(", ")));
        }
        if !window.order_by.is_empty() {
            parts.push(format!(
                "order by {}",
                self.format_order_by_list(&window.order_by, ctx)?
            ));
        }
        Ok(format!("({})", parts.join(" ")))
    }

    fn format_current_timestamp(&self) -> String {
        "current_timestamp".to_string()
    }

    fn format_random(&self) -> String {
        "random()".to_string()
    }

    /// Renders a bounded random integer; bounds are swapped when reversed
    /// so the range is never negative.
    fn format_random_int(
        &self,
        min: i64,
        max: i64,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let (min, max) = if max < min { (max, min) } else { (min, max) };
        let random = self.format_random();
        let max_placeholder = self.format_value(&SqlValue::Int(max), None, ctx)?;
        let min_placeholder = self.format_value(&SqlValue::Int(min), None, ctx)?;
        let offset_placeholder = self.format_value(&SqlValue::Int(min), None, ctx)?;
        Ok(format!(
            "floor({random} * (cast({max_placeholder} as int) - {min_placeholder} + 1) + {offset_placeholder})"
        ))
    }

    /// Renders a LIKE/SIMILAR TO pattern: the value is LIKE-escaped, then
    /// substituted for the `?` marker in the pattern template, and the
    /// whole pattern becomes a string literal.
    fn format_pattern(
        &self,
        pattern: &PatternMatch,
        operator: &str,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let escaper = self.escaper();
        let mut rendered_pattern = pattern.pattern.clone();
        if let Some(value) = &pattern.value {
            let escaped = escaper.escape_like(value, pattern.reserved_chars.as_deref());
            rendered_pattern = rendered_pattern.replace('?', &escaped);
        }
        let literal = escaper.escape_literal(&rendered_pattern);
        let operator = if operator == "like" && !pattern.case_sensitive {
            "ilike"
        } else {
            operator
        };
        match &pattern.column {
            Some(column) => Ok(format!(
                "{} {operator} {literal}",
                self.format(column, ctx, true)?
            )),
            None => Ok(literal),
        }
    }

    /// Renders one row of a constant table.
    fn format_constant_table_row(
        &self,
        row: &[Expression],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        self.format_row(row, ctx)
    }

    /// Renders `values (…), (…)`.
    fn format_constant_table(
        &self,
        table: &ConstantTable,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let rows = table
            .rows
            .iter()
            .map(|row| self.format_constant_table_row(row, ctx))
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        Ok(format!("values {}", rows.join("\n,")))
    }

    /// Renders a WHERE condition list; an empty clause renders `1`.
    fn format_where(
        &self,
        clause: &Where,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let mut rendered = Vec::new();
        for condition in &clause.conditions {
            // Empty nested clauses disappear instead of rendering a stray 1.
            if let Expression::Where(nested) = condition {
                if nested.is_empty() {
                    continue;
                }
            }
            rendered.push(self.format(condition, ctx, true)?);
        }
        if rendered.is_empty() {
            return Ok("1".to_string());
        }
        Ok(rendered.join(&format!(" {} ", clause.operator.keyword())))
    }

    /// Renders an ORDER BY item list.
    fn format_order_by_list(
        &self,
        items: &[OrderByStatement],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let rendered = items
            .iter()
            .map(|item| {
                let column = self.format(&item.column, ctx, true)?;
                let mut output = format!("{column} {}", item.direction.keyword());
                match item.nulls {
                    NullsPlacement::Default => {}
                    NullsPlacement::First => output.push_str(" nulls first"),
                    NullsPlacement::Last => output.push_str(" nulls last"),
                }
                Ok(output)
            })
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }

    /// Renders the LIMIT/OFFSET clause; `0` disables either side.
    fn format_range(&self, limit: u64, offset: u64) -> String {
        match (limit, offset) {
            (0, 0) => String::new(),
            (limit, 0) => format!("limit {limit}"),
            (0, offset) => format!("offset {offset}"),
            (limit, offset) => format!("limit {limit} offset {offset}"),
        }
    }

    /// Renders a join clause; an empty condition degrades to `cross join`.
    fn format_join(
        &self,
        join: &JoinStatement,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let table = self.format(&join.table, ctx, true)?;
        if join.condition.is_empty() {
            return Ok(format!("cross join {table}"));
        }
        let condition = self.format_where(&join.condition, ctx)?;
        Ok(format!("{} {table} on ({condition})", join.mode.keyword()))
    }

    /// Renders the WITH clause prelude, empty string when there is none.
    fn format_with(
        &self,
        statements: &[WithStatement],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        if statements.is_empty() {
            return Ok(String::new());
        }
        let escaper = self.escaper();
        let rendered = statements
            .iter()
            .map(|statement| {
                let alias = escaper.escape_identifier(&statement.alias);
                let inner = self.format(&statement.expression, ctx, false)?;
                // A constant table exposing column names declares them on
                // the alias.
                if let Expression::ConstantTable(table) = &statement.expression {
                    if !table.columns.is_empty() {
                        let columns: Vec<&str> =
                            table.columns.iter().map(String::as_str).collect();
                        return Ok(format!(
                            "{alias} ({}) as ({inner})",
                            escaper.escape_identifier_list(&columns)
                        ));
                    }
                }
                Ok(format!("{alias} as ({inner})"))
            })
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        Ok(format!("with {}", rendered.join(", ")))
    }

    /// Renders one projected column, prefixing bare rows with the `row`
    /// keyword and applying the alias rules.
    fn format_select_column(
        &self,
        column: &SelectColumn,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let rendered = match &column.expression {
            Expression::Row {
                values,
                cast_as: None,
            } => format!("row {}", self.format_row(values, ctx)?),
            other => self.format(other, ctx, true)?,
        };
        match &column.alias {
            Some(alias) => Ok(apply_alias(rendered, alias, self.escaper())),
            None => Ok(rendered),
        }
    }

    /// Renders a SELECT statement.
    fn format_select(
        &self,
        query: &Select,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let mut clauses = Vec::new();

        let with = self.format_with(&query.with, ctx)?;
        if !with.is_empty() {
            clauses.push(with);
        }

        let projection = if query.columns.is_empty() {
            "*".to_string()
        } else {
            query
                .columns
                .iter()
                .map(|column| self.format_select_column(column, ctx))
                .collect::<QueryBuilderResult<Vec<_>>>()?
                .join(", ")
        };
        if query.distinct {
            clauses.push(format!("select distinct {projection}"));
        } else {
            clauses.push(format!("select {projection}"));
        }

        if !query.from.is_empty() {
            let tables = query
                .from
                .iter()
                .map(|table| self.format(table, ctx, true))
                .collect::<QueryBuilderResult<Vec<_>>>()?;
            clauses.push(format!("from {}", tables.join(", ")));
        }

        for join in &query.joins {
            clauses.push(self.format_join(join, ctx)?);
        }

        if !query.where_clause.is_empty() {
            clauses.push(format!(
                "where {}",
                self.format_where(&query.where_clause, ctx)?
            ));
        }

        if !query.group_by.is_empty() {
            let columns = query
                .group_by
                .iter()
                .map(|column| self.format(column, ctx, true))
                .collect::<QueryBuilderResult<Vec<_>>>()?;
            clauses.push(format!("group by {}", columns.join(", ")));
        }

        if !query.having.is_empty() {
            clauses.push(format!("having {}", self.format_where(&query.having, ctx)?));
        }

        let mut named_windows = Vec::new();
        for window in &query.windows {
            if let Some(alias) = &window.alias {
                let alias = self.escaper().escape_identifier(alias);
                named_windows.push(format!("{alias} as {}", self.format_window(window, ctx)?));
            }
        }
        if !named_windows.is_empty() {
            clauses.push(format!("window {}", named_windows.join(", ")));
        }

        if !query.order_by.is_empty() {
            clauses.push(format!(
                "order by {}",
                self.format_order_by_list(&query.order_by, ctx)?
            ));
        }

        let range = self.format_range(query.limit, query.offset);
        if !range.is_empty() {
            clauses.push(range);
        }

        for union in &query.unions {
            clauses.push(format!("union\n{}", self.format(union, ctx, false)?));
        }

        if query.for_update {
            clauses.push("for update".to_string());
        }

        Ok(clauses.join("\n"))
    }

    /// Renders the RETURNING clause, empty string when there is none.
    fn format_returning(
        &self,
        returning: &[SelectColumn],
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        if returning.is_empty() {
            return Ok(String::new());
        }
        if !self.supports_returning() {
            return Err(QueryBuilderError::UnsupportedFeature {
                feature: "returning",
                dialect: self.dialect_name(),
            });
        }
        let columns = returning
            .iter()
            .map(|column| self.format_select_column(column, ctx))
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        Ok(format!("returning {}", columns.join(", ")))
    }

    /// The dialect token for an INSERT without columns or values.
    fn insert_no_values_token(&self) -> &'static str {
        "default values"
    }

    /// Renders an INSERT statement.
    fn format_insert(
        &self,
        query: &Insert,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let mut clauses = Vec::new();

        let with = self.format_with(&query.with, ctx)?;
        if !with.is_empty() {
            clauses.push(with);
        }

        let table = query
            .table
            .as_ref()
            .ok_or(QueryBuilderError::MissingTable {
                statement: "insert",
            })?;
        clauses.push(format!("insert into {}", self.format(table, ctx, false)?));

        if !query.columns.is_empty() {
            let columns: Vec<&str> = query.columns.iter().map(String::as_str).collect();
            clauses.push(format!(
                "({})",
                self.escaper().escape_identifier_list(&columns)
            ));
        }

        match &query.source {
            None => clauses.push(self.insert_no_values_token().to_string()),
            Some(Expression::ConstantTable(table))
                if query.columns.is_empty() && table.rows.is_empty() =>
            {
                clauses.push(self.insert_no_values_token().to_string());
            }
            Some(source) => clauses.push(self.format(source, ctx, false)?),
        }

        let returning = self.format_returning(&query.returning, ctx)?;
        if !returning.is_empty() {
            clauses.push(returning);
        }

        Ok(clauses.join("\n"))
    }

    /// Renders one UPDATE SET value.
    ///
    /// A plain text value is literal-escaped inline; any other native value
    /// becomes a placeholder; raw and query-like expressions are
    /// parenthesized.
    fn format_update_set_value(
        &self,
        value: &Argument,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        match value {
            Argument::Value(SqlValue::Text(text)) => Ok(self.escaper().escape_literal(text)),
            Argument::Value(value) => self.format_value(value, None, ctx),
            Argument::Expression(expression) => {
                let rendered = self.format(expression, ctx, false)?;
                if set_value_needs_parens(expression) {
                    Ok(format!("({rendered})"))
                } else {
                    Ok(rendered)
                }
            }
        }
    }

    /// Promotes the first join to a leading table, pushing its condition
    /// into the WHERE clause. INNER and NATURAL only.
    fn promote_first_join<'q>(
        &self,
        statement: &'static str,
        joins: &'q [JoinStatement],
        from: &mut Vec<String>,
        where_clause: &mut Where,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<&'q [JoinStatement]> {
        let Some((first, rest)) = joins.split_first() else {
            return Ok(joins);
        };
        if !first.mode.allows_promotion() {
            return Err(QueryBuilderError::IllegalJoinPromotion {
                statement,
                mode: first.mode.keyword().to_string(),
            });
        }
        from.push(self.format(&first.table, ctx, true)?);
        if !first.condition.is_empty() {
            // The promoted condition folds into an empty WHERE of the same
            // combinator instead of nesting a parenthesized group.
            if where_clause.conditions.is_empty()
                && where_clause.operator == first.condition.operator
            {
                where_clause
                    .conditions
                    .extend(first.condition.conditions.iter().cloned());
            } else {
                where_clause.add(Expression::Where(first.condition.clone()));
            }
        }
        Ok(rest)
    }

    /// Renders an UPDATE statement.
    fn format_update(
        &self,
        query: &Update,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        if query.set.is_empty() {
            return Err(QueryBuilderError::EmptySetClause);
        }

        let mut clauses = Vec::new();

        let with = self.format_with(&query.with, ctx)?;
        if !with.is_empty() {
            clauses.push(with);
        }

        let table = query
            .table
            .as_ref()
            .ok_or(QueryBuilderError::MissingTable {
                statement: "update",
            })?;
        clauses.push(format!("update {}", self.format(table, ctx, false)?));

        let assignments = query
            .set
            .iter()
            .map(|(column, value)| {
                Ok(format!(
                    "{} = {}",
                    self.escaper().escape_identifier(column),
                    self.format_update_set_value(value, ctx)?
                ))
            })
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        clauses.push(format!("set {}", assignments.join(", ")));

        let mut from = query
            .from
            .iter()
            .map(|table| self.format(table, ctx, true))
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        let mut where_clause = query.where_clause.clone();
        let joins = self.promote_first_join("update", &query.joins, &mut from, &mut where_clause, ctx)?;

        if !from.is_empty() {
            clauses.push(format!("from {}", from.join(", ")));
        }
        for join in joins {
            clauses.push(self.format_join(join, ctx)?);
        }

        if !where_clause.is_empty() {
            clauses.push(format!("where {}", self.format_where(&where_clause, ctx)?));
        }

        let returning = self.format_returning(&query.returning, ctx)?;
        if !returning.is_empty() {
            clauses.push(returning);
        }

        Ok(clauses.join("\n"))
    }

    /// Renders a DELETE statement.
    fn format_delete(
        &self,
        query: &Delete,
        ctx: &mut WriterContext,
    ) -> QueryBuilderResult<String> {
        let mut clauses = Vec::new();

        let with = self.format_with(&query.with, ctx)?;
        if !with.is_empty() {
            clauses.push(with);
        }

        let table = query
            .table
            .as_ref()
            .ok_or(QueryBuilderError::MissingTable {
                statement: "delete",
            })?;
        clauses.push(format!("delete from {}", self.format(table, ctx, false)?));

        let mut using = query
            .using
            .iter()
            .map(|table| self.format(table, ctx, true))
            .collect::<QueryBuilderResult<Vec<_>>>()?;
        let mut where_clause = query.where_clause.clone();
        let joins = self.promote_first_join("delete", &query.joins, &mut using, &mut where_clause, ctx)?;

        if !using.is_empty() {
            clauses.push(format!("using {}", using.join(", ")));
        }
        for join in joins {
            clauses.push(self.format_join(join, ctx)?);
        }

        if !where_clause.is_empty() {
            clauses.push(format!("where {}", self.format_where(&where_clause, ctx)?));
        }

        let returning = self.format_returning(&query.returning, ctx)?;
        if !returning.is_empty() {
            clauses.push(returning);
        }

        Ok(clauses.join("\n"))
    }

    /// Renders a MERGE statement driven by the conflict mode.
    fn format_merge(&self, query: &Merge, ctx: &mut WriterContext) -> QueryBuilderResult<String> {
        use crate::query::ConflictMode;

        let source = query
            .using
            .as_ref()
            .ok_or(QueryBuilderError::MissingMergeSource)?;

        let escaper = self.escaper();
        let mut clauses = Vec::new();

        let with = self.format_with(&query.with, ctx)?;
        if !with.is_empty() {
            clauses.push(with);
        }

        let table = self.format(&query.table, ctx, false)?;
        clauses.push(format!("merge into {table}"));

        let alias = escaper.escape_identifier(&query.using_alias);
        clauses.push(format!(
            "using ({}) as {alias}",
            self.format(source, ctx, false)?
        ));

        let mut on_clause = Where::and();
        for key in &query.key {
            on_clause.add(Expression::Raw {
                template: format!(
                    "{table}.{column} = {alias}.{column}",
                    column = escaper.escape_identifier(key)
                ),
                arguments: Vec::new(),
            });
        }
        clauses.push(format!("on ({})", self.format_where(&on_clause, ctx)?));

        if query.conflict == ConflictMode::Update {
            let assignments: Vec<String> = query
                .columns
                .iter()
                .filter(|column| !query.key.contains(column))
                .map(|column| {
                    let column = escaper.escape_identifier(column);
                    format!("{column} = {alias}.{column}")
                })
                .collect();
            if !assignments.is_empty() {
                clauses.push(format!(
                    "when matched then update set {}",
                    assignments.join(", ")
                ));
            }
        }

        let columns: Vec<&str> = query.columns.iter().map(String::as_str).collect();
        let sources: Vec<String> = query
            .columns
            .iter()
            .map(|column| format!("{alias}.{}", escaper.escape_identifier(column)))
            .collect();
        if columns.is_empty() {
            clauses.push("when not matched then insert default values".to_string());
        } else {
            clauses.push(format!(
                "when not matched then insert ({})\nvalues ({})",
                escaper.escape_identifier_list(&columns),
                sources.join(", ")
            ));
        }

        let returning = self.format_returning(&query.returning, ctx)?;
        if !returning.is_empty() {
            clauses.push(returning);
        }

        Ok(clauses.join("\n"))
    }
}

/// Extracts the identifier and options carried by a root query expression.
fn query_metadata(expression: &Expression) -> (Option<String>, QueryOptions) {
    match expression {
        Expression::Select(query) => (query.identifier.clone(), query.options.clone()),
        Expression::Insert(query) => (query.identifier.clone(), query.options.clone()),
        Expression::Update(query) => (query.identifier.clone(), query.options.clone()),
        Expression::Delete(query) => (query.identifier.clone(), query.options.clone()),
        Expression::Merge(query) => (query.identifier.clone(), query.options.clone()),
        _ => (None, QueryOptions::new()),
    }
}

/// Standard SQL-92/PostgreSQL-compatible writer.
pub struct StandardWriter {
    escaper: Box<dyn Escaper>,
    converter: Converter,
    parser: PlaceholderParser,
}

impl StandardWriter {
    /// Builds a writer over the given escaper and converter; the raw-SQL
    /// tokenizer is compiled here, once.
    pub fn new(escaper: Box<dyn Escaper>, converter: Converter) -> Self {
        let parser = PlaceholderParser::from_escaper(escaper.as_ref());
        Self {
            escaper,
            converter,
            parser,
        }
    }
}

impl Default for StandardWriter {
    fn default() -> Self {
        Self::new(Box::new(StandardEscaper), Converter::new())
    }
}

impl SqlWriter for StandardWriter {
    fn escaper(&self) -> &dyn Escaper {
        self.escaper.as_ref()
    }

    fn converter(&self) -> &Converter {
        &self.converter
    }

    fn placeholder_parser(&self) -> &PlaceholderParser {
        &self.parser
    }
}
