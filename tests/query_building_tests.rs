//! End-to-end query rendering tests
//!
//! Builds expression trees through the fluent builders and checks the
//! rendered SQL text and bound argument vector against the standard
//! dialect, byte for byte.

use pretty_assertions::assert_eq;

use queryforge::expression::builder::{
    column, constant_table, delete, insert, raw, select, table, table_column, update, value,
};
use queryforge::{
    Argument, ArgumentBag, Converter, Escaper, Expression, JoinMode, SqlValue, SqlWriter,
    StandardWriter, Where,
};

fn prepare(input: impl Into<queryforge::QueryInput>) -> queryforge::SqlString {
    StandardWriter::default().prepare(input.into()).unwrap()
}

fn argument_values(bag: &ArgumentBag) -> Vec<SqlValue> {
    bag.values().into_iter().cloned().collect()
}

#[test]
fn test_select_with_where() {
    let query = select()
        .column(column("a"))
        .from(table("t"))
        .and_where(column("a").compare("=", value(1)));

    let prepared = prepare(query);
    assert_eq!(prepared.text, "select \"a\"\nfrom \"t\"\nwhere \"a\" = ?");
    assert_eq!(argument_values(&prepared.arguments), vec![SqlValue::Int(1)]);
}

#[test]
fn test_insert_from_constant_table() {
    let query = insert("t").columns(["a", "b"]).values([1, 2]).values([3, 4]);

    let prepared = prepare(query);
    assert_eq!(
        prepared.text,
        "insert into \"t\"\n(\"a\", \"b\")\nvalues (?, ?)\n,(?, ?)"
    );
    assert_eq!(
        argument_values(&prepared.arguments),
        vec![
            SqlValue::Int(1),
            SqlValue::Int(2),
            SqlValue::Int(3),
            SqlValue::Int(4)
        ]
    );
}

#[test]
fn test_raw_with_typed_placeholder() {
    let prepared = prepare(raw(
        "select ? + ?::int",
        [Argument::from(1), Argument::from("2")],
    ));

    assert_eq!(prepared.text, "select ? + ?");
    let collected: Vec<_> = prepared
        .arguments
        .iter()
        .map(|(v, t)| (v.clone(), t.map(str::to_string)))
        .collect();
    assert_eq!(
        collected,
        vec![
            (SqlValue::Int(1), None),
            (SqlValue::Text("2".to_string()), Some("int".to_string())),
        ]
    );
}

#[test]
fn test_update_with_raw_set_value() {
    let query = update("t")
        .set("x", raw("? + 1", [5]))
        .and_where(column("id").compare("=", value(7)));

    let prepared = prepare(query);
    assert_eq!(
        prepared.text,
        "update \"t\"\nset \"x\" = (? + 1)\nwhere \"id\" = ?"
    );
    assert_eq!(
        argument_values(&prepared.arguments),
        vec![SqlValue::Int(5), SqlValue::Int(7)]
    );
}

/// A dialect writer rejecting the FILTER clause, forcing the CASE rewrite.
struct NoFilterWriter(StandardWriter);

impl SqlWriter for NoFilterWriter {
    fn escaper(&self) -> &dyn Escaper {
        self.0.escaper()
    }

    fn converter(&self) -> &Converter {
        self.0.converter()
    }

    fn placeholder_parser(&self) -> &queryforge::writer::placeholder::PlaceholderParser {
        self.0.placeholder_parser()
    }

    fn supports_aggregate_filter(&self) -> bool {
        false
    }
}

#[test]
fn test_aggregate_filter_fallback_without_dialect_support() {
    let aggregate = Expression::Aggregate {
        function: "count".to_string(),
        column: Some(Box::new(column("*"))),
        filter: Where::and().condition(column("a"), ">", value(0)),
        over: None,
    };
    let query = select().column(aggregate);

    let writer = NoFilterWriter(StandardWriter::default());
    let prepared = writer.prepare(query.into()).unwrap();
    assert_eq!(
        prepared.text,
        "select \"count\"(case when \"a\" > ? then 1 end)"
    );
    assert_eq!(argument_values(&prepared.arguments), vec![SqlValue::Int(0)]);
}

#[test]
fn test_delete_first_join_promotion() {
    let query = delete("t").join(
        JoinMode::Inner,
        table("u"),
        Where::and().condition(column("t.id"), "=", column("u.t_id")),
    );

    let prepared = prepare(query);
    assert_eq!(
        prepared.text,
        "delete from \"t\"\nusing \"u\"\nwhere \"t.id\" = \"u.t_id\""
    );
    assert!(prepared.arguments.is_empty());
}

#[test]
fn test_delete_promotion_rejects_outer_joins() {
    let query = delete("t").join(JoinMode::Left, table("u"), Where::and());
    let result = StandardWriter::default().prepare(query.into());
    assert!(matches!(
        result,
        Err(queryforge::QueryBuilderError::IllegalJoinPromotion { .. })
    ));
}

// ===== Universal invariants =====

#[test]
fn test_argument_placeholder_bijection() {
    let query = select()
        .column(value(1))
        .column(raw("? + ?", [2, 3]))
        .from(table("t"))
        .and_where(column("a").compare("=", value(4)))
        .and_where(column("b").compare("in", select().column(value(5))));

    let prepared = prepare(query);
    let placeholder_count = prepared.text.matches('?').count();
    assert_eq!(placeholder_count, prepared.arguments.len());
    assert_eq!(
        argument_values(&prepared.arguments),
        vec![
            SqlValue::Int(1),
            SqlValue::Int(2),
            SqlValue::Int(3),
            SqlValue::Int(4),
            SqlValue::Int(5)
        ]
    );
}

#[test]
fn test_idempotent_re_prepare() {
    let query = select()
        .column(column("a"))
        .from(table("t"))
        .and_where(column("a").compare(">", value(10)))
        .and_where(column("b").compare("=", value("x")));

    let writer = StandardWriter::default();
    let first = writer.prepare(query.into()).unwrap();
    let second = writer.prepare(first.to_expression().into()).unwrap();

    assert_eq!(second.text, first.text);
    assert_eq!(second.arguments, first.arguments);
}

#[test]
fn test_identifier_safety() {
    let prepared = prepare(
        select()
            .column(column("weird \"name\""))
            .from(table("ta;ble")),
    );
    assert_eq!(
        prepared.text,
        "select \"weird \"\"name\"\"\"\nfrom \"ta;ble\""
    );
}

#[test]
fn test_empty_where_law() {
    let prepared = prepare(Expression::from(Where::and()));
    assert_eq!(prepared.text, "1");

    let nested_only = Where::and().nested(Where::or()).nested(Where::and());
    let prepared = prepare(Expression::from(nested_only));
    assert_eq!(prepared.text, "1");

    // An empty WHERE clause is dropped from the statement entirely.
    let prepared = prepare(select().column(column("a")).from(table("t")));
    assert_eq!(prepared.text, "select \"a\"\nfrom \"t\"");
}

#[test]
fn test_parenthesization_closure_for_aliases() {
    // Plain expressions never get parenthesized for their alias.
    let prepared = prepare(select().column_as(column("a"), "x"));
    assert_eq!(prepared.text, "select \"a\" as \"x\"");

    let prepared = prepare(select().column_as(raw("1 + 1", [] as [Argument; 0]), "x"));
    assert_eq!(prepared.text, "select 1 + 1 as \"x\"");

    // Query classes do.
    let prepared = prepare(select().column_as(select().column(value(1)), "x"));
    assert_eq!(prepared.text, "select (select ?) as \"x\"");
}

#[test]
fn test_raw_fast_path_is_byte_identical() {
    let template = "select 1 from dual";
    let prepared = prepare(raw(template, [] as [Argument; 0]));
    assert_eq!(prepared.text, template);
    assert!(prepared.arguments.is_empty());
}

#[test]
fn test_raw_placeholder_inside_literal_is_preserved() {
    let template = "select * from \"t\" where note = 'какой-то ?текст'";
    let prepared = prepare(raw(template, [] as [Argument; 0]));
    assert_eq!(prepared.text, template);
    assert!(prepared.arguments.is_empty());
}

#[test]
fn test_double_question_mark_escape() {
    let prepared = prepare(raw("a ?? b ?? c", [] as [Argument; 0]));
    assert_eq!(prepared.text, "a ? b ? c");
    assert!(prepared.arguments.is_empty());
}

#[test]
fn test_range_rule() {
    let base = || select().column(column("a")).from(table("t"));

    assert_eq!(prepare(base().range(0, 0)).text, "select \"a\"\nfrom \"t\"");
    assert_eq!(
        prepare(base().range(10, 0)).text,
        "select \"a\"\nfrom \"t\"\nlimit 10"
    );
    assert_eq!(
        prepare(base().range(0, 5)).text,
        "select \"a\"\nfrom \"t\"\noffset 5"
    );
    assert_eq!(
        prepare(base().range(10, 5)).text,
        "select \"a\"\nfrom \"t\"\nlimit 10 offset 5"
    );
}

// ===== Composed statements =====

#[test]
fn test_select_kitchen_sink() {
    let query = select()
        .with("recent", select().column(column("*")).from(table("events")))
        .distinct()
        .column(column("kind"))
        .column_as(
            Expression::Aggregate {
                function: "count".to_string(),
                column: Some(Box::new(column("*"))),
                filter: Where::and(),
                over: None,
            },
            "total",
        )
        .from(table("recent"))
        .join_inner(
            table("users"),
            Where::and().condition(
                table_column("recent", "user_id"),
                "=",
                table_column("users", "id"),
            ),
        )
        .and_where(column("kind").compare("<>", value("noise")))
        .group_by(column("kind"))
        .having(
            Expression::Aggregate {
                function: "count".to_string(),
                column: Some(Box::new(column("*"))),
                filter: Where::and(),
                over: None,
            }
            .compare(">", value(10)),
        )
        .order_by(column("kind"), queryforge::OrderDirection::Asc)
        .range(100, 0);

    let prepared = prepare(query);
    assert_eq!(
        prepared.text,
        "with \"recent\" as (select *\nfrom \"events\")\n\
         select distinct \"kind\", \"count\"(*) as \"total\"\n\
         from \"recent\"\n\
         inner join \"users\" on (\"recent\".\"user_id\" = \"users\".\"id\")\n\
         where \"kind\" <> ?\n\
         group by \"kind\"\n\
         having \"count\"(*) > ?\n\
         order by \"kind\" asc\n\
         limit 100"
    );
    assert_eq!(
        argument_values(&prepared.arguments),
        vec![SqlValue::Text("noise".into()), SqlValue::Int(10)]
    );
}

#[test]
fn test_with_clause_constant_table_declares_columns() {
    let source = constant_table()
        .row([value(1), value("a")])
        .row([value(2), value("b")])
        .with_columns(["id", "name"]);

    let query = select()
        .with("fixture", Expression::from(source))
        .column(column("name"))
        .from(table("fixture"));

    let prepared = prepare(query);
    assert_eq!(
        prepared.text,
        "with \"fixture\" (\"id\", \"name\") as (values (?, ?)\n,(?, ?))\n\
         select \"name\"\nfrom \"fixture\""
    );
}

#[test]
fn test_aliased_constant_table_in_from() {
    let source = Expression::from(
        constant_table()
            .row([value(1), value(2)])
            .with_columns(["a", "b"]),
    )
    .with_alias("v");

    let prepared = prepare(select().column(column("a")).from(source));
    assert_eq!(
        prepared.text,
        "select \"a\"\nfrom (values (?, ?)) as \"v\" (\"a\", \"b\")"
    );
}

#[test]
fn test_insert_default_values() {
    let prepared = prepare(insert("t"));
    assert_eq!(prepared.text, "insert into \"t\"\ndefault values");
}

#[test]
fn test_insert_from_select() {
    let query = insert("archive")
        .columns(["id"])
        .query(select().column(column("id")).from(table("events")))
        .returning(column("id"));

    let prepared = prepare(query);
    assert_eq!(
        prepared.text,
        "insert into \"archive\"\n(\"id\")\nselect \"id\"\nfrom \"events\"\nreturning \"id\""
    );
}

#[test]
fn test_update_set_string_is_literal_escaped() {
    let query = update("t")
        .set("name", "o'hara")
        .set("age", 42)
        .and_where(column("id").compare("=", value(1)));

    let prepared = prepare(query);
    assert_eq!(
        prepared.text,
        "update \"t\"\nset \"name\" = 'o''hara', \"age\" = ?\nwhere \"id\" = ?"
    );
    assert_eq!(
        argument_values(&prepared.arguments),
        vec![SqlValue::Int(42), SqlValue::Int(1)]
    );
}

#[test]
fn test_update_without_set_fails() {
    let result = StandardWriter::default().prepare(update("t").into());
    assert!(matches!(
        result,
        Err(queryforge::QueryBuilderError::EmptySetClause)
    ));
}

#[test]
fn test_insert_without_table_fails() {
    let query = queryforge::Insert::default().columns(["a"]).values([1]);
    let result = StandardWriter::default().prepare(query.into());
    assert!(matches!(
        result,
        Err(queryforge::QueryBuilderError::MissingTable {
            statement: "insert"
        })
    ));
}

#[test]
fn test_update_without_table_fails() {
    let query = queryforge::Update::default().set("a", 1);
    let result = StandardWriter::default().prepare(query.into());
    assert!(matches!(
        result,
        Err(queryforge::QueryBuilderError::MissingTable {
            statement: "update"
        })
    ));
}

#[test]
fn test_delete_without_table_fails() {
    let query = queryforge::Delete::default().and_where(column("a").compare("=", value(1)));
    let result = StandardWriter::default().prepare(query.into());
    assert!(matches!(
        result,
        Err(queryforge::QueryBuilderError::MissingTable {
            statement: "delete"
        })
    ));
}

#[test]
fn test_union_and_for_update() {
    let query = select()
        .column(column("a"))
        .from(table("t"))
        .union(select().column(column("a")).from(table("u")))
        .for_update();

    let prepared = prepare(query);
    assert_eq!(
        prepared.text,
        "select \"a\"\nfrom \"t\"\nunion\nselect \"a\"\nfrom \"u\"\nfor update"
    );
}

#[test]
fn test_cross_join_on_empty_condition() {
    let query = select()
        .column(column("a"))
        .from(table("t"))
        .join(JoinMode::Inner, table("u"), Where::and());

    let prepared = prepare(query);
    assert_eq!(prepared.text, "select \"a\"\nfrom \"t\"\ncross join \"u\"");
}

#[test]
fn test_query_identifier_flows_into_sql_string() {
    let query = select()
        .column(column("a"))
        .from(table("t"))
        .identified_by("list-a");

    let prepared = prepare(query);
    assert_eq!(prepared.identifier.as_deref(), Some("list-a"));
}

#[test]
fn test_prepared_input_returned_as_is() {
    let writer = StandardWriter::default();
    let prepared = writer
        .prepare(select().column(column("a")).from(table("t")).into())
        .unwrap();
    let again = writer.prepare(prepared.clone().into()).unwrap();
    assert_eq!(again, prepared);
}
