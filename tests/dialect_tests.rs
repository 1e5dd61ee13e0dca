//! Per-dialect divergence tests
//!
//! Checks the rendering hooks each dialect writer overrides: quoting,
//! pagination syntax, FILTER support, constant-table rows, RETURNING and
//! the insert-no-values token.

use pretty_assertions::assert_eq;

use queryforge::expression::builder::{
    column, concat, current_timestamp, insert, random, select, table, update, value,
};
use queryforge::{
    Expression, MariaDBWriter, MySQLWriter, Platform, QueryBuilder, QueryBuilderError,
    SQLServerWriter, SqlValue, SqlWriter, StandardWriter, Where,
};

fn mysql(input: impl Into<queryforge::QueryInput>) -> Result<queryforge::SqlString, QueryBuilderError> {
    MySQLWriter::default().prepare(input.into())
}

fn sqlserver(
    input: impl Into<queryforge::QueryInput>,
) -> Result<queryforge::SqlString, QueryBuilderError> {
    SQLServerWriter::default().prepare(input.into())
}

#[test]
fn test_platform_selects_matching_writer() {
    let query = || select().column(column("a")).from(table("t"));

    let cases = [
        (Platform::PostgreSQL, "select \"a\"\nfrom \"t\""),
        (Platform::MySQL, "select `a`\nfrom `t`"),
        (Platform::MariaDB, "select `a`\nfrom `t`"),
        (Platform::SQLite, "select \"a\"\nfrom \"t\""),
        (Platform::SQLServer, "select [a]\nfrom [t]"),
    ];
    for (platform, expected) in cases {
        let prepared = QueryBuilder::new(platform).prepare(query()).unwrap();
        assert_eq!(prepared.text, expected, "platform {}", platform.tag());
    }
}

#[test]
fn test_mysql_constant_table_rows() {
    let prepared = mysql(insert("t").columns(["a", "b"]).values([1, 2]).values([3, 4])).unwrap();
    assert_eq!(
        prepared.text,
        "insert into `t`\n(`a`, `b`)\nvalues row (?, ?)\n,row (?, ?)"
    );
}

#[test]
fn test_mysql_insert_no_values_token() {
    let prepared = mysql(insert("t")).unwrap();
    assert_eq!(prepared.text, "insert into `t`\n() values ()");
}

#[test]
fn test_mysql_rejects_returning() {
    let result = mysql(
        insert("t")
            .columns(["a"])
            .values([1])
            .returning(column("a")),
    );
    assert!(matches!(
        result,
        Err(QueryBuilderError::UnsupportedFeature {
            feature: "returning",
            dialect: "mysql",
        })
    ));
}

#[test]
fn test_mariadb_accepts_returning() {
    let prepared = MariaDBWriter::default()
        .prepare(
            insert("t")
                .columns(["a"])
                .values([1])
                .returning(column("a"))
                .into(),
        )
        .unwrap();
    assert_eq!(
        prepared.text,
        "insert into `t`\n(`a`)\nvalues row (?)\nreturning `a`"
    );
}

#[test]
fn test_mysql_aggregate_filter_fallback() {
    let aggregate = Expression::Aggregate {
        function: "sum".to_string(),
        column: Some(Box::new(column("amount"))),
        filter: Where::and().condition(column("kind"), "=", value("credit")),
        over: None,
    };
    let prepared = mysql(select().column(aggregate)).unwrap();
    assert_eq!(
        prepared.text,
        "select `sum`(case when `kind` = ? then `amount` end)"
    );
    assert_eq!(
        prepared.arguments.values(),
        vec![&SqlValue::Text("credit".into())]
    );
}

#[test]
fn test_mysql_scalar_functions() {
    let writer = MySQLWriter::default();
    let mut ctx = queryforge::WriterContext::new(writer.converter());

    assert_eq!(
        writer.format(&current_timestamp(), &mut ctx, false).unwrap(),
        "current_timestamp()"
    );
    assert_eq!(writer.format(&random(), &mut ctx, false).unwrap(), "rand()");
    assert_eq!(
        writer
            .format(&concat([column("a"), column("b")]), &mut ctx, false)
            .unwrap(),
        "concat(`a`, `b`)"
    );
    assert_eq!(
        writer
            .format(&column("a").cast_as("bigint"), &mut ctx, false)
            .unwrap(),
        "cast(`a` as signed)"
    );
}

#[test]
fn test_sqlserver_pagination() {
    let query = select()
        .column(column("a"))
        .from(table("t"))
        .order_by(column("a"), queryforge::OrderDirection::Asc)
        .range(10, 20);

    let prepared = sqlserver(query).unwrap();
    assert_eq!(
        prepared.text,
        "select [a]\nfrom [t]\norder by [a] asc\noffset 20 rows fetch next 10 rows only"
    );
}

#[test]
fn test_sqlserver_filter_fallback_and_getdate() {
    let aggregate = Expression::Aggregate {
        function: "count".to_string(),
        column: None,
        filter: Where::and().condition(column("seen_at"), "<", current_timestamp()),
        over: None,
    };
    let prepared = sqlserver(select().column(aggregate)).unwrap();
    assert_eq!(
        prepared.text,
        "select [count](case when [seen_at] < getdate() then 1 end)"
    );
}

#[test]
fn test_sqlserver_rejects_returning() {
    let result = sqlserver(update("t").set("a", 1).returning(column("a")));
    assert!(matches!(
        result,
        Err(QueryBuilderError::UnsupportedFeature {
            feature: "returning",
            dialect: "sqlserver",
        })
    ));
}

#[test]
fn test_merge_update_on_conflict() {
    let query = queryforge::expression::builder::merge("users")
        .columns(["id", "name"])
        .key(["id"])
        .values([SqlValue::Int(1), SqlValue::Text("ann".into())])
        .on_conflict_update();

    let prepared = StandardWriter::default().prepare(query.into()).unwrap();
    assert_eq!(
        prepared.text,
        "merge into \"users\"\n\
         using (values (?, ?)) as \"upsert\"\n\
         on (\"users\".\"id\" = \"upsert\".\"id\")\n\
         when matched then update set \"name\" = \"upsert\".\"name\"\n\
         when not matched then insert (\"id\", \"name\")\nvalues (\"upsert\".\"id\", \"upsert\".\"name\")"
    );
    assert_eq!(
        prepared.arguments.values(),
        vec![&SqlValue::Int(1), &SqlValue::Text("ann".into())]
    );
}

#[test]
fn test_merge_ignore_omits_matched_branch() {
    let query = queryforge::expression::builder::merge("users")
        .columns(["id", "name"])
        .key(["id"])
        .values([SqlValue::Int(1), SqlValue::Text("ann".into())])
        .on_conflict_ignore();

    let prepared = StandardWriter::default().prepare(query.into()).unwrap();
    assert!(!prepared.text.contains("when matched"));
    assert!(prepared.text.contains("when not matched then insert"));
}

#[test]
fn test_merge_without_source_fails() {
    let query = queryforge::expression::builder::merge("users").columns(["id"]);
    let result = StandardWriter::default().prepare(query.into());
    assert!(matches!(result, Err(QueryBuilderError::MissingMergeSource)));
}
