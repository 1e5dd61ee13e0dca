//! Performance benchmarks
//!
//! Measures query rendering performance including:
//! - Simple statement preparation
//! - Composed statements with joins, grouping and subqueries
//! - Raw-SQL placeholder parsing
//! - Dialect-specific rendering

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use queryforge::expression::builder::{column, insert, raw, select, table, table_column, value};
use queryforge::{Argument, Platform, QueryBuilder, Select};

fn simple_query() -> Select {
    select()
        .column(column("name"))
        .column(column("age"))
        .from(table("users"))
        .and_where(column("age").compare(">", value(18)))
}

fn composed_query() -> Select {
    select()
        .with("recent", select().column(column("*")).from(table("events")))
        .column(column("kind"))
        .column_as(column("user_id"), "uid")
        .from(table("recent"))
        .join_inner(
            table("users"),
            queryforge::Where::and().condition(
                table_column("recent", "user_id"),
                "=",
                table_column("users", "id"),
            ),
        )
        .and_where(column("kind").compare("<>", value("noise")))
        .and_where(column("user_id").compare("in", select().column(column("id")).from(table("admins"))))
        .group_by(column("kind"))
        .order_by(column("kind"), queryforge::OrderDirection::Asc)
        .range(100, 0)
}

/// Simple statement benchmark
fn benchmark_simple_prepare(c: &mut Criterion) {
    let builder = QueryBuilder::new(Platform::PostgreSQL);

    c.bench_function("simple prepare", |b| {
        b.iter(|| builder.prepare(black_box(simple_query())))
    });
}

/// Composed statement benchmark
fn benchmark_composed_prepare(c: &mut Criterion) {
    let builder = QueryBuilder::new(Platform::PostgreSQL);

    c.bench_function("composed prepare", |b| {
        b.iter(|| builder.prepare(black_box(composed_query())))
    });
}

/// Raw placeholder parsing benchmark
fn benchmark_raw_parsing(c: &mut Criterion) {
    let builder = QueryBuilder::new(Platform::PostgreSQL);
    let template =
        "select * from t where a = ? and b = ?::int and note = 'literal ? stays' and c = ??";

    c.bench_function("raw placeholder parsing", |b| {
        b.iter(|| {
            builder.prepare(black_box(raw(
                template,
                [Argument::from(1), Argument::from("2"), Argument::from(3)],
            )))
        })
    });
}

/// Insert with a large constant table
fn benchmark_bulk_insert(c: &mut Criterion) {
    let builder = QueryBuilder::new(Platform::PostgreSQL);

    c.bench_function("bulk insert prepare", |b| {
        b.iter(|| {
            let mut query = insert("t").columns(["a", "b", "c"]);
            for row in 0..100i64 {
                query = query.values([row, row + 1, row + 2]);
            }
            builder.prepare(black_box(query))
        })
    });
}

/// Performance comparison by dialect
fn benchmark_dialects(c: &mut Criterion) {
    let mut group = c.benchmark_group("dialect_comparison");

    for platform in [
        Platform::PostgreSQL,
        Platform::MySQL,
        Platform::SQLite,
        Platform::SQLServer,
    ] {
        let builder = QueryBuilder::new(platform);
        group.bench_with_input(
            BenchmarkId::new(platform.tag(), "composed"),
            &platform,
            |b, _| b.iter(|| builder.prepare(black_box(composed_query()))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_simple_prepare,
    benchmark_composed_prepare,
    benchmark_raw_parsing,
    benchmark_bulk_insert,
    benchmark_dialects
);
criterion_main!(benches);
