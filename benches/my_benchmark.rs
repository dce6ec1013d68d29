use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use minisql::{ColumnDef, DataType, Database, Value};
use std::hint::black_box;
use std::sync::Arc;

fn setup_populated_db(n: usize) -> Database {
    let mut db = Database::new();

    db.create_table(
        "users".into(),
        vec![
            ColumnDef::new("id", DataType::Integer),
            ColumnDef::new("name", DataType::Text),
            ColumnDef::new("age", DataType::Integer),
            ColumnDef::new("score", DataType::Real),
        ],
    )
    .unwrap();

    for i in 0..n {
        let row = vec![
            Value::Integer(i as i64),
            Value::Text(Arc::from(format!("user{}", i).as_str())),
            Value::Integer((i % 100) as i64),
            Value::Real(i as f64 / 10.0),
        ];
        db.insert_row("users", row).unwrap();
    }
    db
}

fn bench_insert_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("Insert_SQL_Pipeline");
    group.bench_function("insert_single_row_sql", |b| {
        let mut db = Database::new();
        db.execute("CREATE TABLE tests (id INTEGER, label TEXT)").unwrap();
        b.iter(|| {
            db.execute(black_box("INSERT INTO tests VALUES (42, 'answer');"))
                .unwrap();
        });
    });
    group.finish();
}

fn bench_select_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Select_Where_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let mut db = setup_populated_db(n);
            b.iter(|| {
                let res = db.execute("SELECT * FROM users WHERE age = 42").unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

fn bench_update_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Update_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_with_setup(
                || setup_populated_db(n),
                |mut db| {
                    db.execute("UPDATE users SET score = 0.5 WHERE age = 7")
                        .unwrap();
                    black_box(db);
                },
            );
        });
    }
    group.finish();
}

fn bench_delete_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Delete_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_with_setup(
                || setup_populated_db(n),
                |mut db| {
                    db.execute("DELETE FROM users WHERE age = 90").unwrap();
                    black_box(db);
                },
            );
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("Persist_Encode");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let db = setup_populated_db(n);
            let mut catalog = minisql::Catalog::new();
            if let Some(table) = db.get_table("users") {
                catalog.insert("users".into(), table.clone());
            }
            b.iter(|| black_box(minisql::persist::encode(&catalog)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_sql,
    bench_select_scaling,
    bench_update_performance,
    bench_delete_performance,
    bench_encode
);
criterion_main!(benches);
