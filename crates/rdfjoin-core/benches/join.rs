use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rdfjoin_core::join::{
    ColumnHashJoin, ColumnJoinAlgorithm, HashJoin, JoinAlgorithm, JoinKey, ParallelColumnHashJoin,
    ParallelHashJoin, SortMergeJoin,
};
use rdfjoin_core::model::{DataType, Dictionary, Item};
use rdfjoin_core::table::{Column, ColumnTable, JoinedRow, RowTable};

fn row_relation(rng: &mut StdRng, property: &str, rows: usize, key_space: u64) -> RowTable {
    let mut table = RowTable::default();
    let id = table.intern_property(property);
    for subject in 0..rows as u64 {
        let object = rng.gen_range(0..key_space);
        table.push(JoinedRow::new(subject).with_value(id, Item::new(subject, object, DataType::Object)));
    }
    table
}

fn column_relation(rng: &mut StdRng, property: &str, rows: usize, key_space: u64) -> ColumnTable {
    let mut column = Column::new(Dictionary::new());
    for subject in 0..rows as u64 {
        column.push(Item::new(subject, rng.gen_range(0..key_space), DataType::Object));
    }
    let mut table = ColumnTable::new();
    table.set_column(property, column);
    table
}

fn bench_row_joins(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_join");
    for &size in &[100usize, 1_000, 10_000] {
        let mut rng = StdRng::seed_from_u64(42);
        let follows = row_relation(&mut rng, "wsdbm:follows", size, size as u64 / 2);
        let likes = row_relation(&mut rng, "wsdbm:likes", size / 2, size as u64 / 2);
        let follows_key = JoinKey::object("wsdbm:follows");
        let likes_key = JoinKey::subject("wsdbm:likes");

        group.bench_with_input(BenchmarkId::new("hash", size), &size, |b, _| {
            b.iter(|| {
                HashJoin
                    .join(black_box(&follows), follows_key, black_box(&likes), likes_key)
                    .unwrap()
            })
        });
        group.bench_with_input(BenchmarkId::new("sort_merge", size), &size, |b, _| {
            b.iter(|| {
                SortMergeJoin
                    .join(black_box(&follows), follows_key, black_box(&likes), likes_key)
                    .unwrap()
            })
        });
        group.bench_with_input(BenchmarkId::new("parallel_hash", size), &size, |b, _| {
            let join = ParallelHashJoin::new();
            b.iter(|| {
                join.join(black_box(&follows), follows_key, black_box(&likes), likes_key)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_column_joins(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_join");
    for &size in &[1_000usize, 10_000] {
        let mut rng = StdRng::seed_from_u64(7);
        let follows = column_relation(&mut rng, "wsdbm:follows", size, size as u64 / 2);
        let likes = column_relation(&mut rng, "wsdbm:likes", size / 2, size as u64 / 2);
        let follows_key = JoinKey::object("wsdbm:follows");
        let likes_key = JoinKey::subject("wsdbm:likes");

        group.bench_with_input(BenchmarkId::new("hash", size), &size, |b, _| {
            b.iter(|| {
                ColumnHashJoin
                    .join(black_box(&follows), follows_key, black_box(&likes), likes_key)
                    .unwrap()
            })
        });
        group.bench_with_input(BenchmarkId::new("parallel_hash", size), &size, |b, _| {
            let join = ParallelColumnHashJoin::new();
            b.iter(|| {
                join.join(black_box(&follows), follows_key, black_box(&likes), likes_key)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_row_joins, bench_column_joins);
criterion_main!(benches);
