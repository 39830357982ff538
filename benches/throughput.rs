//! Throughput Benchmark for nestkv
//!
//! This benchmark measures the performance of the storage engine
//! under various workloads, with and without open transactions.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use nestkv::commands::CommandHandler;
use nestkv::protocol::parse_command;
use nestkv::storage::{NullAudit, Store, StoreConfig};
use std::sync::Arc;

fn unbounded_store() -> Store {
    let config = StoreConfig {
        max_transaction_depth: 1_000,
        max_db_size: usize::MAX,
    };
    Store::new(config, Arc::new(NullAudit))
}

fn populated_store(keys: usize, distinct_values: usize) -> Store {
    let mut store = unbounded_store();
    for i in 0..keys {
        store
            .set(&format!("key{}", i), &format!("value{}", i % distinct_values))
            .unwrap();
    }
    store
}

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_committed", |b| {
        let mut store = unbounded_store();
        let mut i = 0u64;
        b.iter(|| {
            store.set(&format!("key{}", i), "value").unwrap();
            i += 1;
        });
    });

    group.bench_function("set_in_transaction", |b| {
        let mut store = unbounded_store();
        store.begin().unwrap();
        let mut i = 0u64;
        b.iter(|| {
            store.set(&format!("key{}", i), "value").unwrap();
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let mut store = populated_store(100_000, 100);

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.get(&format!("key{}", i % 100_000)));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.get(&format!("missing{}", i)));
            i += 1;
        });
    });

    // Ten open transactions, each touching a few keys
    for depth in 0..10 {
        store.begin().unwrap();
        for i in 0..10 {
            store.set(&format!("key{}", depth * 10 + i), "shadow").unwrap();
        }
    }

    group.bench_function("get_through_10_frames", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.get(&format!("key{}", i % 100_000)));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark COUNTS and FIND
fn bench_lookups(c: &mut Criterion) {
    let mut store = populated_store(10_000, 100);

    let mut group = c.benchmark_group("lookups");
    group.throughput(Throughput::Elements(1));

    group.bench_function("count_committed", |b| {
        b.iter(|| black_box(store.count_by_value("value7")));
    });

    group.bench_function("find_committed", |b| {
        b.iter(|| black_box(store.find_keys_by_value("value7")));
    });

    for depth in 0..5 {
        store.begin().unwrap();
        for i in 0..50 {
            store.set(&format!("key{}", depth * 50 + i), "value7").unwrap();
        }
        store.unset(&format!("key{}", 1_000 + depth)).unwrap();
    }

    group.bench_function("count_with_5_frames", |b| {
        b.iter(|| black_box(store.count_by_value("value7")));
    });

    group.bench_function("find_with_5_frames", |b| {
        b.iter(|| black_box(store.find_keys_by_value("value7")));
    });

    group.finish();
}

/// Benchmark BEGIN / COMMIT / ROLLBACK cycles
fn bench_transactions(c: &mut Criterion) {
    let mut group = c.benchmark_group("transactions");

    group.bench_function("begin_set_commit", |b| {
        let mut store = populated_store(1_000, 10);
        let mut i = 0u64;
        b.iter(|| {
            store.begin().unwrap();
            store.set(&format!("key{}", i % 1_000), "updated").unwrap();
            store.commit().unwrap();
            i += 1;
        });
    });

    group.bench_function("nested_commit_10", |b| {
        b.iter_batched(
            || populated_store(1_000, 10),
            |mut store| {
                for depth in 0..10 {
                    store.begin().unwrap();
                    store.set(&format!("key{}", depth), "nested").unwrap();
                }
                for _ in 0..10 {
                    store.commit().unwrap();
                }
                black_box(store.db_size())
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("begin_set_rollback", |b| {
        let mut store = populated_store(1_000, 10);
        let mut i = 0u64;
        b.iter(|| {
            store.begin().unwrap();
            store.set(&format!("key{}", i % 1_000), "discarded").unwrap();
            store.rollback().unwrap();
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark parsing and dispatch of a full command line
fn bench_commands(c: &mut Criterion) {
    let mut handler = CommandHandler::new(unbounded_store());

    let mut group = c.benchmark_group("commands");
    group.throughput(Throughput::Elements(1));

    group.bench_function("parse_set", |b| {
        b.iter(|| black_box(parse_command("SET somekey somevalue").unwrap()));
    });

    group.bench_function("parse_and_execute", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let line = if i % 2 == 0 {
                format!("SET key{} value", i % 1_000)
            } else {
                format!("GET key{}", i % 1_000)
            };
            if let Some(command) = parse_command(&line).unwrap() {
                black_box(handler.execute(command));
            }
            i += 1;
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_lookups,
    bench_transactions,
    bench_commands,
);

criterion_main!(benches);
