//! # Option-Sync Benchmarks
//!
//! | Area | Operation | Expectation |
//! |------|-----------|-------------|
//! | Ranking | `rank()` over a post's options | linearithmic in option count |
//! | Store | merging one page of patches | linear in page size |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use option_sync::{rank, OptionPatch, OptionStore, VoteOption};
use rand::Rng;

fn random_options(count: u64) -> Vec<VoteOption> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|id| {
            VoteOption::from_patch(
                OptionPatch::new(id)
                    .with_creator(format!("user-{}", rng.gen_range(0..50)))
                    .with_support(rng.gen_range(0..10_000))
                    .supported_by_viewer(rng.gen_bool(0.05))
                    .by_subscriber(rng.gen_bool(0.1)),
            )
        })
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");

    for size in [10u64, 100, 1_000, 10_000] {
        let options = random_options(size);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("rank", size), &options, |b, options| {
            b.iter(|| black_box(rank(options, Some("user-7"))))
        });
    }

    group.finish();
}

fn bench_store_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("option-store");

    for size in [20u64, 100, 500] {
        let patches: Vec<OptionPatch> = (0..size)
            .map(|id| OptionPatch::new(id).with_creator("bench").with_support(id * 3))
            .collect();
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("merge_page", size), &patches, |b, patches| {
            b.iter(|| {
                let mut store = OptionStore::new();
                for patch in patches {
                    store.upsert_unless_deleted(patch.clone());
                }
                // second pass hits the merge path
                for patch in patches {
                    store.upsert_unless_deleted(patch.clone());
                }
                black_box(store.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank, bench_store_merge);
criterion_main!(benches);
