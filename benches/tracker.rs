use chrono::Utc;
use comment_checker_hooks::{Mutation, PendingCall, PendingCallTracker};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn edit_call(i: usize) -> PendingCall {
    PendingCall::new(
        format!("src/module_{i}.rs"),
        Mutation::Edit {
            old_string: "let x = 1;".to_string(),
            new_string: "let x = 1; // why".to_string(),
        },
        "bench-session",
    )
}

fn benchmark_record_take(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_take");

    for prefill in [0usize, 1_000, 10_000] {
        let tracker = PendingCallTracker::new();
        for i in 0..prefill {
            tracker.record(&format!("idle-{i}"), edit_call(i));
        }

        group.bench_with_input(BenchmarkId::new("prefilled", prefill), &prefill, |b, _| {
            b.iter(|| {
                tracker.record("hot", edit_call(0));
                black_box(tracker.take(black_box("hot")))
            })
        });
    }

    group.finish();
}

fn benchmark_sweep(c: &mut Criterion) {
    c.bench_function("sweep_10k_fresh", |b| {
        let tracker = PendingCallTracker::new();
        for i in 0..10_000 {
            tracker.record(&format!("c{i}"), edit_call(i));
        }
        b.iter(|| black_box(tracker.sweep(Utc::now())))
    });
}

criterion_group!(benches, benchmark_record_take, benchmark_sweep);
criterion_main!(benches);
