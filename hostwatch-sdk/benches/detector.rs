use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hostwatch_sdk::{HostStatus, Snapshot, StateStore, TransitionDetector};

fn snapshot(hosts: usize, flip_every: usize) -> Snapshot {
    let mut builder = Snapshot::builder().timestamp_ms(1);
    for i in 0..hosts {
        let status = if flip_every > 0 && i % flip_every == 0 {
            HostStatus::Critical
        } else {
            HostStatus::Ok
        };
        builder = builder.host(format!("host-{i:05}"), status);
    }
    builder.build()
}

/// Benchmark diffing identical snapshots (the common steady state)
fn bench_diff_unchanged(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_unchanged");
    let detector = TransitionDetector::new();

    for hosts in [10usize, 100, 1000].iter() {
        let snap = snapshot(*hosts, 0);
        group.bench_with_input(BenchmarkId::from_parameter(hosts), &snap, |b, snap| {
            b.iter(|| detector.diff_at(black_box(snap), black_box(snap), 0));
        });
    }
    group.finish();
}

/// Benchmark diffing with a share of hosts changing state
fn bench_diff_with_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_with_changes");
    let detector = TransitionDetector::new();

    for hosts in [10usize, 100, 1000].iter() {
        let prev = snapshot(*hosts, 0);
        let cur = snapshot(*hosts, 10);
        group.bench_with_input(
            BenchmarkId::from_parameter(hosts),
            &(prev, cur),
            |b, (prev, cur)| {
                b.iter(|| detector.diff_at(black_box(prev), black_box(cur), 0));
            },
        );
    }
    group.finish();
}

/// Benchmark a full commit (diff + write + queue) against the store
fn bench_commit(c: &mut Criterion) {
    let detector = TransitionDetector::new();
    let store = StateStore::new();
    let a = snapshot(100, 0);
    let b = snapshot(100, 7);
    let mut flip = false;

    c.bench_function("commit_100_hosts", |bench| {
        bench.iter(|| {
            flip = !flip;
            let next = if flip { a.clone() } else { b.clone() };
            store.commit(next, &detector, 0);
            store.get_animation_queue_and_clear()
        });
    });
}

criterion_group!(
    benches,
    bench_diff_unchanged,
    bench_diff_with_changes,
    bench_commit
);
criterion_main!(benches);
