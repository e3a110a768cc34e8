//! Wrapper overhead benchmarks
//!
//! Quantifies what an experiment costs the caller on top of the control
//! itself: a closed gate should be a predicate away from a direct call, an
//! open gate adds the candidate plus aggregation and publish.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ensayo::{AsyncExperiment, Experiment};

fn mix(x: u64) -> Result<u64, String> {
    Ok(x.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(31))
}

fn sync_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync");

    group.bench_function("control_direct", |b| b.iter(|| mix(black_box(7u64))));

    let disabled = Experiment::builder("disabled")
        .control(mix)
        .candidate(mix)
        .enabled(|_| false)
        .publish(|_| ())
        .build()
        .unwrap();
    group.bench_function("wrapped_gate_closed", |b| {
        b.iter(|| disabled.run(black_box(7u64)));
    });

    let enabled = Experiment::builder("enabled")
        .control(mix)
        .candidate(mix)
        .publish(|_| ())
        .build()
        .unwrap();
    group.bench_function("wrapped_gate_open", |b| {
        b.iter(|| enabled.run(black_box(7u64)));
    });

    group.finish();
}

fn async_overhead(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("async");

    let parallel = AsyncExperiment::builder("parallel")
        .control(|x: u64| async move { mix(x) })
        .candidate(|x: u64| async move { mix(x) })
        .publish(|_| ())
        .build()
        .unwrap();
    group.bench_function("wrapped_parallel", |b| {
        b.to_async(&rt)
            .iter(|| async { parallel.run(black_box(7u64)).await });
    });

    group.finish();
}

criterion_group!(benches, sync_overhead, async_overhead);
criterion_main!(benches);
