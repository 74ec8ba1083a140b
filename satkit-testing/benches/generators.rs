//! Benchmarks for the synthetic generators

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use satkit::{InstrumentModule, LoadRequest};
use satkit_testing::instruments::Testing2d;
use satkit_testing::{generate_times, Frequency, OrbitDefaults};

fn day_names(count: usize) -> Vec<String> {
    (1..=count)
        .map(|d| format!("2009-01-{:02}.nofile", d))
        .collect()
}

fn bench_signals(c: &mut Criterion) {
    let mut group = c.benchmark_group("signals");

    let offsets: Vec<f64> = (0..86_400).map(|s| s as f64).collect();
    let orbit = OrbitDefaults::default();

    group.throughput(Throughput::Elements(offsets.len() as u64));

    group.bench_function("local_time_one_day", |b| {
        b.iter(|| black_box(orbit.local_time(black_box(86_400.0), &offsets)))
    });

    group.bench_function("orbit_number_one_day", |b| {
        b.iter(|| black_box(orbit.orbit_number(black_box(86_400.0), &offsets)))
    });

    group.finish();
}

fn bench_times(c: &mut Criterion) {
    let mut group = c.benchmark_group("times");

    let fnames = day_names(7);
    group.throughput(Throughput::Elements(7 * 864));

    group.bench_function("generate_times_week_100s", |b| {
        b.iter(|| black_box(generate_times(&fnames, 864, Frequency::seconds(100), None)))
    });

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    let fnames = day_names(1);
    let request = LoadRequest::default();

    group.bench_function("testing2d_one_day", |b| {
        b.iter(|| black_box(Testing2d.load(&fnames, &request)))
    });

    group.finish();
}

criterion_group!(benches, bench_signals, bench_times, bench_load);
criterion_main!(benches);
