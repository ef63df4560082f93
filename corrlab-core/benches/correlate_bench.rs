//! Criterion benchmarks for CorrLab hot paths.
//!
//! Benchmarks:
//! 1. Date alignment of two daily series
//! 2. Pearson over pre-aligned samples
//! 3. Full correlate (align + Pearson) across range lengths
//! 4. Synthetic series generation

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use corrlab_core::correlation::{correlate, pearson};
use corrlab_core::data::align::align;
use corrlab_core::data::synthetic::SyntheticGenerator;
use corrlab_core::domain::{DataPoint, SourceId, TimeSeries};
use corrlab_core::rng::SeedHierarchy;

// ── Helpers ──────────────────────────────────────────────────────────

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

/// Daily series with every `gap`-th day missing, so alignment does real work.
fn make_series(n: usize, gap: usize, phase: f64) -> TimeSeries {
    TimeSeries::canonicalize(
        start()
            .iter_days()
            .take(n)
            .enumerate()
            .filter(|(i, _)| gap == 0 || i % gap != 0)
            .map(|(i, date)| DataPoint::new(date, 100.0 + (i as f64 * 0.1 + phase).sin() * 10.0)),
    )
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_align(c: &mut Criterion) {
    let a = make_series(365, 7, 0.0);
    let b = make_series(365, 5, 0.5);
    c.bench_function("align_365d", |bench| {
        bench.iter(|| align(black_box(&a), black_box(&b)))
    });
}

fn bench_pearson(c: &mut Criterion) {
    let samples = align(&make_series(365, 0, 0.0), &make_series(365, 0, 0.3));
    c.bench_function("pearson_365", |bench| {
        bench.iter(|| pearson(black_box(&samples)))
    });
}

fn bench_correlate(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlate");
    for days in [30usize, 90, 365] {
        let a = make_series(days, 7, 0.0);
        let b = make_series(days, 0, 1.0);
        group.bench_with_input(BenchmarkId::from_parameter(days), &days, |bench, _| {
            bench.iter(|| correlate(black_box(&a), black_box(&b)))
        });
    }
    group.finish();
}

fn bench_synthetic(c: &mut Criterion) {
    let synth = SyntheticGenerator::new(SeedHierarchy::new(42));
    let end = NaiveDate::from_ymd_opt(2020, 12, 30).unwrap();
    let mut group = c.benchmark_group("synthetic_365d");
    for source in SourceId::ALL {
        group.bench_function(source.as_str(), |bench| {
            bench.iter(|| synth.series_for(black_box(source), start(), end))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_align,
    bench_pearson,
    bench_correlate,
    bench_synthetic
);
criterion_main!(benches);
