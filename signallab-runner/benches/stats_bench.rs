//! Criterion benchmarks for the analytics hot paths: the statistics
//! fold and the calendar grids over multi-year daily series.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use signallab_runner::calendar::CalendarGrid;
use signallab_runner::ledger::DayPnl;
use signallab_runner::metrics::PerformanceMetrics;

fn make_daily(n: usize) -> Vec<DayPnl> {
    let base = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
    (0..n)
        .map(|i| DayPnl {
            date: base + chrono::Days::new(i as u64),
            pnl: (i as f64 * 0.7).sin() * 5_000.0 - 500.0,
        })
        .collect()
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics_compute");
    for &days in &[252usize, 1260, 2520] {
        let daily = make_daily(days);
        group.bench_with_input(BenchmarkId::from_parameter(days), &daily, |b, daily| {
            b.iter(|| PerformanceMetrics::compute(black_box(daily), black_box(1_000_000.0)));
        });
    }
    group.finish();
}

fn bench_grids(c: &mut Criterion) {
    let daily = make_daily(2520);
    c.bench_function("weekday_grid_10y", |b| {
        b.iter(|| CalendarGrid::by_weekday(black_box(&daily)));
    });
    c.bench_function("month_grid_10y", |b| {
        b.iter(|| CalendarGrid::by_month(black_box(&daily)));
    });
}

criterion_group!(benches, bench_metrics, bench_grids);
criterion_main!(benches);
