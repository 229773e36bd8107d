//! Benchmarks for indicator computation, scoring and universe analysis.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use swingscan::prelude::*;

/// Generate deterministic pseudo-random daily bars
fn generate_bars(n: usize) -> Vec<Bar> {
  let mut bars = Vec::with_capacity(n);
  let mut price = 100.0;

  for i in 0..n {
    let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
    let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;
    let volume = 10_000.0 + ((i * 11) % 17) as f64 * 1_500.0;

    let o = price;
    let c = (price + change).max(1.0);
    let h = o.max(c) + volatility * 0.5;
    let l = (o.min(c) - volatility * 0.5).max(0.5);

    bars.push(Bar::new(i as i64 * 86_400, o, h, l, c, volume));
    price = c;
  }

  bars
}

fn bench_analyze(c: &mut Criterion) {
  let bars = generate_bars(250);
  let engine = EngineBuilder::new().build().unwrap();

  c.bench_function("analyze_250_bars", |b| {
    b.iter(|| {
      let _ = black_box(engine.analyze(black_box("BBCA"), black_box(&bars)));
    })
  });
}

fn bench_frame(c: &mut Criterion) {
  let engine = EngineBuilder::new().build().unwrap();

  let mut group = c.benchmark_group("indicator_frame");

  for size in [100, 250, 1000, 5000].iter() {
    let bars = generate_bars(*size);

    group.bench_with_input(BenchmarkId::new("compute", size), size, |b, _| {
      b.iter(|| {
        let _ = black_box(engine.compute_frame(black_box(&bars)));
      })
    });
  }

  group.finish();
}

fn bench_reversal(c: &mut Criterion) {
  let bars = generate_bars(250);
  let engine = EngineBuilder::new().build().unwrap();

  c.bench_function("detect_reversal_250_bars", |b| {
    b.iter(|| {
      let _ = black_box(engine.detect_reversal(black_box("BBCA"), black_box(&bars)));
    })
  });
}

fn bench_parallel_analyze(c: &mut Criterion) {
  let series: Vec<(String, Vec<Bar>)> =
    (0..50).map(|i| (format!("SYM{i}"), generate_bars(250 + i))).collect();
  let instruments: Vec<(&str, &[Bar])> =
    series.iter().map(|(t, bars)| (t.as_str(), bars.as_slice())).collect();

  let engine = EngineBuilder::new().build().unwrap();

  c.bench_function("analyze_parallel_50_tickers", |b| {
    b.iter(|| {
      let _ = black_box(analyze_parallel(black_box(&engine), black_box(instruments.clone())));
    })
  });
}

criterion_group!(benches, bench_analyze, bench_frame, bench_reversal, bench_parallel_analyze);
criterion_main!(benches);
