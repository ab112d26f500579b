//! Benchmarks for execution pricing

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kalshi_book::orderbook::{pricing, Cents, PriceLevel, PriceLevelBook};

/// A full book: one level at every price from 1 to 99
fn deep_book() -> PriceLevelBook {
    (1..=99u8)
        .filter_map(|p| Cents::new(p).ok())
        .map(|price| PriceLevel::new(price, 1000 + u64::from(price.value()) * 10))
        .collect()
}

fn benchmark_best_execution_price(c: &mut Criterion) {
    let book = deep_book();

    c.bench_function("best_execution_price_shallow", |b| {
        b.iter(|| pricing::best_execution_price(black_box(&book), black_box(500)))
    });

    c.bench_function("best_execution_price_full_walk", |b| {
        b.iter(|| pricing::best_execution_price(black_box(&book), black_box(100_000)))
    });
}

fn benchmark_depth_queries(c: &mut Criterion) {
    let book = deep_book();
    let limit = Cents::new(50).unwrap_or(Cents::PAR);

    c.bench_function("total_liquidity", |b| {
        b.iter(|| pricing::total_liquidity(black_box(&book)))
    });

    c.bench_function("offers_under_limit", |b| {
        b.iter(|| pricing::offers_under_limit(black_box(&book), black_box(limit)))
    });
}

fn benchmark_apply_delta(c: &mut Criterion) {
    let price = Cents::new(42).unwrap_or(Cents::PAR);

    c.bench_function("apply_delta_add_remove", |b| {
        let mut book = deep_book();
        b.iter(|| {
            let _ = book.apply_delta(black_box(price), 5);
            let _ = book.apply_delta(black_box(price), -5);
        })
    });
}

criterion_group!(
    benches,
    benchmark_best_execution_price,
    benchmark_depth_queries,
    benchmark_apply_delta
);
criterion_main!(benches);
