//! Benchmarks for the record and collect hot paths.

use criterion::{Criterion, criterion_group, criterion_main};
use opentelemetry_wire_aggregation::{
    Aggregator, AggregatorKind, DoubleSumAggregator, InstrumentValueType, Labels,
    LongLastValueAggregator, LongSumAggregator, LongSummaryAggregator,
};
use std::hint::black_box;

fn bench_record(c: &mut Criterion) {
    let long_sum = LongSumAggregator::default();
    let double_sum = DoubleSumAggregator::default();
    let last_value = LongLastValueAggregator::default();
    let summary = LongSummaryAggregator::default();
    let any = AggregatorKind::Sum.create(InstrumentValueType::Long);

    c.bench_function("LongSumAggregator::record_long", |b| {
        b.iter(|| long_sum.record_long(black_box(1)))
    });
    c.bench_function("DoubleSumAggregator::record_double", |b| {
        b.iter(|| double_sum.record_double(black_box(0.5)))
    });
    c.bench_function("LongLastValueAggregator::record_long", |b| {
        b.iter(|| last_value.record_long(black_box(42)))
    });
    c.bench_function("LongSummaryAggregator::record_long", |b| {
        b.iter(|| summary.record_long(black_box(17)))
    });
    c.bench_function("AnyAggregator::record_long", |b| {
        b.iter(|| any.record_long(black_box(1)))
    });
}

fn bench_collect(c: &mut Criterion) {
    let summary = LongSummaryAggregator::default();
    let labels = Labels::new().with("route", "/users").with("method", "GET");

    c.bench_function("LongSummaryAggregator::merge_and_point", |b| {
        b.iter(|| {
            summary.record_long(5).unwrap();
            let window = summary.empty();
            summary.merge_to_and_reset(&window).unwrap();
            window.to_point(0, 1, black_box(&labels))
        })
    });
}

criterion_group!(benches, bench_record, bench_collect);
criterion_main!(benches);
