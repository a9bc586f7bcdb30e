//! FILENAME: core/order-pivot/benches/pivot_calculations.rs
//! Tree build and projection timings over synthetic order sets.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use order_pivot::{
    build_tree, flatten, prepare_export_rows, AggregationField, ExpandedSet, GroupField, Measure,
    Reducer,
};
use sales_records::{OrderLine, SalesOrder};

const CUSTOMERS: [&str; 6] = ["Acme", "Beta", "Cobalt", "Delta", "Echo", "Foxtrot"];
const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

fn synthetic_orders(n: usize) -> Vec<SalesOrder> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid start date");
    (0..n)
        .map(|i| {
            let mut order = SalesOrder::new(format!("SO-{}", i), CUSTOMERS[i % CUSTOMERS.len()])
                .with_region(REGIONS[(i / 7) % REGIONS.len()])
                .with_total((i % 500) as f64 * 1.25)
                .with_line(OrderLine::new("Widget", (i % 9) as f64, 3.5));
            if let Some(date) = start.checked_add_days(chrono::Days::new((i % 730) as u64)) {
                order = order.with_date(date);
            }
            if i % 3 == 0 {
                order = order.with_tax((i % 50) as f64);
            }
            order
        })
        .collect()
}

fn aggregation_fields() -> Vec<AggregationField> {
    vec![
        AggregationField::new(Measure::TotalAmount, Reducer::Sum),
        AggregationField::new(Measure::TotalAmount, Reducer::Count),
        AggregationField::new(Measure::TotalAmount, Reducer::Avg),
        AggregationField::new(Measure::TaxAmount, Reducer::Max),
        AggregationField::new(Measure::Quantity, Reducer::Sum),
    ]
}

fn bench_build_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tree");
    let fields = [GroupField::OrderYear, GroupField::Region, GroupField::Customer];
    let aggs = aggregation_fields();

    for size in [1_000usize, 10_000, 100_000] {
        let orders = synthetic_orders(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &orders, |b, orders| {
            b.iter(|| build_tree(black_box(orders), &fields, &aggs));
        });
    }
    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let orders = synthetic_orders(100_000);
    let fields = [GroupField::OrderMonth, GroupField::Region, GroupField::Customer];
    let aggs = aggregation_fields();
    let tree = build_tree(&orders, &fields, &aggs);

    let collapsed = ExpandedSet::default();
    let first_level = tree.expand_to_level(1);

    c.bench_function("flatten_collapsed", |b| {
        b.iter(|| flatten(black_box(&tree), &collapsed))
    });
    c.bench_function("flatten_first_level", |b| {
        b.iter(|| flatten(black_box(&tree), &first_level))
    });
    c.bench_function("prepare_export_rows", |b| {
        b.iter(|| prepare_export_rows(black_box(&tree)))
    });
}

criterion_group!(benches, bench_build_tree, bench_flatten);
criterion_main!(benches);
