//! FILENAME: core/order-pivot/src/aggregate.rs
//! Aggregation Calculator - reduces a partition to one number per measure.
//!
//! Missing measure values are skipped, never counted as zero. Reducers with
//! no input (avg/min/max over an empty or all-missing partition) yield 0.

use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;
use sales_records::SalesOrder;

use crate::catalog::{AggregationField, Measure, Reducer};
use crate::extract::measure_value;

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// Running state for every reducer over one measure.
#[derive(Debug, Clone, Default)]
pub struct AggregateAccumulator {
    /// Records seen, with or without a value.
    pub rows: u64,
    /// Records that carried a value.
    pub values: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        AggregateAccumulator::default()
    }

    /// Adds one record's extracted value (`None` when it had none).
    pub fn add(&mut self, value: Option<f64>) {
        self.rows += 1;
        let Some(value) = value else {
            return;
        };
        self.values += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Computes the final value for a reducer.
    pub fn compute(&self, reducer: Reducer) -> f64 {
        match reducer {
            Reducer::Sum => self.sum,
            // Count is the partition size regardless of the measure.
            Reducer::Count => self.rows as f64,
            Reducer::Avg => {
                if self.values > 0 {
                    self.sum / self.values as f64
                } else {
                    0.0
                }
            }
            Reducer::Min => self.min.unwrap_or(0.0),
            Reducer::Max => self.max.unwrap_or(0.0),
        }
    }
}

// ============================================================================
// COMPUTED AGGREGATES
// ============================================================================

/// One computed measure of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateValue {
    pub field: AggregationField,
    pub value: f64,
}

/// The computed measures of a node, in definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregations(SmallVec<[AggregateValue; 4]>);

impl Aggregations {
    /// Looks up a measure by its composite identity.
    pub fn get(&self, field: &AggregationField) -> Option<f64> {
        self.0.iter().find(|a| a.field == *field).map(|a| a.value)
    }

    /// Looks up a measure by its composite key (`sum_totalAmount`).
    pub fn get_by_key(&self, key: &str) -> Option<f64> {
        self.0.iter().find(|a| a.field.key() == key).map(|a| a.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregateValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Aggregations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for agg in &self.0 {
            map.serialize_entry(&agg.field.key(), &agg.value)?;
        }
        map.end()
    }
}

/// Computes every configured measure over `records`.
///
/// Fields sharing a measure share one accumulator, so each value is
/// extracted once per record. Repeated fields are kept once, at their
/// first position.
pub fn compute_aggregations(records: &[&SalesOrder], fields: &[AggregationField]) -> Aggregations {
    let mut accumulators: SmallVec<[(Measure, AggregateAccumulator); 4]> =
        SmallVec::new();

    for field in fields {
        if accumulators.iter().any(|(m, _)| *m == field.measure) {
            continue;
        }
        let mut acc = AggregateAccumulator::new();
        for record in records {
            acc.add(measure_value(record, field.measure));
        }
        accumulators.push((field.measure, acc));
    }

    let mut values: SmallVec<[AggregateValue; 4]> = SmallVec::new();
    for field in fields {
        // A repeated field would emit a repeated key.
        if values.iter().any(|a| a.field == *field) {
            continue;
        }
        let value = accumulators
            .iter()
            .find(|(m, _)| *m == field.measure)
            .map(|(_, acc)| acc.compute(field.reducer))
            .unwrap_or(0.0);
        values.push(AggregateValue { field: *field, value });
    }

    Aggregations(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_records::OrderLine;

    fn order(total: Option<f64>) -> SalesOrder {
        let mut o = SalesOrder::new("SO", "Acme");
        o.total_amount = total;
        o
    }

    fn field(reducer: Reducer) -> AggregationField {
        AggregationField::new(Measure::TotalAmount, reducer)
    }

    #[test]
    fn test_reducers_skip_missing_values() {
        let orders = [order(Some(10.0)), order(None), order(Some(30.0))];
        let refs: Vec<&SalesOrder> = orders.iter().collect();
        let fields = Reducer::ALL.map(field);

        let aggs = compute_aggregations(&refs, &fields);
        assert_eq!(aggs.get(&field(Reducer::Sum)), Some(40.0));
        assert_eq!(aggs.get(&field(Reducer::Count)), Some(3.0));
        // Missing values are excluded from the denominator.
        assert_eq!(aggs.get(&field(Reducer::Avg)), Some(20.0));
        assert_eq!(aggs.get(&field(Reducer::Min)), Some(10.0));
        assert_eq!(aggs.get(&field(Reducer::Max)), Some(30.0));
    }

    #[test]
    fn test_all_missing_resolves_to_zero() {
        let orders = [order(None), order(None)];
        let refs: Vec<&SalesOrder> = orders.iter().collect();
        let fields = Reducer::ALL.map(field);

        let aggs = compute_aggregations(&refs, &fields);
        for reducer in [Reducer::Sum, Reducer::Avg, Reducer::Min, Reducer::Max] {
            let value = aggs.get(&field(reducer)).unwrap();
            assert_eq!(value, 0.0, "{:?}", reducer);
            assert!(!value.is_nan());
        }
        assert_eq!(aggs.get(&field(Reducer::Count)), Some(2.0));
    }

    #[test]
    fn test_empty_partition() {
        let aggs = compute_aggregations(&[], &[field(Reducer::Avg), field(Reducer::Count)]);
        assert_eq!(aggs.get(&field(Reducer::Avg)), Some(0.0));
        assert_eq!(aggs.get(&field(Reducer::Count)), Some(0.0));
    }

    #[test]
    fn test_negative_min_max() {
        let orders = [order(Some(-5.0)), order(Some(-1.0))];
        let refs: Vec<&SalesOrder> = orders.iter().collect();
        let aggs = compute_aggregations(&refs, &[field(Reducer::Min), field(Reducer::Max)]);
        assert_eq!(aggs.get(&field(Reducer::Min)), Some(-5.0));
        assert_eq!(aggs.get(&field(Reducer::Max)), Some(-1.0));
    }

    #[test]
    fn test_repeated_field_kept_once() {
        let orders = [order(Some(5.0))];
        let refs: Vec<&SalesOrder> = orders.iter().collect();
        let fields = [field(Reducer::Sum), field(Reducer::Count), field(Reducer::Sum)];

        let aggs = compute_aggregations(&refs, &fields);
        assert_eq!(aggs.len(), 2);
        let keys: Vec<String> = aggs.iter().map(|a| a.field.key()).collect();
        assert_eq!(keys, vec!["sum_totalAmount", "count_totalAmount"]);
    }

    #[test]
    fn test_orders_without_lines_skip_quantity() {
        let with_lines = SalesOrder::new("SO-1", "Acme").with_line(OrderLine::new("Widget", 4.0, 1.0));
        let without = SalesOrder::new("SO-2", "Acme");
        let refs = [&with_lines, &without];
        let qty = |r| AggregationField::new(Measure::Quantity, r);

        let aggs = compute_aggregations(&refs, &[qty(Reducer::Avg), qty(Reducer::Min), qty(Reducer::Count)]);
        assert_eq!(aggs.get(&qty(Reducer::Avg)), Some(4.0));
        assert_eq!(aggs.get(&qty(Reducer::Min)), Some(4.0));
        assert_eq!(aggs.get(&qty(Reducer::Count)), Some(2.0));
    }

    #[test]
    fn test_serializes_as_keyed_map() {
        let orders = [order(Some(100.0)), order(Some(200.0))];
        let refs: Vec<&SalesOrder> = orders.iter().collect();
        let aggs = compute_aggregations(&refs, &[field(Reducer::Sum), field(Reducer::Count)]);

        let json = serde_json::to_value(&aggs).unwrap();
        assert_eq!(json["sum_totalAmount"], 300.0);
        assert_eq!(json["count_totalAmount"], 2.0);
        assert_eq!(aggs.get_by_key("count_totalAmount"), Some(2.0));
        assert_eq!(aggs.len(), 2);
    }
}
