//! FILENAME: core/order-pivot/src/extract.rs
//! Value Extractor - maps an order to a group value or a measure value.
//!
//! Extraction never fails. Missing dimensions become `GroupValue::Unknown`,
//! missing measures become `None` (skipped by the reducers), and lookups by
//! an unrecognized string key degrade to "Unknown" / `0`.

use std::cmp::Ordering;
use chrono::{Datelike, NaiveDate};
use sales_records::SalesOrder;
use serde::{Deserialize, Serialize};

use crate::catalog::{DateFormat, FieldType, GroupField, Measure};

/// Label of the bucket that collects records with no value for a dimension.
pub const UNKNOWN_LABEL: &str = "Unknown";

// ============================================================================
// GROUP VALUES
// ============================================================================

/// f64 with a total order so numeric buckets can be sorted deterministically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// The typed value an order takes for a group dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupValue {
    Text(String),
    Number(OrderedFloat),
    Date(NaiveDate),
    Month { year: i32, month: u32 },
    Year(i32),
    Unknown,
}

impl GroupValue {
    /// Display label. Also the partition key: equal labels share a bucket.
    pub fn label(&self) -> String {
        match self {
            GroupValue::Text(s) => s.clone(),
            GroupValue::Number(n) => format_number(n.0),
            GroupValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            GroupValue::Month { year, month } => match NaiveDate::from_ymd_opt(*year, *month, 1) {
                Some(first) => first.format("%B %Y").to_string(),
                None => UNKNOWN_LABEL.to_string(),
            },
            GroupValue::Year(y) => y.to_string(),
            GroupValue::Unknown => UNKNOWN_LABEL.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, GroupValue::Unknown)
    }
}

/// Renders whole numbers without a trailing ".0".
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Orders two sibling values using the comparator of the field's type.
/// `Unknown` sorts after every concrete value.
pub fn compare_group_values(field_type: FieldType, a: &GroupValue, b: &GroupValue) -> Ordering {
    match (a, b) {
        (GroupValue::Unknown, GroupValue::Unknown) => return Ordering::Equal,
        (GroupValue::Unknown, _) => return Ordering::Greater,
        (_, GroupValue::Unknown) => return Ordering::Less,
        _ => {}
    }

    match field_type {
        FieldType::Text => match (a, b) {
            (GroupValue::Text(ta), GroupValue::Text(tb)) => compare_text(ta, tb),
            _ => a.label().cmp(&b.label()),
        },
        FieldType::Number => match (a, b) {
            (GroupValue::Number(na), GroupValue::Number(nb)) => na.cmp(nb),
            _ => a.label().cmp(&b.label()),
        },
        FieldType::Date(_) => date_sort_key(a).cmp(&date_sort_key(b)),
    }
}

/// Case-insensitive first so "acme" and "Acme" sit together, then exact.
fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

fn date_sort_key(value: &GroupValue) -> (i32, u32, u32) {
    match value {
        GroupValue::Date(d) => (d.year(), d.month(), d.day()),
        GroupValue::Month { year, month } => (*year, *month, 0),
        GroupValue::Year(y) => (*y, 0, 0),
        _ => (i32::MAX, u32::MAX, u32::MAX),
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

fn text_value(value: Option<&str>) -> GroupValue {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => GroupValue::Text(s.to_string()),
        _ => GroupValue::Unknown,
    }
}

fn date_value(date: Option<NaiveDate>, format: DateFormat) -> GroupValue {
    let Some(date) = date else {
        return GroupValue::Unknown;
    };
    match format {
        DateFormat::Full => GroupValue::Date(date),
        DateFormat::MonthYear => GroupValue::Month {
            year: date.year(),
            month: date.month(),
        },
        DateFormat::Year => GroupValue::Year(date.year()),
    }
}

/// Computes the group value of `order` for `field`.
pub fn group_value(order: &SalesOrder, field: GroupField) -> GroupValue {
    match field {
        GroupField::Customer => text_value(Some(&order.customer)),
        GroupField::Status => GroupValue::Text(order.status.label().to_string()),
        GroupField::SalesPerson => text_value(order.sales_person.as_deref()),
        GroupField::Region => text_value(order.region.as_deref()),
        GroupField::OrderDate => date_value(order.order_date, DateFormat::Full),
        GroupField::OrderMonth => date_value(order.order_date, DateFormat::MonthYear),
        GroupField::OrderYear => date_value(order.order_date, DateFormat::Year),
        GroupField::LineCount => GroupValue::Number(OrderedFloat(order.lines.len() as f64)),
    }
}

/// String-keyed variant of [`group_value`]. Unrecognized keys bucket as Unknown.
pub fn group_value_by_key(order: &SalesOrder, key: &str) -> GroupValue {
    match GroupField::from_key(key) {
        Some(field) => group_value(order, field),
        None => GroupValue::Unknown,
    }
}

/// Reads (or computes) a measure. `None` means the order has no value.
///
/// An order without line items has no quantity, so it stays out of the
/// avg/min/max inputs like any other missing measure.
pub fn measure_value(order: &SalesOrder, measure: Measure) -> Option<f64> {
    match measure {
        Measure::TotalAmount => order.total_amount,
        Measure::TaxAmount => order.tax_amount,
        Measure::DiscountAmount => order.discount_amount,
        Measure::Quantity if order.lines.is_empty() => None,
        Measure::Quantity => Some(order.total_quantity()),
    }
}

/// String-keyed variant of [`measure_value`]. Unknown keys and missing values read as 0.
pub fn measure_value_by_key(order: &SalesOrder, key: &str) -> f64 {
    Measure::from_key(key)
        .and_then(|m| measure_value(order, m))
        .unwrap_or(0.0)
}
