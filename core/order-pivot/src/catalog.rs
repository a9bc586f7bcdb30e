//! FILENAME: core/order-pivot/src/catalog.rs
//! Field Catalog - every group dimension and measure the engine understands.
//!
//! Dimensions and measures are closed enums. Adding a field means adding a
//! variant, which forces the extractor in `extract.rs` to handle it.

use std::borrow::Cow;
use serde::{Deserialize, Serialize};

// ============================================================================
// FIELD TYPES
// ============================================================================

/// How a date dimension is bucketed and labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFormat {
    /// One bucket per calendar day ("2024-01-05").
    Full,
    /// One bucket per calendar month ("January 2024").
    MonthYear,
    /// One bucket per year ("2024").
    Year,
}

/// Value type of a group dimension. Selects the sibling comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Number,
    Date(DateFormat),
}

// ============================================================================
// GROUP FIELDS
// ============================================================================

/// A selectable grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupField {
    Customer,
    Status,
    SalesPerson,
    Region,
    OrderDate,
    OrderMonth,
    OrderYear,
    LineCount,
}

impl GroupField {
    /// The full catalog, in the order a field picker lists it.
    pub const ALL: [GroupField; 8] = [
        GroupField::Customer,
        GroupField::Status,
        GroupField::SalesPerson,
        GroupField::Region,
        GroupField::OrderDate,
        GroupField::OrderMonth,
        GroupField::OrderYear,
        GroupField::LineCount,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            GroupField::Customer => "customer",
            GroupField::Status => "status",
            GroupField::SalesPerson => "salesPerson",
            GroupField::Region => "region",
            GroupField::OrderDate => "orderDate",
            GroupField::OrderMonth => "orderMonth",
            GroupField::OrderYear => "orderYear",
            GroupField::LineCount => "lineCount",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupField::Customer => "Customer",
            GroupField::Status => "Status",
            GroupField::SalesPerson => "Sales Person",
            GroupField::Region => "Region",
            GroupField::OrderDate => "Order Date",
            GroupField::OrderMonth => "Order Month",
            GroupField::OrderYear => "Order Year",
            GroupField::LineCount => "Line Items",
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            GroupField::Customer
            | GroupField::Status
            | GroupField::SalesPerson
            | GroupField::Region => FieldType::Text,
            GroupField::OrderDate => FieldType::Date(DateFormat::Full),
            GroupField::OrderMonth => FieldType::Date(DateFormat::MonthYear),
            GroupField::OrderYear => FieldType::Date(DateFormat::Year),
            GroupField::LineCount => FieldType::Number,
        }
    }

    /// Resolves a catalog key. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<GroupField> {
        GroupField::ALL.iter().copied().find(|f| f.key() == key)
    }
}

// ============================================================================
// MEASURES AND REDUCERS
// ============================================================================

/// A numeric value that can be read from (or computed on) an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Measure {
    TotalAmount,
    TaxAmount,
    DiscountAmount,
    /// Summed across the order's line items.
    Quantity,
}

impl Measure {
    pub const ALL: [Measure; 4] = [
        Measure::TotalAmount,
        Measure::TaxAmount,
        Measure::DiscountAmount,
        Measure::Quantity,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Measure::TotalAmount => "totalAmount",
            Measure::TaxAmount => "taxAmount",
            Measure::DiscountAmount => "discountAmount",
            Measure::Quantity => "quantity",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Measure::TotalAmount => "Total Amount",
            Measure::TaxAmount => "Tax Amount",
            Measure::DiscountAmount => "Discount Amount",
            Measure::Quantity => "Quantity",
        }
    }

    pub fn from_key(key: &str) -> Option<Measure> {
        Measure::ALL.iter().copied().find(|m| m.key() == key)
    }
}

/// Reduction applied to the extracted values of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Reducer {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl Reducer {
    pub const ALL: [Reducer; 5] = [
        Reducer::Sum,
        Reducer::Count,
        Reducer::Avg,
        Reducer::Min,
        Reducer::Max,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Reducer::Sum => "sum",
            Reducer::Count => "count",
            Reducer::Avg => "avg",
            Reducer::Min => "min",
            Reducer::Max => "max",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Reducer::Sum => "Sum",
            Reducer::Count => "Count",
            Reducer::Avg => "Average",
            Reducer::Min => "Min",
            Reducer::Max => "Max",
        }
    }

    pub fn from_key(key: &str) -> Option<Reducer> {
        Reducer::ALL.iter().copied().find(|r| r.key() == key)
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Reducer::Sum
    }
}

// ============================================================================
// AGGREGATION FIELDS
// ============================================================================

/// A selectable measure: a value plus the reducer applied to it.
///
/// Several fields may share a measure; the pair is the identity, so
/// "Order Count" and "Average Order Value" never overwrite each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AggregationField {
    pub measure: Measure,
    pub reducer: Reducer,
}

impl AggregationField {
    /// Labelled measures offered by the field picker.
    pub const CATALOG: [(AggregationField, &'static str); 8] = [
        (AggregationField::new(Measure::TotalAmount, Reducer::Sum), "Total Sales"),
        (AggregationField::new(Measure::TotalAmount, Reducer::Count), "Order Count"),
        (AggregationField::new(Measure::TotalAmount, Reducer::Avg), "Average Order Value"),
        (AggregationField::new(Measure::TotalAmount, Reducer::Max), "Largest Order"),
        (AggregationField::new(Measure::TotalAmount, Reducer::Min), "Smallest Order"),
        (AggregationField::new(Measure::Quantity, Reducer::Sum), "Units Sold"),
        (AggregationField::new(Measure::TaxAmount, Reducer::Sum), "Tax Collected"),
        (AggregationField::new(Measure::DiscountAmount, Reducer::Sum), "Discounts Given"),
    ];

    pub const fn new(measure: Measure, reducer: Reducer) -> Self {
        AggregationField { measure, reducer }
    }

    /// Composite key, e.g. `sum_totalAmount`. Used as the column name.
    pub fn key(&self) -> String {
        format!("{}_{}", self.reducer.key(), self.measure.key())
    }

    pub fn label(&self) -> Cow<'static, str> {
        match AggregationField::CATALOG.iter().find(|(f, _)| f == self) {
            Some((_, label)) => Cow::Borrowed(*label),
            None => Cow::Owned(format!("{} of {}", self.reducer.label(), self.measure.label())),
        }
    }

    /// Resolves a `(measure key, reducer key)` pair.
    pub fn from_keys(measure: &str, reducer: &str) -> Option<AggregationField> {
        Some(AggregationField::new(Measure::from_key(measure)?, Reducer::from_key(reducer)?))
    }
}
