//! FILENAME: core/sales-records/src/order.rs
//! Sales order and line item types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// ORDER STATUS
// ============================================================================

/// Lifecycle state of a sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Display label shown in group rows and leaf rows.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "Draft",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Draft
    }
}

// ============================================================================
// LINE ITEMS
// ============================================================================

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
}

impl OrderLine {
    pub fn new(product: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        OrderLine {
            product: product.into(),
            quantity,
            unit_price,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

// ============================================================================
// SALES ORDER
// ============================================================================

/// A single sales order as delivered by the loader.
///
/// Optional fields mirror values the order service may omit. The pivot
/// engine buckets missing dimensions as "Unknown" and skips missing
/// measures when reducing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    pub order_number: String,

    pub customer: String,

    #[serde(default)]
    pub status: OrderStatus,

    /// Account owner. Unassigned orders have none.
    #[serde(default)]
    pub sales_person: Option<String>,

    /// Shipping region.
    #[serde(default)]
    pub region: Option<String>,

    /// Date the order was placed. Drafts may not have one yet.
    #[serde(default)]
    pub order_date: Option<NaiveDate>,

    /// Order total including tax. Absent until the order is priced.
    #[serde(default)]
    pub total_amount: Option<f64>,

    #[serde(default)]
    pub tax_amount: Option<f64>,

    #[serde(default)]
    pub discount_amount: Option<f64>,

    #[serde(default)]
    pub lines: Vec<OrderLine>,
}

impl SalesOrder {
    /// Creates an order with only the identifying fields set.
    pub fn new(order_number: impl Into<String>, customer: impl Into<String>) -> Self {
        SalesOrder {
            order_number: order_number.into(),
            customer: customer.into(),
            status: OrderStatus::default(),
            sales_person: None,
            region: None,
            order_date: None,
            total_amount: None,
            tax_amount: None,
            discount_amount: None,
            lines: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.order_date = Some(date);
        self
    }

    pub fn with_total(mut self, total: f64) -> Self {
        self.total_amount = Some(total);
        self
    }

    pub fn with_tax(mut self, tax: f64) -> Self {
        self.tax_amount = Some(tax);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_sales_person(mut self, name: impl Into<String>) -> Self {
        self.sales_person = Some(name.into());
        self
    }

    pub fn with_line(mut self, line: OrderLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Sum of quantities across all line items.
    pub fn total_quantity(&self) -> f64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}
