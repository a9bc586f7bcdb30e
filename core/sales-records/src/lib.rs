//! FILENAME: core/sales-records/src/lib.rs
//! Sales order records shared by the pivot engine and its callers.
//!
//! Records arrive wholesale from an external loader (the order service)
//! and are treated as immutable for the duration of a pivot computation.

pub mod order;

pub use order::{OrderLine, OrderStatus, SalesOrder};
