//! FILENAME: core/order-pivot/src/lib.rs
//! Hierarchical pivot engine for sales orders.
//!
//! Takes a flat collection of orders plus a selection of group dimensions
//! and measures, and produces a multi-level summary tree that can be
//! incrementally expanded, flattened into display rows, and exported.
//! Every operation is a synchronous pure function over borrowed input.
//!
//! Layers:
//! - `catalog`: The closed set of dimensions and measures (WHAT can be selected)
//! - `extract`: Per-field value extraction and sibling ordering
//! - `definition`: Serializable field selection (what the pivot IS)
//! - `grouping` + `aggregate`: Tree construction (HOW we calculate)
//! - `tree`: The node structure consumers rely on
//! - `view`: Expansion-aware display rows (WHAT we display)
//! - `export`: Plain rows for external writers

pub mod catalog;
pub mod extract;
pub mod aggregate;
pub mod tree;
pub mod grouping;
pub mod definition;
pub mod view;
pub mod export;
pub mod error;


pub use catalog::{AggregationField, DateFormat, FieldType, GroupField, Measure, Reducer};
pub use extract::{group_value, group_value_by_key, measure_value, measure_value_by_key, GroupValue};
pub use aggregate::{compute_aggregations, AggregateValue, Aggregations};
pub use tree::{ExpandedSet, NodeContent, NodeId, PivotNode, PivotTree};
pub use grouping::build_tree;
pub use definition::{DefinitionError, PivotDefinition};
pub use view::{flatten, FlatRow, RowContent, RowValue};
pub use export::{export_tree, prepare_export_rows, ExportSink, JsonRowsSink, PlainRow};
pub use error::ExportError;
