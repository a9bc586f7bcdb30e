//! FILENAME: core/order-pivot/src/export.rs
//! Export Preparation - plain rows for external file writers.
//!
//! Exports always cover the whole tree, whatever the caller's current
//! expansion state. Bookkeeping fields (`_nodeId`, `_level`, ...) are
//! stripped; writers receive ordered column/value pairs only.

use std::borrow::Cow;
use std::io::Write;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::ExportError;
use crate::tree::PivotTree;
use crate::view::{flatten, FlatRow, RowValue};

/// One exported row: column name to value, in display order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlainRow(pub Vec<(Cow<'static, str>, RowValue)>);

impl PlainRow {
    pub fn get(&self, column: &str) -> Option<&RowValue> {
        self.0.iter().find(|(key, _)| key == column).map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_ref())
    }
}

impl From<&FlatRow<'_>> for PlainRow {
    fn from(row: &FlatRow<'_>) -> Self {
        PlainRow(row.cells())
    }
}

impl Serialize for PlainRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// An external writer (delimited text, spreadsheet, document capture, ...).
pub trait ExportSink {
    fn write_rows(&mut self, rows: &[PlainRow], filename: &str) -> Result<(), ExportError>;
}

/// Flattens the fully expanded tree and strips bookkeeping fields.
pub fn prepare_export_rows(tree: &PivotTree<'_>) -> Vec<PlainRow> {
    let expanded = tree.expand_all();
    flatten(tree, &expanded).iter().map(PlainRow::from).collect()
}

/// Prepares every row of `tree` and hands them to `sink`.
///
/// Returns the number of rows written. An empty tree is rejected with
/// `NoDataToExport` before the sink is called.
pub fn export_tree<K: ExportSink + ?Sized>(
    tree: &PivotTree<'_>,
    sink: &mut K,
    filename: &str,
) -> Result<usize, ExportError> {
    let rows = prepare_export_rows(tree);
    if rows.is_empty() {
        return Err(ExportError::NoDataToExport);
    }
    sink.write_rows(&rows, filename)?;
    log::info!("exported {} pivot rows to '{}'", rows.len(), filename);
    Ok(rows.len())
}

/// Writes rows as a JSON array of objects.
pub struct JsonRowsSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonRowsSink<W> {
    pub fn new(writer: W) -> Self {
        JsonRowsSink { writer, pretty: false }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ExportSink for JsonRowsSink<W> {
    fn write_rows(&mut self, rows: &[PlainRow], _filename: &str) -> Result<(), ExportError> {
        if rows.is_empty() {
            return Err(ExportError::NoDataToExport);
        }
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, rows)?;
        } else {
            serde_json::to_writer(&mut self.writer, rows)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AggregationField, GroupField, Measure, Reducer};
    use crate::grouping::build_tree;
    use sales_records::SalesOrder;

    /// Records what it was handed.
    #[derive(Default)]
    struct CollectingSink {
        rows: Vec<PlainRow>,
        filename: String,
    }

    impl ExportSink for CollectingSink {
        fn write_rows(&mut self, rows: &[PlainRow], filename: &str) -> Result<(), ExportError> {
            self.rows = rows.to_vec();
            self.filename = filename.to_string();
            Ok(())
        }
    }

    /// Stands in for an image-capture writer whose target is missing.
    struct CaptureSink;

    impl ExportSink for CaptureSink {
        fn write_rows(&mut self, _rows: &[PlainRow], _filename: &str) -> Result<(), ExportError> {
            Err(ExportError::MissingRenderTarget("pivot-table".to_string()))
        }
    }

    fn orders() -> Vec<SalesOrder> {
        vec![
            SalesOrder::new("SO-1", "Acme").with_total(10.0),
            SalesOrder::new("SO-2", "Beta").with_total(20.0),
            SalesOrder::new("SO-3", "Acme").with_total(30.0),
        ]
    }

    #[test]
    fn test_export_ignores_collapse_state_and_strips_bookkeeping() {
        let data = orders();
        let sum = AggregationField::new(Measure::TotalAmount, Reducer::Sum);
        let tree = build_tree(&data, &[GroupField::Customer], &[sum]);

        let mut sink = CollectingSink::default();
        let written = export_tree(&tree, &mut sink, "orders.csv").unwrap();

        assert_eq!(written, 5);
        assert_eq!(sink.filename, "orders.csv");
        for row in &sink.rows {
            assert!(row.columns().all(|c| !c.starts_with('_')));
        }
        assert_eq!(sink.rows[0].get("customer"), Some(&RowValue::text("Acme")));
        assert_eq!(sink.rows[0].get("sum_totalAmount"), Some(&RowValue::Number(40.0)));
        assert_eq!(sink.rows[1].get("orderNumber"), Some(&RowValue::text("SO-1")));
    }

    #[test]
    fn test_empty_tree_is_rejected() {
        let data = orders();
        let tree = build_tree(&data, &[], &[]);
        let mut sink = CollectingSink::default();

        let err = export_tree(&tree, &mut sink, "orders.xlsx").unwrap_err();
        assert!(matches!(err, ExportError::NoDataToExport));
        assert!(sink.rows.is_empty());
    }

    #[test]
    fn test_sink_failure_propagates() {
        let data = orders();
        let tree = build_tree(&data, &[GroupField::Customer], &[]);
        let err = export_tree(&tree, &mut CaptureSink, "orders.pdf").unwrap_err();
        assert!(matches!(err, ExportError::MissingRenderTarget(_)));
        assert_eq!(err.to_string(), "Render target not found: pivot-table");
    }

    #[test]
    fn test_json_sink_writes_plain_objects() {
        let data = orders();
        let tree = build_tree(&data, &[GroupField::Customer], &[]);
        let mut sink = JsonRowsSink::new(Vec::new());
        export_tree(&tree, &mut sink, "orders.json").unwrap();

        let written: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
        let rows = written.as_array().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0]["customer"], "Acme");
        assert_eq!(rows[0]["count"], 2.0);
        assert!(rows[0].get("_nodeId").is_none());
    }

    #[test]
    fn test_dyn_sink() {
        let data = orders();
        let tree = build_tree(&data, &[GroupField::Customer], &[]);
        let mut sink: Box<dyn ExportSink> = Box::new(CollectingSink::default());
        assert_eq!(export_tree(&tree, sink.as_mut(), "orders.csv").unwrap(), 5);
    }
}
