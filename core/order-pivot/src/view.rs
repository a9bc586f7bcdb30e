//! FILENAME: core/order-pivot/src/view.rs
//! Flatten/Expand Projector - turns a tree plus an expansion set into rows.
//!
//! The projection is depth-first and pre-order. A node's group row is always
//! emitted; what lies below it is emitted only when its id is in the
//! expansion set. The tree itself is never touched by expand/collapse.

use std::borrow::Cow;
use std::collections::HashSet;
use std::hash::BuildHasher;
use sales_records::SalesOrder;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::aggregate::Aggregations;
use crate::catalog::GroupField;
use crate::tree::{NodeContent, NodeId, PivotNode, PivotTree};

// ============================================================================
// ROW VALUES
// ============================================================================

/// A single display value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValue {
    Empty,
    Number(f64),
    Text(String),
}

impl RowValue {
    pub fn text(s: impl Into<String>) -> Self {
        RowValue::Text(s.into())
    }
}

impl From<f64> for RowValue {
    fn from(value: f64) -> Self {
        RowValue::Number(value)
    }
}

impl From<Option<f64>> for RowValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RowValue::Empty, RowValue::Number)
    }
}

// ============================================================================
// FLAT ROWS
// ============================================================================

/// What a row displays.
#[derive(Debug, Clone)]
pub enum RowContent<'a> {
    /// A group header with the node's measures.
    Group {
        group_key: GroupField,
        group_value: &'a str,
        count: usize,
        aggregations: &'a Aggregations,
    },
    /// One raw record under an expanded deepest-level node.
    Leaf(&'a SalesOrder),
}

/// One render-ready row.
#[derive(Debug, Clone)]
pub struct FlatRow<'a> {
    pub node_id: NodeId,
    /// Indentation depth.
    pub level: usize,
    pub is_leaf: bool,
    pub is_parent: bool,
    pub can_expand: bool,
    pub content: RowContent<'a>,
}

impl<'a> FlatRow<'a> {
    fn group(node: &'a PivotNode<'a>) -> Self {
        FlatRow {
            node_id: node.id.clone(),
            level: node.level,
            is_leaf: false,
            is_parent: true,
            can_expand: node.can_expand(),
            content: RowContent::Group {
                group_key: node.group_key,
                group_value: &node.group_value,
                count: node.count,
                aggregations: &node.aggregations,
            },
        }
    }

    fn leaf(parent: &PivotNode<'a>, index: usize, order: &'a SalesOrder) -> Self {
        FlatRow {
            node_id: NodeId::for_leaf(&parent.id, index),
            level: parent.level + 1,
            is_leaf: true,
            is_parent: false,
            can_expand: false,
            content: RowContent::Leaf(order),
        }
    }

    /// The display cells of the row, without the bookkeeping fields.
    pub fn cells(&self) -> Vec<(Cow<'static, str>, RowValue)> {
        match &self.content {
            RowContent::Group {
                group_key,
                group_value,
                count,
                aggregations,
            } => {
                let mut cells = Vec::with_capacity(aggregations.len() + 2);
                cells.push((Cow::Borrowed(group_key.key()), RowValue::text(*group_value)));
                cells.push((Cow::Borrowed("count"), RowValue::Number(*count as f64)));
                for agg in aggregations.iter() {
                    cells.push((Cow::Owned(agg.field.key()), RowValue::Number(agg.value)));
                }
                cells
            }
            RowContent::Leaf(order) => leaf_cells(order),
        }
    }
}

/// The record fields shown on a leaf row.
fn leaf_cells(order: &SalesOrder) -> Vec<(Cow<'static, str>, RowValue)> {
    let date = order
        .order_date
        .map_or(RowValue::Empty, |d| RowValue::Text(d.format("%Y-%m-%d").to_string()));
    vec![
        (Cow::Borrowed("orderNumber"), RowValue::text(order.order_number.as_str())),
        (Cow::Borrowed("customer"), RowValue::text(order.customer.as_str())),
        (Cow::Borrowed("status"), RowValue::text(order.status.label())),
        (Cow::Borrowed("orderDate"), date),
        (Cow::Borrowed("totalAmount"), RowValue::from(order.total_amount)),
        (Cow::Borrowed("taxAmount"), RowValue::from(order.tax_amount)),
    ]
}

impl Serialize for FlatRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let cells = self.cells();
        let mut map = serializer.serialize_map(Some(cells.len() + 5))?;
        map.serialize_entry("_nodeId", &self.node_id)?;
        map.serialize_entry("_level", &self.level)?;
        map.serialize_entry("_isLeaf", &self.is_leaf)?;
        map.serialize_entry("_isParent", &self.is_parent)?;
        map.serialize_entry("_canExpand", &self.can_expand)?;
        for (key, value) in &cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// PROJECTION
// ============================================================================

/// Flattens `tree` into display rows, disclosing the nodes in `expanded`.
///
/// Output depends only on the two inputs, so repeated calls with the same
/// tree and set produce identical rows.
pub fn flatten<'a, S: BuildHasher>(
    tree: &'a PivotTree<'a>,
    expanded: &HashSet<NodeId, S>,
) -> Vec<FlatRow<'a>> {
    let mut rows = Vec::new();
    for node in &tree.nodes {
        flatten_node(node, expanded, &mut rows);
    }
    log::trace!("flattened pivot tree into {} visible rows", rows.len());
    rows
}

fn flatten_node<'a, S: BuildHasher>(
    node: &'a PivotNode<'a>,
    expanded: &HashSet<NodeId, S>,
    rows: &mut Vec<FlatRow<'a>>,
) {
    rows.push(FlatRow::group(node));

    if !expanded.contains(&node.id) {
        return;
    }

    match &node.content {
        NodeContent::Children(children) => {
            for child in children {
                flatten_node(child, expanded, rows);
            }
        }
        NodeContent::Leaves(leaves) => {
            for (index, order) in leaves.iter().copied().enumerate() {
                rows.push(FlatRow::leaf(node, index, order));
            }
        }
    }
}
