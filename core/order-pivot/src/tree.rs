//! FILENAME: core/order-pivot/src/tree.rs
//! Pivot Tree Model - the summary tree every consumer reads.
//!
//! Invariants held by construction:
//! - Only the deepest grouping level carries leaves; shallower levels carry children.
//! - A node's `count` is the number of records in its whole subtree.
//! - A node's `level` is its number of ancestors (top-level nodes are level 0).
//! - Node ids are derived from the group path, so rebuilding over the same
//!   data yields the same ids.

use std::fmt;
use rustc_hash::FxHashSet;
use sales_records::SalesOrder;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::aggregate::Aggregations;
use crate::catalog::GroupField;

// ============================================================================
// NODE IDENTITY
// ============================================================================

/// Stable identifier of a tree node (or of a leaf row in a flattened view).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Id of a node one level below `parent` (or top-level when `parent` is None).
    pub fn for_group(parent: Option<&NodeId>, field: GroupField, label: &str) -> NodeId {
        let component = format!("{}:{}", field.key(), escape_component(label));
        match parent {
            Some(parent) => NodeId(format!("{}/{}", parent.0, component)),
            None => NodeId(component),
        }
    }

    /// Id of the `index`-th leaf row under `parent`.
    pub fn for_leaf(parent: &NodeId, index: usize) -> NodeId {
        NodeId(format!("{}/#{}", parent.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}

/// Escapes the separators so distinct label paths never produce the same id.
fn escape_component(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            ':' => out.push_str("%3A"),
            '#' => out.push_str("%23"),
            _ => out.push(c),
        }
    }
    out
}

/// The caller-owned set of expanded node ids.
pub type ExpandedSet = FxHashSet<NodeId>;

// ============================================================================
// NODES
// ============================================================================

/// What sits directly below a node.
#[derive(Debug, Clone)]
pub enum NodeContent<'a> {
    /// Sub-groups for the next grouping level.
    Children(Vec<PivotNode<'a>>),
    /// Raw records, only at the deepest grouping level.
    Leaves(Vec<&'a SalesOrder>),
}

/// One group in the pivot tree.
#[derive(Debug, Clone)]
pub struct PivotNode<'a> {
    pub id: NodeId,
    /// Depth in the tree (0 = top level).
    pub level: usize,
    pub group_key: GroupField,
    /// Formatted group value ("January 2024", "Acme", "Unknown").
    pub group_value: String,
    /// Measures computed over the node's whole partition.
    pub aggregations: Aggregations,
    /// Number of records in the subtree.
    pub count: usize,
    pub content: NodeContent<'a>,
}

impl<'a> PivotNode<'a> {
    pub fn children(&self) -> &[PivotNode<'a>] {
        match &self.content {
            NodeContent::Children(children) => children,
            NodeContent::Leaves(_) => &[],
        }
    }

    pub fn leaves(&self) -> &[&'a SalesOrder] {
        match &self.content {
            NodeContent::Children(_) => &[],
            NodeContent::Leaves(leaves) => leaves,
        }
    }

    /// Whether expanding this node would reveal anything.
    pub fn can_expand(&self) -> bool {
        !self.children().is_empty() || !self.leaves().is_empty()
    }

    /// Appends every record under this node, in tree order.
    fn collect_records(&self, out: &mut Vec<&'a SalesOrder>) {
        match &self.content {
            NodeContent::Children(children) => {
                for child in children {
                    child.collect_records(out);
                }
            }
            NodeContent::Leaves(leaves) => out.extend(leaves.iter().copied()),
        }
    }

    fn collect_ids(&self, max_level: usize, out: &mut Vec<NodeId>) {
        if self.level >= max_level {
            return;
        }
        out.push(self.id.clone());
        for child in self.children() {
            child.collect_ids(max_level, out);
        }
    }

    fn find(&self, id: &NodeId) -> Option<&PivotNode<'a>> {
        if self.id == *id {
            return Some(self);
        }
        // Ids extend their parent's id, so only one branch can match.
        if !id.0.starts_with(self.id.as_str()) {
            return None;
        }
        self.children().iter().find_map(|child| child.find(id))
    }
}

impl Serialize for PivotNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PivotNode", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("groupKey", &self.group_key)?;
        state.serialize_field("groupValue", &self.group_value)?;
        state.serialize_field("aggregations", &self.aggregations)?;
        state.serialize_field("count", &self.count)?;
        match &self.content {
            NodeContent::Children(children) => state.serialize_field("children", children)?,
            NodeContent::Leaves(leaves) => state.serialize_field("leaves", leaves)?,
        }
        state.end()
    }
}

// ============================================================================
// TREE
// ============================================================================

/// The result of grouping a record collection.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTree<'a> {
    /// Top-level groups, sorted.
    pub nodes: Vec<PivotNode<'a>>,
    /// Number of records grouped.
    pub record_count: usize,
    /// Measures computed over every record.
    pub grand_total: Aggregations,
}

impl<'a> PivotTree<'a> {
    /// An empty tree means "nothing to show", not a failure.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node id, pre-order. Used to export regardless of UI collapse state.
    pub fn all_node_ids(&self) -> Vec<NodeId> {
        self.ids_above_level(usize::MAX)
    }

    /// An expansion set that discloses the whole tree.
    pub fn expand_all(&self) -> ExpandedSet {
        self.all_node_ids().into_iter().collect()
    }

    /// An expansion set that discloses the first `depth` levels.
    /// `expand_to_level(1)` opens every top-level node.
    pub fn expand_to_level(&self, depth: usize) -> ExpandedSet {
        self.ids_above_level(depth).into_iter().collect()
    }

    fn ids_above_level(&self, max_level: usize) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for node in &self.nodes {
            node.collect_ids(max_level, &mut ids);
        }
        ids
    }

    pub fn find(&self, id: &NodeId) -> Option<&PivotNode<'a>> {
        self.nodes.iter().find_map(|node| node.find(id))
    }

    /// Every record under the node, in tree order. Empty for an unknown id.
    pub fn drill_down(&self, id: &NodeId) -> Vec<&'a SalesOrder> {
        let mut records = Vec::new();
        if let Some(node) = self.find(id) {
            node.collect_records(&mut records);
        }
        records
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        fn count(node: &PivotNode<'_>) -> usize {
            1 + node.children().iter().map(count).sum::<usize>()
        }
        self.nodes.iter().map(count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_path_derived() {
        let top = NodeId::for_group(None, GroupField::OrderMonth, "January 2024");
        let child = NodeId::for_group(Some(&top), GroupField::Customer, "Acme");
        assert_eq!(top.as_str(), "orderMonth:January 2024");
        assert_eq!(child.as_str(), "orderMonth:January 2024/customer:Acme");
        assert_eq!(NodeId::for_leaf(&child, 3).as_str(), "orderMonth:January 2024/customer:Acme/#3");
    }

    #[test]
    fn test_separators_in_labels_do_not_collide() {
        let a = NodeId::for_group(None, GroupField::Customer, "A/customer:B");
        let parent = NodeId::for_group(None, GroupField::Customer, "A");
        let b = NodeId::for_group(Some(&parent), GroupField::Customer, "B");
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_tree() {
        let tree = PivotTree::default();
        assert!(tree.is_empty());
        assert!(tree.all_node_ids().is_empty());
        assert_eq!(tree.node_count(), 0);
        assert!(tree.drill_down(&NodeId::from("customer:Acme")).is_empty());
    }
}
