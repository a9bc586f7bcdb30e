//! FILENAME: core/order-pivot/src/grouping.rs
//! Grouping Engine - recursively partitions records into a pivot tree.
//!
//! Algorithm:
//! 1. At level L, extract every record's value for the L-th group field
//! 2. Partition records by the value's label (equal labels share a bucket)
//! 3. Sort partitions with the field type's comparator
//! 4. Build one node per partition, aggregating over the whole partition
//! 5. Recurse for the next field, or attach the records as leaves at the last level

use rustc_hash::FxHashMap;
use sales_records::SalesOrder;

use crate::aggregate::compute_aggregations;
use crate::catalog::{AggregationField, GroupField};
use crate::extract::{compare_group_values, group_value, GroupValue};
use crate::tree::{NodeContent, NodeId, PivotNode, PivotTree};

/// Records that share a group value at one level.
struct Partition<'a> {
    value: GroupValue,
    label: String,
    records: Vec<&'a SalesOrder>,
}

/// Builds the pivot tree for `records`.
///
/// The tree depth equals `group_fields.len()`. With no group fields the
/// tree is empty.
pub fn build_tree<'a>(
    records: &'a [SalesOrder],
    group_fields: &[GroupField],
    aggregation_fields: &[AggregationField],
) -> PivotTree<'a> {
    let all: Vec<&'a SalesOrder> = records.iter().collect();
    let grand_total = compute_aggregations(&all, aggregation_fields);

    if group_fields.is_empty() {
        log::debug!("no group fields selected; returning empty tree");
        return PivotTree {
            nodes: Vec::new(),
            record_count: records.len(),
            grand_total,
        };
    }

    let nodes = build_level(all, group_fields, aggregation_fields, 0, None);

    log::debug!(
        "built pivot tree: {} records, {} levels, {} top-level groups",
        records.len(),
        group_fields.len(),
        nodes.len()
    );

    PivotTree {
        nodes,
        record_count: records.len(),
        grand_total,
    }
}

/// Builds the sibling nodes for one grouping level.
fn build_level<'a>(
    records: Vec<&'a SalesOrder>,
    group_fields: &[GroupField],
    aggregation_fields: &[AggregationField],
    level: usize,
    parent: Option<&NodeId>,
) -> Vec<PivotNode<'a>> {
    let Some(&field) = group_fields.get(level) else {
        return Vec::new();
    };
    let is_last = level + 1 == group_fields.len();

    let partitions = partition(records, field);

    partitions
        .into_iter()
        .map(|part| {
            let id = NodeId::for_group(parent, field, &part.label);
            let aggregations = compute_aggregations(&part.records, aggregation_fields);
            let count = part.records.len();

            let content = if is_last {
                NodeContent::Leaves(part.records)
            } else {
                NodeContent::Children(build_level(
                    part.records,
                    group_fields,
                    aggregation_fields,
                    level + 1,
                    Some(&id),
                ))
            };

            PivotNode {
                id,
                level,
                group_key: field,
                group_value: part.label,
                aggregations,
                count,
                content,
            }
        })
        .collect()
}

/// Splits records into sorted partitions for `field`.
///
/// Records keep their input order inside a partition.
fn partition<'a>(records: Vec<&'a SalesOrder>, field: GroupField) -> Vec<Partition<'a>> {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut partitions: Vec<Partition<'a>> = Vec::new();

    for record in records {
        let value = group_value(record, field);
        let label = value.label();
        match index.get(&label) {
            Some(&idx) => {
                let part = &mut partitions[idx];
                // A missing value outranks a literal "Unknown" label so the
                // shared bucket always sorts last.
                if value.is_unknown() {
                    part.value = GroupValue::Unknown;
                }
                part.records.push(record);
            }
            None => {
                index.insert(label.clone(), partitions.len());
                partitions.push(Partition {
                    value,
                    label,
                    records: vec![record],
                });
            }
        }
    }

    let field_type = field.field_type();
    // Labels are unique among siblings, so the tiebreak makes the order total.
    partitions.sort_by(|a, b| {
        compare_group_values(field_type, &a.value, &b.value).then_with(|| a.label.cmp(&b.label))
    });
    partitions
}
