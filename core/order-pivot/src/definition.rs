//! FILENAME: core/order-pivot/src/definition.rs
//! Pivot Definition - the serializable field configuration.
//!
//! A definition is an immutable snapshot of what the user selected: which
//! dimensions to group by (outer to inner) and which measures to compute.
//! Callers rebuild the tree whenever the definition or the records change.

use sales_records::SalesOrder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{AggregationField, GroupField};
use crate::grouping::build_tree;
use crate::tree::PivotTree;

#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Invalid pivot definition JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Selected group fields and aggregation fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotDefinition {
    /// Grouping dimensions, ordered from outer to inner.
    #[serde(default)]
    pub group_fields: Vec<GroupField>,

    /// Measures computed for every node.
    #[serde(default)]
    pub aggregation_fields: Vec<AggregationField>,
}

impl PivotDefinition {
    pub fn new(group_fields: Vec<GroupField>, aggregation_fields: Vec<AggregationField>) -> Self {
        PivotDefinition {
            group_fields,
            aggregation_fields,
        }
        .normalized()
    }

    /// Parses a definition, e.g.
    /// `{"groupFields":["orderMonth"],"aggregationFields":[{"measure":"totalAmount","reducer":"sum"}]}`.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let definition: PivotDefinition = serde_json::from_str(json)?;
        Ok(definition.normalized())
    }

    /// Builds a definition from catalog keys.
    ///
    /// Aggregations are `(measure key, reducer key)` pairs. Keys the catalog
    /// does not know are skipped with a warning.
    pub fn from_keys(group_keys: &[&str], aggregation_keys: &[(&str, &str)]) -> Self {
        let group_fields = group_keys
            .iter()
            .filter_map(|key| {
                let field = GroupField::from_key(key);
                if field.is_none() {
                    log::warn!("ignoring unknown group field key '{}'", key);
                }
                field
            })
            .collect();

        let aggregation_fields = aggregation_keys
            .iter()
            .filter_map(|(measure, reducer)| {
                let field = AggregationField::from_keys(measure, reducer);
                if field.is_none() {
                    log::warn!("ignoring unknown aggregation field '{}' / '{}'", measure, reducer);
                }
                field
            })
            .collect();

        PivotDefinition::new(group_fields, aggregation_fields)
    }

    /// Drops repeated aggregation fields so composite keys stay unique.
    fn normalized(mut self) -> Self {
        let mut seen: Vec<AggregationField> = Vec::with_capacity(self.aggregation_fields.len());
        self.aggregation_fields.retain(|field| {
            if seen.contains(field) {
                log::debug!("dropping duplicate aggregation field '{}'", field.key());
                false
            } else {
                seen.push(*field);
                true
            }
        });
        self
    }

    /// Groups `records` according to this definition.
    pub fn build_tree<'a>(&self, records: &'a [SalesOrder]) -> PivotTree<'a> {
        build_tree(records, &self.group_fields, &self.aggregation_fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Measure, Reducer};

    #[test]
    fn test_from_json() {
        let definition = PivotDefinition::from_json(
            r#"{
                "groupFields": ["orderMonth", "customer"],
                "aggregationFields": [
                    { "measure": "totalAmount", "reducer": "sum" },
                    { "measure": "totalAmount", "reducer": "count" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(definition.group_fields, vec![GroupField::OrderMonth, GroupField::Customer]);
        assert_eq!(definition.aggregation_fields.len(), 2);
        assert_eq!(definition.aggregation_fields[1].reducer, Reducer::Count);
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = PivotDefinition::from_json("{ \"groupFields\": [").unwrap_err();
        assert!(matches!(err, DefinitionError::Json(_)));
        assert!(err.to_string().starts_with("Invalid pivot definition JSON"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let definition = PivotDefinition::from_json("{}").unwrap();
        assert!(definition.group_fields.is_empty());
        assert!(definition.aggregation_fields.is_empty());
    }

    #[test]
    fn test_from_keys_skips_unknown() {
        let definition = PivotDefinition::from_keys(
            &["region", "warehouse", "status"],
            &[("totalAmount", "avg"), ("totalAmount", "median"), ("shipping", "sum")],
        );
        assert_eq!(definition.group_fields, vec![GroupField::Region, GroupField::Status]);
        assert_eq!(
            definition.aggregation_fields,
            vec![AggregationField::new(Measure::TotalAmount, Reducer::Avg)]
        );
    }

    #[test]
    fn test_duplicate_aggregations_removed() {
        let sum = AggregationField::new(Measure::TotalAmount, Reducer::Sum);
        let avg = AggregationField::new(Measure::TotalAmount, Reducer::Avg);
        let definition = PivotDefinition::new(vec![], vec![sum, avg, sum]);
        assert_eq!(definition.aggregation_fields, vec![sum, avg]);
    }

    #[test]
    fn test_serializes_with_catalog_keys() {
        let definition = PivotDefinition::from_keys(&["orderYear"], &[("quantity", "sum")]);
        let json = serde_json::to_value(&definition).unwrap();
        assert_eq!(json["groupFields"][0], "orderYear");
        assert_eq!(json["aggregationFields"][0]["measure"], "quantity");
        assert_eq!(json["aggregationFields"][0]["reducer"], "sum");
    }
}
