//! Criteria-tree construction.
//!
//! Every segment has the same shape; the platform reads the root's children
//! positionally, so their order is fixed:
//!
//! ```text
//! and
//! ├── criteria  pref  equals "True"
//! ├── criteria  unsub empty  ""
//! └── or
//!     ├── criteria center equals "<row 1 id>"
//!     ├── criteria center equals "<row 2 id>"
//!     └── ...
//! ```

use crate::models::{CriteriaNode, FieldMapping, Row, SegmentationDocument};

/// Value the preference field must hold.
pub const PREFERENCE_OPT_IN: &str = "True";

/// Segment name for a (brand, category) pair, e.g. `"Bowlero League"`.
pub fn segment_name(brand: &str, category: &str) -> String {
    format!("{} {}", brand, category)
}

/// Build the criteria root for `rows` under `mapping`.
///
/// One `equals` leaf per row, in input order. An empty row set yields an
/// empty `or`.
pub fn build_criteria(rows: &[Row], mapping: &FieldMapping) -> CriteriaNode {
    let centers = rows
        .iter()
        .map(|row| CriteriaNode::equals(&mapping.center_field, row.id.to_string()))
        .collect();

    CriteriaNode::And {
        children: vec![
            CriteriaNode::equals(&mapping.pref_field, PREFERENCE_OPT_IN),
            CriteriaNode::empty(&mapping.unsub_field),
            CriteriaNode::Or { children: centers },
        ],
    }
}

/// Build the complete document for one (brand, category, chunk).
pub fn build_document(
    rows: &[Row],
    mapping: &FieldMapping,
    brand: &str,
    category: &str,
) -> SegmentationDocument {
    SegmentationDocument {
        name: segment_name(brand, category),
        contact_criteria: build_criteria(rows, mapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operator;
    use serde_json::json;

    fn bowlero_retail() -> FieldMapping {
        FieldMapping::new("413", "412", "418")
    }

    #[test]
    fn test_root_shape() {
        let rows: Vec<Row> = (1..=5).map(|id| Row::new(id, "Bowlero")).collect();
        let root = build_criteria(&rows, &bowlero_retail());

        assert!(matches!(root, CriteriaNode::And { .. }));
        let children = root.children();
        assert_eq!(children.len(), 3);

        assert_eq!(
            children[0],
            CriteriaNode::Criteria {
                field: "413".into(),
                operator: Operator::Equals,
                value: "True".into()
            }
        );
        assert_eq!(
            children[1],
            CriteriaNode::Criteria {
                field: "418".into(),
                operator: Operator::Empty,
                value: String::new()
            }
        );
        assert!(matches!(children[2], CriteriaNode::Or { .. }));
        assert_eq!(children[2].children().len(), rows.len());
    }

    #[test]
    fn test_row_order_is_kept() {
        let rows = vec![Row::new(30, "AMF"), Row::new(4, "AMF"), Row::new(17, "AMF")];
        let root = build_criteria(&rows, &FieldMapping::new("408", "407", "411"));

        let values: Vec<&str> = root.children()[2]
            .children()
            .iter()
            .map(|leaf| match leaf {
                CriteriaNode::Criteria { field, value, .. } => {
                    assert_eq!(field, "407");
                    value.as_str()
                }
                other => panic!("expected leaf, got {other:?}"),
            })
            .collect();
        assert_eq!(values, vec!["30", "4", "17"]);
    }

    #[test]
    fn test_idempotent() {
        let rows = vec![Row::new(1, "Bowlero"), Row::new(2, "Bowlero")];
        let first = build_document(&rows, &bowlero_retail(), "Bowlero", "Retail");
        let second = build_document(&rows, &bowlero_retail(), "Bowlero", "Retail");
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_rows_still_build() {
        let doc = build_document(&[], &bowlero_retail(), "Bowlero", "Retail");
        assert_eq!(doc.contact_criteria.children().len(), 3);
        assert!(doc.contact_criteria.children()[2].children().is_empty());
    }

    #[test]
    fn test_document_json() {
        let rows = vec![Row::new(1, "Bowlero"), Row::new(2, "Bowlero")];
        let doc = build_document(&rows, &bowlero_retail(), "Bowlero", "Retail");

        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "name": "Bowlero Retail",
                "contactCriteria": {
                    "type": "and",
                    "children": [
                        { "type": "criteria", "field": "413", "operator": "equals", "value": "True" },
                        { "type": "criteria", "field": "418", "operator": "empty", "value": "" },
                        { "type": "or", "children": [
                            { "type": "criteria", "field": "412", "operator": "equals", "value": "1" },
                            { "type": "criteria", "field": "412", "operator": "equals", "value": "2" }
                        ]}
                    ]
                }
            })
        );
    }
}
