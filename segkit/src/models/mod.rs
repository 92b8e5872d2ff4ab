//! Domain models for the segmentation pipeline.
//!
//! - [`Row`] - One ingested contact row (`id`, `center`)
//! - [`RowTable`] - The rows of one sheet or CSV file, with its segment name
//! - [`FieldMapping`] - Platform field identifiers for one (brand, category)
//! - [`CriteriaNode`] - Boolean criteria tree (and / or / leaf)
//! - [`SegmentationDocument`] - The JSON document consumed by the CRM platform

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Rows
// =============================================================================

/// A single contact row read from a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Contact identifier (column 1).
    pub id: i64,
    /// Center label (column 2, trimmed).
    pub center: String,
}

impl Row {
    pub fn new(id: i64, center: impl Into<String>) -> Self {
        Self {
            id,
            center: center.into(),
        }
    }
}

/// Rows read from one table of a source file.
///
/// A CSV file yields one table named after the file stem; a workbook yields
/// one table per sheet, named after the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTable {
    /// Segment name context (sheet name or CSV file stem).
    pub name: String,
    /// Data rows in file order, header excluded.
    pub rows: Vec<Row>,
}

impl RowTable {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

// =============================================================================
// Field Mapping
// =============================================================================

/// Platform field identifiers for one (brand, category) pair.
///
/// Identifiers are opaque numeric codes on the platform side; they are kept
/// as strings. Configuration files may give them as JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Preference flag field (must equal `"True"`).
    #[serde(rename = "pref", deserialize_with = "field_id")]
    pub pref_field: String,
    /// Center-assignment field (matched against row ids).
    #[serde(rename = "center", deserialize_with = "field_id")]
    pub center_field: String,
    /// Unsubscribe field (must be empty).
    #[serde(rename = "unsub", deserialize_with = "field_id")]
    pub unsub_field: String,
}

impl FieldMapping {
    pub fn new(
        pref_field: impl Into<String>,
        center_field: impl Into<String>,
        unsub_field: impl Into<String>,
    ) -> Self {
        Self {
            pref_field: pref_field.into(),
            center_field: center_field.into(),
            unsub_field: unsub_field.into(),
        }
    }
}

fn field_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FieldId {
        Number(u64),
        Text(String),
    }

    Ok(match FieldId::deserialize(deserializer)? {
        FieldId::Number(n) => n.to_string(),
        FieldId::Text(s) => s,
    })
}

// =============================================================================
// Criteria Tree
// =============================================================================

/// Comparison operator of a leaf criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Equals,
    Empty,
}

/// A node of the boolean criteria tree.
///
/// Serialized with a `"type"` tag: `"criteria"` for leaves, `"and"` / `"or"`
/// for composites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CriteriaNode {
    /// Leaf comparison on one field.
    Criteria {
        field: String,
        operator: Operator,
        value: String,
    },
    /// All children must match.
    And { children: Vec<CriteriaNode> },
    /// At least one child must match.
    Or { children: Vec<CriteriaNode> },
}

impl CriteriaNode {
    /// Leaf: `field == value`.
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Criteria {
            field: field.into(),
            operator: Operator::Equals,
            value: value.into(),
        }
    }

    /// Leaf: `field` is empty.
    pub fn empty(field: impl Into<String>) -> Self {
        Self::Criteria {
            field: field.into(),
            operator: Operator::Empty,
            value: String::new(),
        }
    }

    /// Children of a composite node; empty for leaves.
    pub fn children(&self) -> &[CriteriaNode] {
        match self {
            Self::And { children } | Self::Or { children } => children,
            Self::Criteria { .. } => &[],
        }
    }
}

// =============================================================================
// Segmentation Document
// =============================================================================

/// A named segment definition, one per (brand, category, chunk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationDocument {
    /// Segment name, e.g. `"Bowlero League"`.
    pub name: String,
    /// Root of the criteria tree (always an `and` node).
    pub contact_criteria: CriteriaNode,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_mapping_accepts_numbers_and_strings() {
        let mapping: FieldMapping =
            serde_json::from_value(json!({ "pref": 413, "center": "412", "unsub": 418 })).unwrap();
        assert_eq!(mapping, FieldMapping::new("413", "412", "418"));
    }

    #[test]
    fn test_field_mapping_requires_all_fields() {
        let partial = serde_json::from_value::<FieldMapping>(json!({ "pref": 413, "center": 412 }));
        assert!(partial.is_err());
    }

    #[test]
    fn test_criteria_serialization_shape() {
        let node = CriteriaNode::And {
            children: vec![
                CriteriaNode::equals("413", "True"),
                CriteriaNode::empty("418"),
                CriteriaNode::Or {
                    children: vec![CriteriaNode::equals("412", "7")],
                },
            ],
        };

        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "type": "and",
                "children": [
                    { "type": "criteria", "field": "413", "operator": "equals", "value": "True" },
                    { "type": "criteria", "field": "418", "operator": "empty", "value": "" },
                    { "type": "or", "children": [
                        { "type": "criteria", "field": "412", "operator": "equals", "value": "7" }
                    ]}
                ]
            })
        );
    }

    #[test]
    fn test_document_uses_camel_case() {
        let doc = SegmentationDocument {
            name: "AMF Retail".into(),
            contact_criteria: CriteriaNode::Or { children: vec![] },
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["name"], "AMF Retail");
        assert_eq!(value["contactCriteria"]["type"], "or");
    }

    #[test]
    fn test_document_parses_back() {
        let raw = json!({
            "name": "Lucky Strike League",
            "contactCriteria": {
                "type": "and",
                "children": [
                    { "type": "criteria", "field": "1082", "operator": "equals", "value": "True" }
                ]
            }
        });
        let doc: SegmentationDocument = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.contact_criteria.children().len(), 1);
    }
}
