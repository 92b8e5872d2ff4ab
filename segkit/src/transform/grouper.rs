//! Group ingested rows by center and map them to brand segments.
//!
//! ```text
//! rows (flat)                 center groups            brand segments (× category)
//! ┌──────────────────┐       ┌─────────────────┐      ┌──────────────────────────────┐
//! │ 1  Bowlero       │       │ Bowlero  [1, 3] │      │ Bowlero / Group Event [1, 3] │
//! │ 2  AMF           │  →    │ AMF      [2]    │  →   │ Bowlero / League      [1, 3] │
//! │ 3  Bowlero       │       │ Main St  [4]  ✗ │      │ Bowlero / Retail      [1, 3] │
//! │ 4  Main St       │       └─────────────────┘      │ AMF / ...             [2]    │
//! └──────────────────┘                                └──────────────────────────────┘
//! ```
//!
//! Each center is resolved to a brand through the [`CenterDirectory`]. Every
//! category of that brand receives the full row set: rows carry no category
//! of their own. Centers that resolve to the same brand are concatenated in
//! first-appearance order, so a brand produces one row set per table.
//!
//! Unknown centers and unmapped brands are skipped with a warning and
//! recorded in [`Grouping::skipped`].

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::error::MappingError;
use crate::mapping::{BrandTable, CenterDirectory};
use crate::models::{FieldMapping, Row};

/// Rows sharing one center label, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    pub center: String,
    pub rows: Vec<Row>,
}

/// Rows of one brand, to be emitted under one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandSegment {
    pub brand: String,
    pub category: String,
    pub mapping: FieldMapping,
    /// Center labels that contributed rows, in first-appearance order.
    pub centers: Vec<String>,
    pub rows: Vec<Row>,
}

/// A center group that produced no segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedGroup {
    pub center: String,
    pub rows: usize,
    pub reason: MappingError,
}

/// Output of the grouping engine for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    pub segments: Vec<BrandSegment>,
    pub skipped: Vec<SkippedGroup>,
}

/// Partition rows by center, keeping first-appearance order of centers and
/// file order of rows within each center.
pub fn group_by_center(rows: &[Row]) -> Vec<RowGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<RowGroup> = Vec::new();

    for row in rows {
        let slot = *index.entry(row.center.as_str()).or_insert_with(|| {
            groups.push(RowGroup {
                center: row.center.clone(),
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].rows.push(row.clone());
    }

    groups
}

/// Builder accumulating the center groups of one brand.
struct BrandBuilder {
    brand: String,
    centers: Vec<String>,
    center_sizes: Vec<usize>,
    rows: Vec<Row>,
}

impl BrandBuilder {
    fn new(brand: &str) -> Self {
        Self {
            brand: brand.to_string(),
            centers: Vec::new(),
            center_sizes: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn add_group(&mut self, group: RowGroup) {
        self.centers.push(group.center);
        self.center_sizes.push(group.rows.len());
        self.rows.extend(group.rows);
    }

    fn build(self, brands: &BrandTable, skipped: &mut Vec<SkippedGroup>) -> Vec<BrandSegment> {
        let categories = match brands.categories(&self.brand) {
            Ok(categories) => categories,
            Err(reason) => {
                warn!("{}. Skipping.", reason);
                for (center, rows) in self.centers.into_iter().zip(self.center_sizes) {
                    skipped.push(SkippedGroup {
                        center,
                        rows,
                        reason: reason.clone(),
                    });
                }
                return Vec::new();
            }
        };

        categories
            .iter()
            .map(|(category, mapping)| BrandSegment {
                brand: self.brand.clone(),
                category: category.clone(),
                mapping: mapping.clone(),
                centers: self.centers.clone(),
                rows: self.rows.clone(),
            })
            .collect()
    }
}

/// Group `rows` by center, resolve brands and expand every brand into one
/// segment per category.
pub fn map_segments(rows: &[Row], directory: &CenterDirectory, brands: &BrandTable) -> Grouping {
    let mut order: Vec<String> = Vec::new();
    let mut builders: HashMap<String, BrandBuilder> = HashMap::new();
    let mut skipped = Vec::new();

    for group in group_by_center(rows) {
        if group.rows.is_empty() {
            continue;
        }
        match directory.resolve(&group.center) {
            Ok(brand) => {
                let builder = builders.entry(brand.to_string()).or_insert_with(|| {
                    order.push(brand.to_string());
                    BrandBuilder::new(brand)
                });
                builder.add_group(group);
            }
            Err(reason) => {
                warn!("{}. Skipping {} row(s).", reason, group.rows.len());
                skipped.push(SkippedGroup {
                    center: group.center,
                    rows: group.rows.len(),
                    reason,
                });
            }
        }
    }

    let mut segments = Vec::new();
    for brand in order {
        if let Some(builder) = builders.remove(&brand) {
            segments.extend(builder.build(brands, &mut skipped));
        }
    }

    Grouping { segments, skipped }
}
