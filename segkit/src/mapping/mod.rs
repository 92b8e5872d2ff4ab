//! Brand field-mapping table and center directory.
//!
//! Both are plain immutable values built once at startup and handed to the
//! grouping engine. Nothing here is global, so tests can swap in their own
//! tables.
//!
//! ```text
//! center label ──CenterDirectory──▶ brand ──BrandTable──▶ category ──▶ FieldMapping
//! "Bowlero"                         "Bowlero"             "Retail"      {413, 412, 418}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MappingError, MappingResult};
use crate::models::FieldMapping;

// =============================================================================
// Brand Table
// =============================================================================

/// Brand name → category name → [`FieldMapping`].
///
/// A (brand, category) pair either has a complete mapping or is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandTable {
    brands: BTreeMap<String, BTreeMap<String, FieldMapping>>,
}

impl BrandTable {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            brands: BTreeMap::new(),
        }
    }

    /// The built-in table for Bowlero, AMF and Lucky Strike.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (brand, category, pref, center, unsub) in BUILTIN_MAPPINGS {
            table.insert(*brand, *category, FieldMapping::new(*pref, *center, *unsub));
        }
        table
    }

    /// Add or replace a mapping.
    pub fn insert(
        &mut self,
        brand: impl Into<String>,
        category: impl Into<String>,
        mapping: FieldMapping,
    ) {
        self.brands
            .entry(brand.into())
            .or_default()
            .insert(category.into(), mapping);
    }

    /// Look up the mapping for a (brand, category) pair.
    pub fn lookup(&self, brand: &str, category: &str) -> MappingResult<&FieldMapping> {
        let categories = self.categories(brand)?;
        categories
            .get(category)
            .ok_or_else(|| MappingError::CategoryNotFound {
                brand: brand.to_string(),
                category: category.to_string(),
            })
    }

    /// All category mappings of a brand, in category-name order.
    pub fn categories(&self, brand: &str) -> MappingResult<&BTreeMap<String, FieldMapping>> {
        self.brands
            .get(brand)
            .ok_or_else(|| MappingError::BrandNotFound {
                brand: brand.to_string(),
            })
    }

    /// Brand names, in order.
    pub fn brand_names(&self) -> impl Iterator<Item = &str> {
        self.brands.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }
}

impl Default for BrandTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// (brand, category, pref, center, unsub)
const BUILTIN_MAPPINGS: &[(&str, &str, &str, &str, &str)] = &[
    ("Bowlero", "Retail", "413", "412", "418"),
    ("Bowlero", "League", "415", "414", "418"),
    ("Bowlero", "Group Event", "417", "416", "418"),
    ("AMF", "Retail", "406", "405", "411"),
    ("AMF", "League", "408", "407", "411"),
    ("AMF", "Group Event", "410", "409", "411"),
    ("Lucky Strike", "Retail", "1064", "1065", "1084"),
    ("Lucky Strike", "League", "1082", "1083", "1084"),
    ("Lucky Strike", "Group Event", "1067", "1068", "1084"),
];

// =============================================================================
// Center Directory
// =============================================================================

/// Center label → brand name.
///
/// Every center must be listed explicitly; unknown labels are reported as
/// [`MappingError::UnknownCenter`] and skipped by the grouping engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CenterDirectory {
    centers: BTreeMap<String, String>,
}

impl CenterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory listing each brand of `table` as a center label of itself.
    ///
    /// Matches spreadsheets whose center column already holds brand names.
    pub fn from_brand_names(table: &BrandTable) -> Self {
        let mut directory = Self::new();
        for brand in table.brand_names() {
            directory.insert(brand, brand);
        }
        directory
    }

    /// Register a center under a brand, replacing any previous entry.
    pub fn insert(&mut self, center: impl Into<String>, brand: impl Into<String>) {
        self.centers.insert(center.into(), brand.into());
    }

    /// Resolve the brand of a center label.
    pub fn resolve(&self, center: &str) -> MappingResult<&str> {
        self.centers
            .get(center)
            .map(String::as_str)
            .ok_or_else(|| MappingError::UnknownCenter {
                center: center.to_string(),
            })
    }

    /// Merge `other` into `self`; entries in `other` win.
    pub fn extend(&mut self, other: CenterDirectory) {
        self.centers.extend(other.centers);
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_lookup() {
        let table = BrandTable::builtin();

        let bowlero = table.lookup("Bowlero", "Retail").unwrap();
        assert_eq!(bowlero, &FieldMapping::new("413", "412", "418"));

        let amf = table.lookup("AMF", "League").unwrap();
        assert_eq!(amf.center_field, "407");

        let lucky = table.lookup("Lucky Strike", "Group Event").unwrap();
        assert_eq!(lucky.pref_field, "1067");
        assert_eq!(lucky.unsub_field, "1084");
    }

    #[test]
    fn test_builtin_is_complete() {
        let table = BrandTable::builtin();
        let brands: Vec<_> = table.brand_names().collect();
        assert_eq!(brands, vec!["AMF", "Bowlero", "Lucky Strike"]);
        for brand in brands {
            let categories: Vec<_> = table.categories(brand).unwrap().keys().cloned().collect();
            assert_eq!(categories, vec!["Group Event", "League", "Retail"]);
        }
    }

    #[test]
    fn test_missing_lookups() {
        let table = BrandTable::builtin();
        assert_eq!(
            table.lookup("Main Event", "Retail"),
            Err(MappingError::BrandNotFound {
                brand: "Main Event".into()
            })
        );
        assert_eq!(
            table.lookup("AMF", "Birthday"),
            Err(MappingError::CategoryNotFound {
                brand: "AMF".into(),
                category: "Birthday".into()
            })
        );
    }

    #[test]
    fn test_table_from_json() {
        let table: BrandTable = serde_json::from_value(json!({
            "Acme": { "Retail": { "pref": 1, "center": 2, "unsub": 3 } }
        }))
        .unwrap();
        assert_eq!(table.lookup("Acme", "Retail").unwrap().center_field, "2");
        assert!(table.lookup("Bowlero", "Retail").is_err());
    }

    #[test]
    fn test_center_directory() {
        let mut directory = CenterDirectory::from_brand_names(&BrandTable::builtin());
        assert_eq!(directory.resolve("AMF"), Ok("AMF"));
        assert!(directory.resolve("Bowlero Times Square").is_err());

        directory.insert("Bowlero Times Square", "Bowlero");
        assert_eq!(directory.resolve("Bowlero Times Square"), Ok("Bowlero"));
        assert_eq!(directory.len(), 4);
    }
}
