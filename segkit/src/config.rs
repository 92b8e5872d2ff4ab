//! Run configuration.
//!
//! Everything the pipeline needs that is not input data: the brand table,
//! the center directory, the chunking policy and the invalid-row policy.
//! Loaded from a JSON file; any key left out falls back to its default.
//!
//! ```json
//! {
//!   "brands": { "Bowlero": { "Retail": { "pref": 413, "center": 412, "unsub": 418 } } },
//!   "centers": { "Bowlero Times Square": "Bowlero" },
//!   "chunkThreshold": 200,
//!   "splitPolicy": "halve",
//!   "invalidRows": "abort"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, SegmentationError, SegmentationResult};
use crate::mapping::{BrandTable, CenterDirectory};
use crate::transform::chunker::{SplitPolicy, DEFAULT_CHUNK_THRESHOLD};

/// What to do with a data row whose id is missing or not an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRowPolicy {
    /// Fail the whole file.
    #[default]
    Abort,
    /// Drop the row with a warning.
    Skip,
}

/// Configuration for one segmentation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SegmentationConfig {
    /// Brand → category → field mapping.
    #[serde(default)]
    pub brands: BrandTable,

    /// Extra center labels. Brand names are always registered as centers
    /// of themselves unless `brandNamesAsCenters` is false.
    #[serde(default)]
    pub centers: CenterDirectory,

    /// Register each brand name as a center label of itself.
    #[serde(default = "default_true")]
    pub brand_names_as_centers: bool,

    /// Row count above which a row set is split.
    #[serde(default = "default_chunk_threshold")]
    pub chunk_threshold: usize,

    /// How oversized row sets are split.
    #[serde(default)]
    pub split_policy: SplitPolicy,

    /// Handling of rows with unparseable ids.
    #[serde(default)]
    pub invalid_rows: InvalidRowPolicy,
}

fn default_true() -> bool {
    true
}

fn default_chunk_threshold() -> usize {
    DEFAULT_CHUNK_THRESHOLD
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            brands: BrandTable::builtin(),
            centers: CenterDirectory::new(),
            brand_names_as_centers: true,
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            split_policy: SplitPolicy::default(),
            invalid_rows: InvalidRowPolicy::default(),
        }
    }
}

impl SegmentationConfig {
    /// Load a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// The file at `path`, or the default configuration when there is none.
    pub fn load(path: Option<&Path>) -> SegmentationResult<Self> {
        match path {
            Some(p) => Ok(Self::from_file(p)?),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration JSON.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.chunk_threshold == 0 {
            return Err(ConfigError::Invalid("chunkThreshold must be at least 1".into()));
        }
        if self.brands.is_empty() {
            return Err(ConfigError::Invalid("brands table is empty".into()));
        }
        for brand in self.brands.brand_names() {
            if self.brands.categories(brand).map_or(true, |c| c.is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "brand '{}' has no categories",
                    brand
                )));
            }
        }
        Ok(())
    }

    /// The effective center directory: configured centers plus, when enabled,
    /// each brand name registered as a center of itself. Configured entries win.
    pub fn center_directory(&self) -> CenterDirectory {
        let mut directory = if self.brand_names_as_centers {
            CenterDirectory::from_brand_names(&self.brands)
        } else {
            CenterDirectory::new()
        };
        directory.extend(self.centers.clone());
        directory
    }
}
