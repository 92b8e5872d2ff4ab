//! Writing segmentation documents to the output directory.
//!
//! Artifact names are `{brand}_{category}_part_{n}.json`, lower-cased, with
//! whitespace and path separators replaced by `_`. Writes go to a temporary
//! file in the output directory which is then renamed over the target, so a
//! reader never sees a half-written document.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::WriteError;
use crate::models::SegmentationDocument;

static NAME_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s/\\]").expect("valid separator pattern"));

fn slug(part: &str) -> String {
    NAME_SEPARATOR.replace_all(&part.to_lowercase(), "_").into_owned()
}

/// File name of one artifact. `chunk_index` is 1-based.
pub fn artifact_file_name(brand: &str, category: &str, chunk_index: usize) -> String {
    format!("{}_{}_part_{}.json", slug(brand), slug(category), chunk_index)
}

/// Writes documents into one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path of an artifact.
    pub fn artifact_path(&self, brand: &str, category: &str, chunk_index: usize) -> PathBuf {
        self.output_dir
            .join(artifact_file_name(brand, category, chunk_index))
    }

    /// Write one document, replacing any existing file at the target path.
    pub fn write(
        &self,
        document: &SegmentationDocument,
        brand: &str,
        category: &str,
        chunk_index: usize,
    ) -> Result<PathBuf, WriteError> {
        let path = self.artifact_path(brand, category, chunk_index);

        self.write_atomic(document, &path).map_err(|source| WriteError {
            path: path.clone(),
            brand: brand.to_string(),
            category: category.to_string(),
            chunk_index,
            source,
        })?;

        info!(path = %path.display(), "Saved");
        Ok(path)
    }

    fn write_atomic(&self, document: &SegmentationDocument, path: &Path) -> std::io::Result<()> {
        // Idempotent: fine when the directory already exists
        fs::create_dir_all(&self.output_dir)?;

        let json = serde_json::to_vec_pretty(document)?;
        let mut tmp = NamedTempFile::new_in(&self.output_dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
