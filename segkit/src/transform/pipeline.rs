//! Segmentation pipeline: file in, segmentation documents out.
//!
//! ```text
//! input file ─▶ format check ─▶ RowReader ─▶ tables (sheet / csv)
//!                                              │
//!                         ┌────────────────────┘
//!                         ▼
//!              map_segments (center → brand → category)
//!                         │
//!                         ▼
//!              split (threshold) ─▶ build_document ─▶ ArtifactWriter
//! ```
//!
//! The format check happens before the file is touched. An ingestion error
//! aborts the file with nothing written. Mapping misses and write failures
//! do not abort: they are logged and collected in the [`SegmentationReport`].
//!
//! Tables are processed in order. When a later table writes a path an earlier
//! one already wrote, the file on disk holds the later rows; the earlier
//! [`Artifact`] stays in the report with `overwritten_by` set and no longer
//! counts towards [`SegmentationReport::artifact_count`].
//!
//! # Example
//!
//! ```rust,ignore
//! use segkit::{SegmentationConfig, Segmenter};
//! use std::path::Path;
//!
//! let segmenter = Segmenter::new(SegmentationConfig::default());
//! let report = segmenter.run(Path::new("contacts.xlsx"), Path::new("out"))?;
//! println!("{} artifacts written", report.artifact_count());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::chunker::split;
use super::criteria::build_document;
use super::emitter::ArtifactWriter;
use super::grouper::{map_segments, SkippedGroup};
use crate::config::SegmentationConfig;
use crate::error::{SegmentationResult, WriteError};
use crate::ingest::{CsvRowReader, InputFormat, RowReader, XlsxRowReader};
use crate::mapping::CenterDirectory;
use crate::models::RowTable;

// =============================================================================
// Report
// =============================================================================

/// One artifact written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub brand: String,
    pub category: String,
    /// 1-based.
    pub chunk_index: usize,
    pub row_count: usize,
    pub path: PathBuf,
    /// Segment name of the table whose artifact later replaced this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwritten_by: Option<String>,
}

impl Artifact {
    /// The file on disk still holds this artifact's rows.
    pub fn is_current(&self) -> bool {
        self.overwritten_by.is_none()
    }
}

/// One artifact that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteFailure {
    pub brand: String,
    pub category: String,
    pub chunk_index: usize,
    pub path: PathBuf,
    pub message: String,
}

impl From<&WriteError> for WriteFailure {
    fn from(err: &WriteError) -> Self {
        Self {
            brand: err.brand.clone(),
            category: err.category.clone(),
            chunk_index: err.chunk_index,
            path: err.path.clone(),
            message: err.source.to_string(),
        }
    }
}

/// Outcome for one table (sheet or CSV file).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReport {
    pub segment_name: String,
    pub row_count: usize,
    pub artifacts: Vec<Artifact>,
    pub skipped: Vec<SkippedGroup>,
    pub failures: Vec<WriteFailure>,
}

/// Outcome of one run over one input file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationReport {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub tables: Vec<TableReport>,
}

impl TableReport {
    /// Artifacts of this table still present on disk.
    pub fn current_artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(|a| a.is_current())
    }
}

impl SegmentationReport {
    /// Distinct artifact files left on disk by this run.
    pub fn artifact_count(&self) -> usize {
        self.tables.iter().map(|t| t.current_artifacts().count()).sum()
    }

    /// Artifacts replaced by a later table of the same run.
    pub fn overwritten_count(&self) -> usize {
        self.tables
            .iter()
            .flat_map(|t| &t.artifacts)
            .filter(|a| !a.is_current())
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.tables.iter().map(|t| t.skipped.len()).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.tables.iter().map(|t| t.failures.len()).sum()
    }

    /// Every artifact was written.
    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }
}

// =============================================================================
// Readers
// =============================================================================

/// One [`RowReader`] per supported format.
pub struct Readers {
    csv: Box<dyn RowReader>,
    xlsx: Box<dyn RowReader>,
}

impl Readers {
    /// The calamine / csv readers, applying `config.invalid_rows`.
    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self {
            csv: Box::new(CsvRowReader::new(config.invalid_rows)),
            xlsx: Box::new(XlsxRowReader::new(config.invalid_rows)),
        }
    }

    /// Custom readers, e.g. in-memory fixtures.
    pub fn new(csv: Box<dyn RowReader>, xlsx: Box<dyn RowReader>) -> Self {
        Self { csv, xlsx }
    }

    fn for_format(&self, format: InputFormat) -> &dyn RowReader {
        match format {
            InputFormat::Csv => self.csv.as_ref(),
            InputFormat::Xlsx => self.xlsx.as_ref(),
        }
    }
}

// =============================================================================
// Segmenter
// =============================================================================

/// Runs the segmentation pipeline with a fixed configuration.
pub struct Segmenter {
    config: SegmentationConfig,
    directory: CenterDirectory,
    readers: Readers,
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        let readers = Readers::from_config(&config);
        Self::with_readers(config, readers)
    }

    pub fn with_readers(config: SegmentationConfig, readers: Readers) -> Self {
        let directory = config.center_directory();
        Self {
            config,
            directory,
            readers,
        }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Segment one input file into `output_dir`.
    pub fn run(&self, input: &Path, output_dir: &Path) -> SegmentationResult<SegmentationReport> {
        let started_at = Utc::now();

        let format = InputFormat::from_path(input)?;
        info!(path = %input.display(), format = format.as_str(), "Processing segmentation file");

        let tables = self.readers.for_format(format).read(input)?;

        let writer = ArtifactWriter::new(output_dir);
        let mut reports: Vec<TableReport> = Vec::with_capacity(tables.len());
        // path -> (table, artifact) that last wrote it
        let mut written: HashMap<PathBuf, (usize, usize)> = HashMap::new();

        for table in &tables {
            let mut report = self.segment_table(table, &writer);
            let current = reports.len();

            for index in 0..report.artifacts.len() {
                let path = report.artifacts[index].path.clone();
                let Some((earlier_table, earlier_index)) =
                    written.insert(path.clone(), (current, index))
                else {
                    continue;
                };

                let by = report.segment_name.clone();
                let earlier = if earlier_table == current {
                    &mut report.artifacts[earlier_index]
                } else {
                    &mut reports[earlier_table].artifacts[earlier_index]
                };
                warn!(
                    path = %path.display(),
                    "'{}' overwrote {} {} part {} written earlier in this run",
                    by,
                    earlier.brand,
                    earlier.category,
                    earlier.chunk_index
                );
                earlier.overwritten_by = Some(by);
            }

            reports.push(report);
        }

        let report = SegmentationReport {
            source: input.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            started_at,
            tables: reports,
        };

        info!(
            artifacts = report.artifact_count(),
            overwritten = report.overwritten_count(),
            skipped = report.skipped_count(),
            failures = report.failure_count(),
            "Segmentation finished"
        );
        Ok(report)
    }

    /// Group, build, split and write one table.
    pub fn segment_table(&self, table: &RowTable, writer: &ArtifactWriter) -> TableReport {
        info!(segment = %table.name, rows = table.rows.len(), "Generating segments");

        let grouping = map_segments(&table.rows, &self.directory, &self.config.brands);
        let mut report = TableReport {
            segment_name: table.name.clone(),
            row_count: table.rows.len(),
            skipped: grouping.skipped,
            ..Default::default()
        };

        for segment in &grouping.segments {
            let chunks = split(
                &segment.rows,
                self.config.chunk_threshold,
                self.config.split_policy,
            );
            if chunks.len() > 1 {
                info!(
                    brand = %segment.brand,
                    category = %segment.category,
                    rows = segment.rows.len(),
                    parts = chunks.len(),
                    "Splitting segment"
                );
            }

            for (index, chunk) in chunks.iter().enumerate() {
                let chunk_index = index + 1;
                let document =
                    build_document(chunk, &segment.mapping, &segment.brand, &segment.category);

                match writer.write(&document, &segment.brand, &segment.category, chunk_index) {
                    Ok(path) => {
                        report.artifacts.push(Artifact {
                            brand: segment.brand.clone(),
                            category: segment.category.clone(),
                            chunk_index,
                            row_count: chunk.len(),
                            path,
                            overwritten_by: None,
                        });
                    }
                    Err(err) => {
                        error!("{}", err);
                        report.failures.push(WriteFailure::from(&err));
                    }
                }
            }
        }

        report
    }
}

/// Segment `input` into `output_dir` with `config`.
pub fn process_segmentation_file(
    input: &Path,
    output_dir: &Path,
    config: SegmentationConfig,
) -> SegmentationResult<SegmentationReport> {
    Segmenter::new(config).run(input, output_dir)
}
