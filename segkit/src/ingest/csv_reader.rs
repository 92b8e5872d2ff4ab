//! CSV row reader.

use std::fs::File;
use std::path::Path;

use tracing::info;

use super::{parse_id, RowCollector, RowReader};
use crate::config::InvalidRowPolicy;
use crate::error::{IngestError, IngestResult};
use crate::models::RowTable;

/// Reads a comma-separated file with a header row.
///
/// Produces a single table named after the file stem.
#[derive(Debug, Clone, Default)]
pub struct CsvRowReader {
    policy: InvalidRowPolicy,
}

impl CsvRowReader {
    pub fn new(policy: InvalidRowPolicy) -> Self {
        Self { policy }
    }

    /// Read rows from any reader. `path` is only used for naming and errors.
    pub fn read_from<R: std::io::Read>(&self, reader: R, path: &Path) -> IngestResult<RowTable> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut collector = RowCollector::new(path, None, self.policy);

        for (index, record) in rdr.records().enumerate() {
            let record = record.map_err(|source| IngestError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(index + 2);

            let id = parse_id(record.get(0).unwrap_or(""));
            collector.push(line, id, record.get(1).unwrap_or(""))?;
        }

        Ok(collector.finish(segment_name(path)))
    }
}

impl RowReader for CsvRowReader {
    fn read(&self, path: &Path) -> IngestResult<Vec<RowTable>> {
        info!(path = %path.display(), "Loading CSV file");
        let file = File::open(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = self.read_from(file, path)?;
        info!(rows = table.rows.len(), "Read CSV rows");
        Ok(vec![table])
    }
}

/// Segment name of a CSV file: its base name without extension.
fn segment_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("segment")
        .to_string()
}
