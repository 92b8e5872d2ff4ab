//! Row ingestion from CSV files and Excel workbooks.
//!
//! Both readers produce [`RowTable`]s of `{id, center}` rows:
//!
//! - column 1 is the contact id (integer), column 2 the center label (trimmed)
//! - row 1 is a header and is always skipped
//! - a row with both cells blank is padding and is ignored
//! - a row with a missing or non-integer id is handled per [`InvalidRowPolicy`]
//!
//! Reading is synchronous on both paths. The [`RowReader`] trait is the seam
//! the orchestrator dispatches through.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::InvalidRowPolicy;
use crate::error::{FormatError, IngestError, IngestResult};
use crate::models::{Row, RowTable};

pub mod csv_reader;
pub mod xlsx_reader;

pub use csv_reader::CsvRowReader;
pub use xlsx_reader::XlsxRowReader;

// =============================================================================
// Input Format
// =============================================================================

/// Supported input file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Xlsx,
}

impl InputFormat {
    /// Infer the format from the file extension (case-insensitive).
    ///
    /// Looks only at the path; the file is not touched.
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| FormatError::MissingExtension {
                path: path.to_path_buf(),
            })?;

        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(FormatError::Unsupported {
                path: path.to_path_buf(),
                extension: extension.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

// =============================================================================
// Reader Seam
// =============================================================================

/// Reads the row tables of one source file.
pub trait RowReader {
    /// Read every table of `path`, in file order.
    fn read(&self, path: &Path) -> IngestResult<Vec<RowTable>>;
}

// =============================================================================
// Row Collection
// =============================================================================

/// Why a cell could not be turned into an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InvalidId {
    pub value: String,
    pub message: String,
}

impl InvalidId {
    fn new(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            message: message.into(),
        }
    }
}

/// Parse an id from cell text.
pub(crate) fn parse_id(text: &str) -> Result<i64, InvalidId> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InvalidId::new("", "missing id"));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| InvalidId::new(trimmed, "not an integer"))
}

/// Accumulates the rows of one table, applying the invalid-row policy.
pub(crate) struct RowCollector<'a> {
    path: &'a Path,
    sheet: Option<&'a str>,
    policy: InvalidRowPolicy,
    rows: Vec<Row>,
    seen: HashSet<i64>,
    skipped: usize,
    duplicates: usize,
}

impl<'a> RowCollector<'a> {
    pub fn new(path: &'a Path, sheet: Option<&'a str>, policy: InvalidRowPolicy) -> Self {
        Self {
            path,
            sheet,
            policy,
            rows: Vec::new(),
            seen: HashSet::new(),
            skipped: 0,
            duplicates: 0,
        }
    }

    /// Add one data row. `line` is the 1-based line (or sheet row) number.
    pub fn push(
        &mut self,
        line: usize,
        id: Result<i64, InvalidId>,
        center: &str,
    ) -> IngestResult<()> {
        let center = center.trim();
        match id {
            Ok(id) => {
                // Ids should be unique per table; a repeat is kept but reported
                if !self.seen.insert(id) {
                    warn!(
                        path = %self.path.display(),
                        sheet = self.sheet.unwrap_or(""),
                        line,
                        id,
                        "Duplicate contact id"
                    );
                    self.duplicates += 1;
                }
                self.rows.push(Row::new(id, center));
                Ok(())
            }
            Err(invalid) if invalid.value.is_empty() && center.is_empty() => {
                debug!(line, "Ignoring blank row");
                Ok(())
            }
            Err(invalid) => match self.policy {
                InvalidRowPolicy::Abort => Err(IngestError::InvalidRow {
                    path: self.path.to_path_buf(),
                    sheet: self.sheet.map(String::from),
                    line,
                    value: invalid.value,
                    message: invalid.message,
                }),
                InvalidRowPolicy::Skip => {
                    warn!(
                        path = %self.path.display(),
                        sheet = self.sheet.unwrap_or(""),
                        line,
                        value = %invalid.value,
                        "Skipping row: {}",
                        invalid.message
                    );
                    self.skipped += 1;
                    Ok(())
                }
            },
        }
    }

    pub fn finish(self, name: impl Into<String>) -> RowTable {
        let table = RowTable::new(name, self.rows);
        if self.skipped > 0 {
            warn!(
                table = %table.name,
                skipped = self.skipped,
                "Rows with invalid ids were skipped"
            );
        }
        if self.duplicates > 0 {
            warn!(
                table = %table.name,
                duplicates = self.duplicates,
                "Table contains repeated contact ids"
            );
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_detection() {
        assert_eq!(InputFormat::from_path(Path::new("a.csv")).unwrap(), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("dir/B.XLSX")).unwrap(), InputFormat::Xlsx);

        let err = InputFormat::from_path(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, FormatError::Unsupported { ref extension, .. } if extension == "txt"));

        // Legacy .xls is not supported
        assert!(InputFormat::from_path(Path::new("old.xls")).is_err());

        let err = InputFormat::from_path(Path::new("README")).unwrap_err();
        assert!(matches!(err, FormatError::MissingExtension { .. }));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 42 "), Ok(42));
        assert_eq!(parse_id("-3"), Ok(-3));
        assert_eq!(parse_id("").unwrap_err().message, "missing id");
        assert_eq!(parse_id("12a").unwrap_err().value, "12a");
        assert!(parse_id("4.5").is_err());
    }

    #[test]
    fn test_collector_abort() {
        let path = PathBuf::from("contacts.csv");
        let mut collector = RowCollector::new(&path, None, InvalidRowPolicy::Abort);
        collector.push(2, Ok(1), " Bowlero ").unwrap();
        let err = collector.push(3, parse_id("x"), "AMF").unwrap_err();
        assert!(matches!(err, IngestError::InvalidRow { line: 3, .. }));
    }

    #[test]
    fn test_collector_skip_and_blank_rows() {
        let path = PathBuf::from("contacts.csv");
        let mut collector = RowCollector::new(&path, Some("Sheet1"), InvalidRowPolicy::Skip);
        collector.push(2, Ok(1), " Bowlero ").unwrap();
        collector.push(3, parse_id("x"), "AMF").unwrap();
        collector.push(4, parse_id(""), "  ").unwrap();
        collector.push(5, Ok(2), "AMF").unwrap();

        let table = collector.finish("Sheet1");
        assert_eq!(table.rows, vec![Row::new(1, "Bowlero"), Row::new(2, "AMF")]);
    }

    #[test]
    fn test_blank_row_is_not_an_error_under_abort() {
        let path = PathBuf::from("contacts.csv");
        let mut collector = RowCollector::new(&path, None, InvalidRowPolicy::Abort);
        collector.push(2, parse_id(""), "").unwrap();
        // Missing id with a center is still invalid
        assert!(collector.push(3, parse_id(""), "AMF").is_err());
    }

    #[test]
    fn test_duplicate_ids_are_counted() {
        let path = PathBuf::from("contacts.csv");
        let mut collector = RowCollector::new(&path, None, InvalidRowPolicy::Abort);
        collector.push(2, Ok(7), "AMF").unwrap();
        collector.push(3, Ok(8), "AMF").unwrap();
        collector.push(4, Ok(7), "Bowlero").unwrap();
        assert_eq!(collector.duplicates, 1);

        // Repeats stay in file order
        let table = collector.finish("contacts");
        let ids: Vec<i64> = table.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![7, 8, 7]);
    }
}
