//! Excel workbook row reader (calamine).
//!
//! Each worksheet becomes one [`RowTable`] named after the sheet, in workbook
//! order. Sheet row 1 is the header. Cells are addressed by absolute position,
//! so column A is always the id and column B the center, even when the used
//! range of a sheet starts further right or down.

use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use tracing::{info, warn};

use super::{parse_id, InvalidId, RowCollector, RowReader};
use crate::config::InvalidRowPolicy;
use crate::error::{IngestError, IngestResult};
use crate::models::RowTable;

const ID_COLUMN: u32 = 0;
const CENTER_COLUMN: u32 = 1;

/// Reads `.xlsx` workbooks.
#[derive(Debug, Clone, Default)]
pub struct XlsxRowReader {
    policy: InvalidRowPolicy,
}

impl XlsxRowReader {
    pub fn new(policy: InvalidRowPolicy) -> Self {
        Self { policy }
    }

    /// Collect the data rows of one worksheet range.
    pub fn read_range(&self, range: &Range<Data>, path: &Path, sheet: &str) -> IngestResult<RowTable> {
        let mut collector = RowCollector::new(path, Some(sheet), self.policy);

        if let Some((last_row, _)) = range.end() {
            // Absolute row 0 is the header
            for row in 1..=last_row {
                let id = cell_id(range.get_value((row, ID_COLUMN)));
                let center = cell_text(range.get_value((row, CENTER_COLUMN)));
                collector.push(row as usize + 1, id, &center)?;
            }
        }

        Ok(collector.finish(sheet))
    }
}

impl RowReader for XlsxRowReader {
    fn read(&self, path: &Path) -> IngestResult<Vec<RowTable>> {
        info!(path = %path.display(), "Loading Excel file");

        let mut workbook: Xlsx<_> =
            open_workbook(path).map_err(|e: XlsxError| IngestError::Spreadsheet {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut tables = Vec::new();
        for sheet in workbook.sheet_names().to_vec() {
            let range = workbook
                .worksheet_range(&sheet)
                .map_err(|e| IngestError::Spreadsheet {
                    path: path.to_path_buf(),
                    message: format!("sheet '{}': {}", sheet, e),
                })?;

            let table = self.read_range(&range, path, &sheet)?;
            if table.rows.is_empty() {
                warn!(sheet = %sheet, "Sheet has no data rows");
            } else {
                info!(sheet = %sheet, rows = table.rows.len(), "Read sheet rows");
            }
            tables.push(table);
        }

        Ok(tables)
    }
}

/// Text of a cell, trimmed. Whole floats print without a fraction.
fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.trim().to_string(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Float(f)) => f.to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Integer id of a cell. Numeric cells must hold a whole number.
fn cell_id(cell: Option<&Data>) -> Result<i64, InvalidId> {
    match cell {
        None | Some(Data::Empty) => parse_id(""),
        Some(Data::Int(i)) => Ok(*i),
        Some(Data::Float(f)) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Ok(*f as i64)
            } else {
                Err(InvalidId {
                    value: f.to_string(),
                    message: "not an integer".into(),
                })
            }
        }
        Some(Data::String(s)) => parse_id(s),
        Some(other) => Err(InvalidId {
            value: other.to_string(),
            message: "not an integer".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;

    fn sheet(cells: &[(u32, u32, Data)]) -> Range<Data> {
        let end_row = cells.iter().map(|c| c.0).max().unwrap_or(0);
        let end_col = cells.iter().map(|c| c.1).max().unwrap_or(0);
        let mut range = Range::new((0, 0), (end_row, end_col));
        for (row, col, value) in cells {
            range.set_value((*row, *col), value.clone());
        }
        range
    }

    #[test]
    fn test_cell_id() {
        assert_eq!(cell_id(Some(&Data::Float(42.0))), Ok(42));
        assert_eq!(cell_id(Some(&Data::Int(7))), Ok(7));
        assert_eq!(cell_id(Some(&Data::String(" 9 ".into()))), Ok(9));
        assert!(cell_id(Some(&Data::Float(4.5))).is_err());
        assert!(cell_id(Some(&Data::Bool(true))).is_err());
        assert_eq!(cell_id(None).unwrap_err().message, "missing id");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(Some(&Data::String("  AMF ".into()))), "AMF");
        assert_eq!(cell_text(Some(&Data::Float(12.0))), "12");
        assert_eq!(cell_text(None), "");
    }

    #[test]
    fn test_read_range_skips_header() {
        let range = sheet(&[
            (0, 0, Data::String("id".into())),
            (0, 1, Data::String("center".into())),
            (1, 0, Data::Float(1.0)),
            (1, 1, Data::String("Bowlero".into())),
            (2, 0, Data::Float(2.0)),
            (2, 1, Data::String(" Bowlero ".into())),
        ]);

        let table = XlsxRowReader::default()
            .read_range(&range, Path::new("book.xlsx"), "Bowlero League")
            .unwrap();
        assert_eq!(table.name, "Bowlero League");
        assert_eq!(table.rows, vec![Row::new(1, "Bowlero"), Row::new(2, "Bowlero")]);
    }

    #[test]
    fn test_read_range_blank_and_invalid_rows() {
        let range = sheet(&[
            (0, 0, Data::String("id".into())),
            (1, 0, Data::Float(1.0)),
            (1, 1, Data::String("AMF".into())),
            // row 2 left blank
            (3, 0, Data::String("n/a".into())),
            (3, 1, Data::String("AMF".into())),
        ]);

        let err = XlsxRowReader::new(InvalidRowPolicy::Abort)
            .read_range(&range, Path::new("book.xlsx"), "AMF")
            .unwrap_err();
        match err {
            IngestError::InvalidRow { line, sheet, value, .. } => {
                assert_eq!(line, 4);
                assert_eq!(sheet.as_deref(), Some("AMF"));
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other}"),
        }

        let table = XlsxRowReader::new(InvalidRowPolicy::Skip)
            .read_range(&range, Path::new("book.xlsx"), "AMF")
            .unwrap();
        assert_eq!(table.rows, vec![Row::new(1, "AMF")]);
    }

    #[test]
    fn test_missing_workbook() {
        let err = XlsxRowReader::default()
            .read(Path::new("/nonexistent/book.xlsx"))
            .unwrap_err();
        assert!(matches!(err, IngestError::Spreadsheet { .. }));
    }
}
