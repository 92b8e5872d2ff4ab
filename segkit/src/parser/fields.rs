//! Minimal line-based CSV parser with a derived `FIELD5` column.
//!
//! Unlike [`super::parse_csv_file_auto`], quoted fields cannot span lines:
//! the input is split on `\n` first, every line trimmed and blank lines
//! dropped. Empty and missing cells become `null`.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::CsvError;

/// Name of the derived column added to every row.
pub const DERIVED_FIELD: &str = "FIELD5";

/// One parsed row, keyed by header.
pub type ParsedRow = Map<String, Value>;

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: char,
    /// First line holds the column names. Required for any data row.
    pub headers: bool,
    pub quote: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            headers: true,
            quote: '"',
        }
    }
}

fn text(row: &ParsedRow, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// `"{field}-{value}"`, missing columns read as empty.
pub fn default_derive(row: &ParsedRow) -> String {
    format!("{}-{}", text(row, "field"), text(row, "value"))
}

/// Split one line into trimmed fields. A doubled quote inside a quoted
/// section is a literal quote.
pub fn split_line(line: &str, delimiter: char, quote: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut inside_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == quote {
            if inside_quotes && chars.peek() == Some(&quote) {
                current.push(quote);
                chars.next();
            } else {
                inside_quotes = !inside_quotes;
            }
        } else if c == delimiter && !inside_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Parse CSV text into rows, adding [`DERIVED_FIELD`] computed by `derive`.
pub fn parse_csv_content<F>(
    content: &str,
    options: &CsvOptions,
    derive: F,
) -> Result<Vec<ParsedRow>, CsvError>
where
    F: Fn(&ParsedRow) -> String,
{
    let mut lines = content
        .split('\n')
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let first = lines
        .next()
        .ok_or_else(|| CsvError::new(0, "CSV file is empty."))?;

    if !options.headers {
        return Err(CsvError::new(
            first.0,
            "CSV file must contain headers for proper mapping.",
        ));
    }
    let headers = split_line(first.1, options.delimiter, options.quote);

    let mut rows = Vec::new();
    for (_, line) in lines {
        let values = split_line(line, options.delimiter, options.quote);

        let mut row = ParsedRow::new();
        for (i, header) in headers.iter().enumerate() {
            let value = match values.get(i) {
                Some(v) if !v.is_empty() => Value::String(v.clone()),
                _ => Value::Null,
            };
            row.insert(header.clone(), value);
        }

        let derived = derive(&row);
        row.insert(DERIVED_FIELD.to_string(), Value::String(derived));
        rows.push(row);
    }

    Ok(rows)
}

/// Read a UTF-8 file and parse it with [`parse_csv_content`].
pub fn parse_csv_file<F>(
    path: impl AsRef<Path>,
    options: &CsvOptions,
    derive: F,
) -> Result<Vec<ParsedRow>, CsvError>
where
    F: Fn(&ParsedRow) -> String,
{
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| CsvError::new(0, format!("Cannot read file '{}': {}", path.display(), e)))?;
    parse_csv_content(&content, options, derive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(content: &str) -> Result<Vec<ParsedRow>, CsvError> {
        parse_csv_content(content, &CsvOptions::default(), default_derive)
    }

    #[test]
    fn test_field5_default() {
        let rows = parse("field,value,other\nabc,42,x\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["FIELD5"], "abc-42");
        assert_eq!(rows[0]["other"], "x");
    }

    #[test]
    fn test_missing_values_are_null() {
        let rows = parse("field,value,other\n,7\n").unwrap();
        assert_eq!(rows[0]["field"], Value::Null);
        assert_eq!(rows[0]["other"], Value::Null);
        assert_eq!(rows[0]["FIELD5"], "-7");
    }

    #[test]
    fn test_lines_trimmed_and_blank_dropped() {
        let rows = parse("  a,b  \r\n\n   \n 1 , 2 \r\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "2");
    }

    #[test]
    fn test_quotes() {
        assert_eq!(
            split_line(r#""a, b","say ""hi""",c"#, ',', '"'),
            vec!["a, b", r#"say "hi""#, "c"]
        );
        assert_eq!(split_line("'x;y';z", ';', '\''), vec!["x;y", "z"]);
    }

    #[test]
    fn test_custom_options() {
        let options = CsvOptions {
            delimiter: ';',
            quote: '\'',
            ..Default::default()
        };
        let rows = parse_csv_content("field;value\n'a;b';1", &options, default_derive).unwrap();
        assert_eq!(rows[0]["field"], "a;b");
        assert_eq!(rows[0]["FIELD5"], "a;b-1");
    }

    #[test]
    fn test_custom_derive() {
        let rows = parse_csv_content("id\n9", &CsvOptions::default(), |row| {
            format!("#{}", row["id"].as_str().unwrap_or_default())
        })
        .unwrap();
        assert_eq!(rows[0]["FIELD5"], "#9");
    }

    #[test]
    fn test_empty_file() {
        let err = parse(" \n\n").unwrap_err();
        assert_eq!(err.message, "CSV file is empty.");
    }

    #[test]
    fn test_headers_required() {
        let options = CsvOptions {
            headers: false,
            ..Default::default()
        };
        let err = parse_csv_content("\n1,2\n", &options, default_derive).unwrap_err();
        assert_eq!(err.message, "CSV file must contain headers for proper mapping.");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_header_only() {
        assert!(parse("field,value").unwrap().is_empty());
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "field,value\nx,y\n").unwrap();

        let rows = parse_csv_file(&path, &CsvOptions::default(), default_derive).unwrap();
        assert_eq!(
            Value::Object(rows[0].clone()),
            json!({ "field": "x", "value": "y", "FIELD5": "x-y" })
        );
    }
}
