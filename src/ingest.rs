//! CSV ingestion with cleaning and kind inference.
//!
//! Parses delimited text into a [`Table`] using the `csv` crate, then
//! cleans it the way the analysis expects:
//!
//! - a leading UTF-8 BOM is stripped and header names are trimmed;
//! - duplicate header names are rejected;
//! - standard null markers become nulls: empty, `NA`, `N/A`, `null`,
//!   `None`, `NaN` and the like;
//! - rows and columns that are entirely null are dropped.
//!
//! Column kinds are inferred from the remaining non-null values in the
//! priority Numeric → Boolean → Datetime → Text.
//!
//! ```
//! use u_report::ingest::CsvLoader;
//! use u_report::table::ColumnKind;
//!
//! let csv = " name ,value,active,seen,empty\n\
//!            Alice,1.5,true,2024-01-05,\n\
//!            ,,,,\n\
//!            Bob,NA,false,2024-02-01 08:30:00,\n";
//! let table = CsvLoader::new().load_str(csv).unwrap();
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.column_names(), ["name", "value", "active", "seen"]);
//! let kinds: Vec<ColumnKind> = table.schema().into_iter().map(|(_, k)| k).collect();
//! assert_eq!(
//!     kinds,
//!     [ColumnKind::Text, ColumnKind::Numeric, ColumnKind::Boolean, ColumnKind::Datetime]
//! );
//! ```

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;

use crate::error::ReportError;
use crate::table::{Column, Table};

/// Standard null value markers recognized during parsing.
const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", ".", "NaN", "nan", "NAN",
    "#N/A", "#NA",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// CSV loader configuration and entry point.
///
/// ```
/// use u_report::ingest::CsvLoader;
///
/// let table = CsvLoader::new().delimiter(b';').load_str("a;b\n1;2\n3;4\n").unwrap();
/// assert_eq!(table.row_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CsvLoader {
    delimiter: u8,
    has_header: bool,
    null_markers: Vec<String>,
}

impl CsvLoader {
    /// Comma delimiter, header row, standard null markers.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            null_markers: DEFAULT_NULL_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    pub fn delimiter(mut self, delim: u8) -> Self {
        self.delimiter = delim;
        self
    }

    /// Whether the first record names the columns (default: true).
    /// Without a header, columns are named `col_0`, `col_1`, …
    pub fn has_header(mut self, header: bool) -> Self {
        self.has_header = header;
        self
    }

    /// Replaces the null markers.
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Loads a CSV file.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<Table, ReportError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading csv");
        let content = std::fs::read_to_string(path)?;
        self.load_str(&content)
    }

    /// Loads CSV from any reader.
    pub fn load_reader<R: Read>(&self, mut reader: R) -> Result<Table, ReportError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        self.load_str(&content)
    }

    /// Loads CSV text.
    pub fn load_str(&self, input: &str) -> Result<Table, ReportError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let (headers, rows) = self.read_records(input)?;
        if headers.is_empty() {
            return Ok(Table::new());
        }

        let mut seen = HashSet::new();
        for name in &headers {
            if !seen.insert(name.as_str()) {
                return Err(ReportError::DuplicateColumn { name: name.clone() });
            }
        }

        let n_cols = headers.len();
        let total_rows = rows.len();
        let rows: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|field| (!self.is_null(&field)).then_some(field))
                    .collect::<Vec<_>>()
            })
            .filter(|row| row.iter().any(Option::is_some))
            .collect();
        let kept_rows = rows.len();

        // column-major, still as text
        let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows.len()); n_cols];
        for row in rows {
            for (col_idx, field) in row.into_iter().enumerate() {
                raw_columns[col_idx].push(field);
            }
        }

        let mut table = Table::new();
        let mut dropped_columns = 0usize;
        for (name, raw) in headers.into_iter().zip(raw_columns) {
            if raw.iter().all(Option::is_none) {
                dropped_columns += 1;
                continue;
            }
            table.add_column(name, build_column(&raw))?;
        }

        tracing::debug!(
            rows = table.row_count(),
            columns = table.column_count(),
            dropped_rows = total_rows - kept_rows,
            dropped_columns,
            "csv loaded"
        );
        Ok(table)
    }

    /// Splits the input into trimmed header names and trimmed data rows.
    fn read_records(&self, input: &str) -> Result<(Vec<String>, Vec<Vec<String>>), ReportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(input.as_bytes());

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
            let Some(expected) = headers.as_ref().map(Vec::len) else {
                headers = Some(if self.has_header {
                    fields
                        .iter()
                        .enumerate()
                        .map(|(i, h)| if h.is_empty() { format!("col_{i}") } else { h.clone() })
                        .collect()
                } else {
                    let names = (0..fields.len()).map(|i| format!("col_{i}")).collect();
                    rows.push(fields);
                    names
                });
                continue;
            };
            if fields.len() != expected {
                return Err(ReportError::CsvParse {
                    line: record.position().map_or(0, |p| p.line() as usize),
                    message: format!("expected {expected} fields, got {}", fields.len()),
                });
            }
            rows.push(fields);
        }
        Ok((headers.unwrap_or_default(), rows))
    }

    fn is_null(&self, value: &str) -> bool {
        self.null_markers.iter().any(|m| m == value)
    }
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

// ── Kind inference ────────────────────────────────────────────────────

/// Builds the most specific column that fits every non-null value.
fn build_column(raw: &[Option<String>]) -> Column {
    let present = || raw.iter().flatten();

    if present().all(|s| s.parse::<f64>().is_ok()) {
        return Column::numeric_from(raw.iter().map(|v| v.as_deref().and_then(|s| s.parse().ok())));
    }
    if present().all(|s| parse_boolean_str(s).is_some()) {
        return Column::boolean_from(raw.iter().map(|v| v.as_deref().and_then(parse_boolean_str)));
    }
    if present().all(|s| parse_datetime_str(s).is_some()) {
        return Column::datetime_from(raw.iter().map(|v| v.as_deref().and_then(parse_datetime_str)));
    }
    Column::text_from(raw.iter().map(|v| v.as_deref()))
}

fn parse_boolean_str(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "t" | "y" => Some(true),
        "false" | "no" | "f" | "n" => Some(false),
        _ => None,
    }
}

fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnKind, Value};

    fn kind(table: &Table, name: &str) -> ColumnKind {
        table.require_column(name).expect("column present").kind()
    }

    #[test]
    fn parse_simple_csv() {
        let t = CsvLoader::new().load_str("a,b\n1,x\n2,y\n").unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(kind(&t, "a"), ColumnKind::Numeric);
        assert_eq!(kind(&t, "b"), ColumnKind::Text);
    }

    #[test]
    fn headers_trimmed_and_bom_stripped() {
        let t = CsvLoader::new().load_str("\u{feff} id , name\n1,a\n").unwrap();
        assert_eq!(t.column_names(), ["id", "name"]);
    }

    #[test]
    fn duplicate_headers_rejected() {
        let err = CsvLoader::new().load_str("a, a\n1,2\n").unwrap_err();
        assert_eq!(err, ReportError::DuplicateColumn { name: "a".into() });
    }

    #[test]
    fn null_markers_and_empty_rows_dropped() {
        let csv = "x,y\n1,a\nNA,\n3,N/A\n";
        let t = CsvLoader::new().load_str(csv).unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.row(1), vec![Value::Number(3.0), Value::Null]);
    }

    #[test]
    fn all_null_column_dropped() {
        let t = CsvLoader::new().load_str("x,gone\n1,\n2,null\n").unwrap();
        assert_eq!(t.column_names(), ["x"]);
    }

    #[test]
    fn entirely_null_input_is_empty() {
        let t = CsvLoader::new().load_str("x,y\n,\nNA,NA\n").unwrap();
        assert!(t.is_empty());
        assert_eq!(t.row_count(), 0);
    }

    #[test]
    fn header_only() {
        let t = CsvLoader::new().load_str("a,b\n").unwrap();
        assert!(t.is_empty());
        assert!(CsvLoader::new().load_str("").unwrap().is_empty());
    }

    #[test]
    fn field_count_mismatch() {
        let err = CsvLoader::new().load_str("a,b\n1,2\n3\n").unwrap_err();
        assert!(matches!(err, ReportError::CsvParse { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn quoted_fields() {
        let csv = "name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\n";
        let t = CsvLoader::new().load_str(csv).unwrap();
        assert_eq!(t.row(0)[0], Value::Text("Smith, J".into()));
        assert_eq!(t.row(0)[1], Value::Text("said \"hi\"".into()));
    }

    #[test]
    fn inference_priority() {
        let csv = "n,b,d,t\n1,yes,2024-01-01,a\n0,no,2024/02/03,2024-01-01\n";
        let t = CsvLoader::new().load_str(csv).unwrap();
        assert_eq!(kind(&t, "n"), ColumnKind::Numeric);
        assert_eq!(kind(&t, "b"), ColumnKind::Boolean);
        assert_eq!(kind(&t, "d"), ColumnKind::Datetime);
        assert_eq!(kind(&t, "t"), ColumnKind::Text);
    }

    #[test]
    fn datetime_with_time_and_fraction() {
        let csv = "ts\n2024-03-01T10:15:30.250\n2024-03-01 11:00\n";
        let t = CsvLoader::new().load_str(csv).unwrap();
        assert_eq!(kind(&t, "ts"), ColumnKind::Datetime);
        assert_eq!(t.row(1)[0].to_string(), "2024-03-01 11:00:00");
    }

    #[test]
    fn without_header() {
        let t = CsvLoader::new().has_header(false).load_str("1,2\n3,4\n").unwrap();
        assert_eq!(t.column_names(), ["col_0", "col_1"]);
        assert_eq!(t.row_count(), 2);
    }

    #[test]
    fn custom_null_markers() {
        let t = CsvLoader::new()
            .null_markers(vec!["-".into()])
            .load_str("x\n1\n-\n")
            .unwrap();
        assert_eq!(t.require_column("x").unwrap().null_count(), 1);
    }

    #[test]
    fn load_from_reader() {
        let t = CsvLoader::new()
            .load_reader("a\n1\n2\n".as_bytes())
            .unwrap();
        assert_eq!(t.row_count(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CsvLoader::new()
            .load_path("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }
}
