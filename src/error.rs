//! Error types for u-report.
//!
//! Only caller-supplied identifiers and malformed inputs surface as errors.
//! Sparse data (no rows, all-null columns, fewer than two numeric columns)
//! is never an error; it resolves into placeholder content in the report.

/// All errors produced by u-report operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReportError {
    /// A referenced column does not exist in the table.
    #[error("column '{name}' not found")]
    InvalidColumn { name: String },

    /// A column's length does not match the table's row count.
    #[error("expected {expected} rows, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A column name is already used in the table.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// CSV input could not be parsed.
    #[error("CSV parse error at line {line}: {message}")]
    CsvParse { line: usize, message: String },

    /// A report type name matched none of the known types.
    #[error("unknown report type '{name}'")]
    UnknownReportType { name: String },

    /// Analysis configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A loader or renderer stage failed inside a background job.
    #[error("{stage} failed: {message}")]
    Pipeline { stage: String, message: String },

    /// I/O error while reading input.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ReportError {
    /// Shorthand for [`ReportError::InvalidColumn`].
    pub fn invalid_column(name: impl Into<String>) -> Self {
        Self::InvalidColumn { name: name.into() }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        let line = e
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        Self::CsvParse {
            line,
            message: e.to_string(),
        }
    }
}

impl From<toml::de::Error> for ReportError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
