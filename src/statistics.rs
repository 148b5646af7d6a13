//! Dataset-level basic statistics merged into every report.
//!
//! ```
//! use u_report::statistics::compute_basic_statistics;
//! use u_report::table::{Column, Table};
//!
//! let t = Table::from_columns(vec![
//!     ("id", Column::numeric_from([Some(1.0), Some(2.0), Some(3.0), Some(2.0)])),
//!     ("name", Column::text_from([Some("a"), Some("b"), Some("c"), Some("b")])),
//! ]).unwrap();
//! let stats = compute_basic_statistics(&t);
//! assert_eq!(stats.total_rows, 4);
//! let numeric = stats.numeric_stats.unwrap();
//! assert_eq!(numeric.mean["id"], Some(2.0));
//! assert_eq!(numeric.median["id"], Some(2.0));
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use u_numflow::stats;

use crate::table::{Column, ColumnKind, Table};

/// Metric → column → value table over the numeric columns.
///
/// A value is `None` when the column has no non-null values (or, for
/// `std`, fewer than two).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericSummaryTable {
    pub mean: IndexMap<String, Option<f64>>,
    pub median: IndexMap<String, Option<f64>>,
    pub std: IndexMap<String, Option<f64>>,
    pub min: IndexMap<String, Option<f64>>,
    pub max: IndexMap<String, Option<f64>>,
}

/// Shape, kinds, nulls and memory of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicStatistics {
    pub total_rows: usize,
    pub total_columns: usize,
    pub column_names: Vec<String>,
    pub data_types: IndexMap<String, ColumnKind>,
    pub missing_values: IndexMap<String, usize>,
    /// Estimated bytes held by the column buffers.
    pub memory_usage: usize,
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
    pub datetime_columns: Vec<String>,
    /// Present when the table has at least one numeric column.
    pub numeric_stats: Option<NumericSummaryTable>,
}

fn finite_values(col: &Column) -> Vec<f64> {
    col.valid_numeric_values()
        .unwrap_or_default()
        .into_iter()
        .filter(|v| v.is_finite())
        .collect()
}

fn numeric_summary(table: &Table) -> Option<NumericSummaryTable> {
    let mut summary = NumericSummaryTable::default();
    let mut any = false;
    for (name, col) in table.iter().filter(|(_, c)| c.kind() == ColumnKind::Numeric) {
        any = true;
        let vals = finite_values(col);
        let key = name.to_string();
        summary.mean.insert(key.clone(), stats::mean(&vals));
        summary.median.insert(key.clone(), stats::median(&vals));
        let std = (vals.len() > 1).then(|| stats::std_dev(&vals)).flatten();
        summary.std.insert(key.clone(), std.filter(|s| s.is_finite()));
        summary.min.insert(key.clone(), stats::min(&vals));
        summary.max.insert(key, stats::max(&vals));
    }
    any.then_some(summary)
}

/// Computes the basic statistics of `table`. Pure and idempotent.
pub fn compute_basic_statistics(table: &Table) -> BasicStatistics {
    BasicStatistics {
        total_rows: table.row_count(),
        total_columns: table.column_count(),
        column_names: table.column_names().to_vec(),
        data_types: table
            .iter()
            .map(|(name, col)| (name.to_string(), col.kind()))
            .collect(),
        missing_values: table
            .iter()
            .map(|(name, col)| (name.to_string(), col.null_count()))
            .collect(),
        memory_usage: table.iter().map(|(_, col)| col.memory_bytes()).sum(),
        numeric_columns: table.names_of_kind(ColumnKind::Numeric),
        text_columns: table.names_of_kind(ColumnKind::Text),
        datetime_columns: table.names_of_kind(ColumnKind::Datetime),
        numeric_stats: numeric_summary(table),
    }
}
