//! Dataset-level data quality: completeness, duplicate rows and a
//! composite score.
//!
//! - **Completeness** is the share of non-null cells, as a percentage
//!   rounded to two decimals.
//! - **Duplicate rows** are rows identical to an earlier row in every
//!   column, null positions included. First occurrences are not counted.
//! - **Quality score** is the mean of the completeness fraction and the
//!   non-duplicate fraction, scaled to 0–100 and rounded to one decimal.
//!
//! A table without cells scores 0 for both completeness and quality.
//!
//! ```
//! use u_report::table::{Column, Table};
//! use u_report::quality::assess_quality;
//!
//! let t = Table::from_columns(vec![
//!     ("id", Column::numeric_from([Some(1.0), Some(2.0), Some(2.0), None])),
//! ]).unwrap();
//! let q = assess_quality(&t);
//! assert_eq!(q.completeness_percentage, 75.0);
//! assert_eq!(q.duplicate_rows, 1);
//! assert_eq!(q.quality_score, 75.0);
//! ```

use std::collections::HashSet;

use serde::Serialize;

use crate::table::{Table, ValueKey};

/// Quality metrics for a whole table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityAssessment {
    /// Non-null cells as a percentage (0–100).
    pub completeness_percentage: f64,
    /// Null cells across all columns.
    pub missing_values_count: usize,
    /// Rows repeating an earlier row.
    pub duplicate_rows: usize,
    /// Composite score (0–100).
    pub quality_score: f64,
}

/// Rounds half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Fraction of non-null cells, or 0 for a table without cells.
pub fn completeness_fraction(table: &Table) -> f64 {
    let cells = table.total_cells();
    if cells == 0 {
        return 0.0;
    }
    (cells - table.total_null_count()) as f64 / cells as f64
}

/// Counts rows that repeat an earlier row across all columns.
pub fn count_duplicate_rows(table: &Table) -> usize {
    let n = table.row_count();
    if n <= 1 {
        return 0;
    }
    let columns: Vec<_> = table.iter().map(|(_, col)| col).collect();
    let mut seen: HashSet<Vec<Option<ValueKey<'_>>>> = HashSet::with_capacity(n);
    (0..n)
        .filter(|&row| {
            let key: Vec<Option<ValueKey<'_>>> =
                columns.iter().map(|col| col.key_at(row)).collect();
            !seen.insert(key)
        })
        .count()
}

/// Computes completeness, duplicates and the composite score.
pub fn assess_quality(table: &Table) -> QualityAssessment {
    let rows = table.row_count();
    let missing = table.total_null_count();
    let duplicates = count_duplicate_rows(table);

    if table.total_cells() == 0 {
        return QualityAssessment {
            completeness_percentage: 0.0,
            missing_values_count: missing,
            duplicate_rows: duplicates,
            quality_score: 0.0,
        };
    }

    let completeness = completeness_fraction(table);
    let uniqueness = 1.0 - duplicates as f64 / rows as f64;
    let score = (completeness + uniqueness) / 2.0 * 100.0;

    QualityAssessment {
        completeness_percentage: round_to(completeness * 100.0, 2),
        missing_values_count: missing,
        duplicate_rows: duplicates,
        quality_score: round_to(score, 1),
    }
}
