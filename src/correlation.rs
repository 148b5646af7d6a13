//! Pairwise Pearson correlation between numeric columns.
//!
//! Each coefficient uses the rows where both columns are non-null
//! (pairwise-complete observations). A coefficient that is undefined, such
//! as for a constant column or fewer than two shared rows, is reported as
//! absent rather than NaN.
//!
//! Strong findings are taken from the upper triangle only (`i < j`), so a
//! pair is never reported twice and never paired with itself.
//!
//! ```
//! use u_report::config::AnalysisConfig;
//! use u_report::correlation::{analyze_correlations, CorrelationOutcome};
//! use u_report::table::{Column, Table};
//!
//! let t = Table::from_columns(vec![
//!     ("x", Column::numeric_from([1.0, 2.0, 3.0, 4.0, 5.0].map(Some))),
//!     ("y", Column::numeric_from([2.1, 3.9, 6.1, 7.9, 10.1].map(Some))),
//! ]).unwrap();
//! match analyze_correlations(&t, &AnalysisConfig::default()) {
//!     CorrelationOutcome::Computed(c) => {
//!         assert_eq!(c.strong_correlations.len(), 1);
//!         assert!(c.strong_correlations[0].correlation > 0.99);
//!     }
//!     CorrelationOutcome::Insufficient { .. } => unreachable!(),
//! }
//! ```

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::ReportError;
use crate::table::{Column, ColumnKind, Table};

/// Placeholder text when there are fewer than two numeric columns.
pub const INSUFFICIENT_COLUMNS_MESSAGE: &str =
    "Need at least 2 numeric columns for correlation analysis";

/// A strongly correlated pair of distinct numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationFinding {
    pub column1: String,
    pub column2: String,
    pub correlation: f64,
}

/// Square, symmetric correlation matrix over the numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` is r between `columns[i]` and `columns[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Coefficient between two columns by name.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationAnalysis {
    pub correlation_matrix: CorrelationMatrix,
    /// Pairs with |r| above the threshold, in upper-triangle order.
    pub strong_correlations: Vec<CorrelationFinding>,
}

/// Correlation result, or a placeholder when it cannot be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationOutcome {
    Computed(CorrelationAnalysis),
    Insufficient { message: String },
}

/// Pearson r between two equal-length samples of finite values.
fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let constant = |v: &[f64]| v.iter().all(|&a| a == v[0]);
    if x.len() < 2 || constant(x) || constant(y) {
        return None;
    }
    let refs: Vec<&[f64]> = vec![x, y];
    let matrix = u_analytics::correlation::correlation_matrix(&refs)?;
    let r = matrix.get(0, 1);
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Pearson r over the rows where both columns hold finite values.
fn pairwise(a: &[f64], a_col: &Column, b: &[f64], b_col: &Column) -> Option<f64> {
    let (x, y): (Vec<f64>, Vec<f64>) = (0..a.len())
        .filter(|&i| a_col.is_valid(i) && b_col.is_valid(i))
        .map(|i| (a[i], b[i]))
        .filter(|(u, v)| u.is_finite() && v.is_finite())
        .unzip();
    pearson(&x, &y)
}

/// Computes the correlation matrix and strong pairs for all numeric
/// columns of `table`.
pub fn analyze_correlations(table: &Table, config: &AnalysisConfig) -> CorrelationOutcome {
    let numeric: Vec<(&str, &Column, &[f64])> = table
        .iter()
        .filter_map(|(name, col)| col.as_numeric_slice().map(|v| (name, col, v)))
        .collect();

    if numeric.len() < 2 {
        tracing::debug!(numeric_columns = numeric.len(), "correlation skipped");
        return CorrelationOutcome::Insufficient {
            message: INSUFFICIENT_COLUMNS_MESSAGE.to_string(),
        };
    }

    let n = numeric.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let (_, a_col, a) = numeric[i];
            let (_, b_col, b) = numeric[j];
            let r = pairwise(a, a_col, b, b_col);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    let mut strong = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if let Some(r) = values[i][j] {
                if r.abs() > config.strong_correlation_threshold {
                    strong.push(CorrelationFinding {
                        column1: numeric[i].0.to_string(),
                        column2: numeric[j].0.to_string(),
                        correlation: r,
                    });
                }
            }
        }
    }

    CorrelationOutcome::Computed(CorrelationAnalysis {
        correlation_matrix: CorrelationMatrix {
            columns: numeric.iter().map(|(name, _, _)| name.to_string()).collect(),
            values,
        },
        strong_correlations: strong,
    })
}

/// Pearson r between two named columns.
///
/// Unknown names fail with [`ReportError::InvalidColumn`]. Returns
/// `Ok(None)` when either column is not numeric or r is undefined.
pub fn correlate(table: &Table, a: &str, b: &str) -> Result<Option<f64>, ReportError> {
    let a_col = table.require_column(a)?;
    let b_col = table.require_column(b)?;
    if a_col.kind() != ColumnKind::Numeric || b_col.kind() != ColumnKind::Numeric {
        return Ok(None);
    }
    match (a_col.as_numeric_slice(), b_col.as_numeric_slice()) {
        (Some(x), Some(y)) => Ok(pairwise(x, a_col, y, b_col)),
        _ => Ok(None),
    }
}
